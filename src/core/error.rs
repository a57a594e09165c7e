//! Typed error handling for paydesk
//!
//! Every fallible operation returns [`PaydeskError`] (or one of its category
//! enums), so callers can match on the failure instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: a draft failed its local schema, no remote call was made
//! - [`RemoteError`]: the remote API rejected a call or could not be reached
//! - [`MergeError`]: one of the two collection reads failed during a refresh
//! - [`ClassificationError`]: a record or draft could not be assigned a variant
//! - [`DraftError`]: a field patch did not fit the current draft
//! - [`StateError`]: an operation was issued in a form state that forbids it
//! - [`ConfigError`]: configuration could not be loaded
//!
//! None of these are fatal; every one is recoverable by retrying the action.
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.submit().await {
//!     Ok(record) => println!("saved {}", record.id()),
//!     Err(PaydeskError::Validation(ValidationError::FieldErrors(errors))) => {
//!         for e in errors {
//!             println!("{}: {}", e.field, e.message);
//!         }
//!     }
//!     Err(e) => eprintln!("{} ({})", e, e.error_code()),
//! }
//! ```

use crate::core::method::MethodKind;
use serde::Serialize;
use thiserror::Error;

/// The main error type for paydesk
#[derive(Debug, Error)]
pub enum PaydeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (poisoned locks and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaydeskError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PaydeskError::Validation(_) => "VALIDATION_ERROR",
            PaydeskError::Remote(e) => e.error_code(),
            PaydeskError::Merge(_) => "MERGE_FAILED",
            PaydeskError::Classification(e) => e.error_code(),
            PaydeskError::Draft(e) => e.error_code(),
            PaydeskError::State(e) => e.error_code(),
            PaydeskError::Config(_) => "CONFIG_ERROR",
            PaydeskError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Field-level messages, when the error carries any
    pub fn field_errors(&self) -> &[FieldValidationError] {
        match self {
            PaydeskError::Validation(ValidationError::FieldErrors(errors)) => errors,
            _ => &[],
        }
    }
}

/// Shorthand used throughout the crate
pub type Result<T, E = PaydeskError> = std::result::Result<T, E>;

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the local schemas before anything is sent
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// True when `field` has at least one message attached
    pub fn has_field(&self, field: &str) -> bool {
        match self {
            ValidationError::FieldError { field: f, .. } => f == field,
            ValidationError::FieldErrors(errors) => errors.iter().any(|e| e.field == field),
        }
    }
}

// =============================================================================
// Remote Errors
// =============================================================================

/// Failures of the remote payment-method API
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The request never produced a response
    #[error("{operation} failed: {message}")]
    Transport { operation: String, message: String },

    /// The server answered with a non-success status
    #[error("{operation} rejected with status {status}: {message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },

    /// The addressed record does not exist remotely
    #[error("{kind} method '{id}' not found")]
    NotFound { kind: MethodKind, id: String },

    /// The response body could not be decoded
    #[error("Failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },
}

impl RemoteError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RemoteError::Transport { .. } => "REMOTE_TRANSPORT_ERROR",
            RemoteError::Rejected { .. } => "REMOTE_REJECTED",
            RemoteError::NotFound { .. } => "REMOTE_NOT_FOUND",
            RemoteError::Decode { .. } => "REMOTE_DECODE_ERROR",
        }
    }

    pub fn transport(operation: impl Into<String>, message: impl ToString) -> Self {
        RemoteError::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(operation: impl Into<String>, message: impl ToString) -> Self {
        RemoteError::Decode {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Merge Errors
// =============================================================================

/// A refresh aborted because one collection could not be read
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Failed to read {kind} methods: {source}")]
    ReadFailed {
        kind: MethodKind,
        #[source]
        source: RemoteError,
    },
}

// =============================================================================
// Classification Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    /// Both an account number and a UPI handle are populated
    #[error("Record carries both bank and UPI details")]
    Ambiguous,

    /// Neither an account number nor a UPI handle is populated
    #[error("Record carries neither bank nor UPI details")]
    Unclassifiable,

    /// The declared `type` disagrees with the populated fields
    #[error("Record declared as {declared} looks like {inferred}")]
    Mismatch {
        declared: MethodKind,
        inferred: MethodKind,
    },
}

impl ClassificationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ClassificationError::Ambiguous => "CLASSIFICATION_AMBIGUOUS",
            ClassificationError::Unclassifiable => "CLASSIFICATION_EMPTY",
            ClassificationError::Mismatch { .. } => "CLASSIFICATION_MISMATCH",
        }
    }
}

// =============================================================================
// Draft Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    #[error("Field '{field}' does not belong to a {kind} draft")]
    FieldNotInVariant { field: String, kind: MethodKind },

    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl DraftError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DraftError::UnknownField { .. } => "DRAFT_UNKNOWN_FIELD",
            DraftError::FieldNotInVariant { .. } => "DRAFT_FIELD_NOT_IN_VARIANT",
            DraftError::InvalidValue { .. } => "DRAFT_INVALID_VALUE",
        }
    }
}

// =============================================================================
// State Errors
// =============================================================================

/// An operation was issued in a form state that does not allow it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("The payment method form is not open")]
    ModalClosed,

    #[error("The payment method form is already open")]
    ModalAlreadyOpen,

    #[error("A submission is already in flight")]
    SubmitInFlight,

    #[error("Method '{id}' is already being deleted")]
    DeleteInFlight { id: String },

    #[error("The {kind} tab is not offered in the current mode")]
    TabUnavailable { kind: MethodKind },

    #[error("No tab at index {index}")]
    InvalidTab { index: usize },

    #[error("QR codes can only be attached to a UPI draft")]
    NotUpiDraft,
}

impl StateError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StateError::ModalClosed => "MODAL_CLOSED",
            StateError::ModalAlreadyOpen => "MODAL_ALREADY_OPEN",
            StateError::SubmitInFlight => "SUBMIT_IN_FLIGHT",
            StateError::DeleteInFlight { .. } => "DELETE_IN_FLIGHT",
            StateError::TabUnavailable { .. } => "TAB_UNAVAILABLE",
            StateError::InvalidTab { .. } => "INVALID_TAB",
            StateError::NotUpiDraft => "NOT_UPI_DRAFT",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_display_joins_messages() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError::new("IFSCcode", "Invalid IFSC code format"),
            FieldValidationError::new("bankName", "Bank name is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation errors: IFSCcode: Invalid IFSC code format, bankName: Bank name is required"
        );
        assert!(err.has_field("bankName"));
        assert!(!err.has_field("upiId"));
    }

    #[test]
    fn test_error_codes_delegate_to_category() {
        let err: PaydeskError = StateError::SubmitInFlight.into();
        assert_eq!(err.error_code(), "SUBMIT_IN_FLIGHT");

        let err: PaydeskError = RemoteError::NotFound {
            kind: MethodKind::Upi,
            id: "abc".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "REMOTE_NOT_FOUND");
        assert_eq!(err.to_string(), "upi method 'abc' not found");
    }

    #[test]
    fn test_merge_error_keeps_source() {
        use std::error::Error as _;

        let err = MergeError::ReadFailed {
            kind: MethodKind::Bank,
            source: RemoteError::transport("readMethods", "connection refused"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("bank"));
    }

    #[test]
    fn test_config_parse_error_mentions_file() {
        let err = ConfigError::ParseError {
            file: Some("paydesk.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config file 'paydesk.yaml': bad indent"
        );
    }

    #[test]
    fn test_field_errors_accessor() {
        let err: PaydeskError = ValidationError::FieldErrors(vec![FieldValidationError::new(
            "upiId",
            "UPI ID is required",
        )])
        .into();
        assert_eq!(err.field_errors().len(), 1);

        let err: PaydeskError = StateError::ModalClosed.into();
        assert!(err.field_errors().is_empty());
    }
}
