//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Every category maps to a stable error code
//! - Category errors convert into PaydeskError
//! - Callers can match on specific failures

use paydesk::prelude::*;

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_remote_error_codes() {
        let cases = [
            (RemoteError::transport("readMethods", "timeout"), "REMOTE_TRANSPORT_ERROR"),
            (RemoteError::decode("readMethods", "eof"), "REMOTE_DECODE_ERROR"),
            (
                RemoteError::NotFound {
                    kind: MethodKind::Bank,
                    id: "b1".to_string(),
                },
                "REMOTE_NOT_FOUND",
            ),
        ];
        for (err, code) in cases {
            assert_eq!(PaydeskError::from(err).error_code(), code);
        }
    }

    #[test]
    fn test_state_error_codes() {
        assert_eq!(
            PaydeskError::from(StateError::SubmitInFlight).error_code(),
            "SUBMIT_IN_FLIGHT"
        );
        assert_eq!(
            PaydeskError::from(StateError::TabUnavailable {
                kind: MethodKind::Bank
            })
            .error_code(),
            "TAB_UNAVAILABLE"
        );
    }

    #[test]
    fn test_merge_and_validation_codes() {
        let merge = MergeError::ReadFailed {
            kind: MethodKind::Upi,
            source: RemoteError::transport("readMethods", "reset"),
        };
        assert_eq!(PaydeskError::from(merge).error_code(), "MERGE_FAILED");

        let validation = ValidationError::FieldErrors(vec![FieldValidationError::new(
            "upiId",
            "Invalid UPI ID format",
        )]);
        assert_eq!(
            PaydeskError::from(validation).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_classification_codes() {
        assert_eq!(
            ClassificationError::Ambiguous.error_code(),
            "CLASSIFICATION_AMBIGUOUS"
        );
        assert_eq!(
            ClassificationError::Unclassifiable.error_code(),
            "CLASSIFICATION_EMPTY"
        );
    }
}

// =============================================================================
// Message Tests
// =============================================================================

mod error_message_tests {
    use super::*;

    #[test]
    fn test_transparent_messages() {
        let err = PaydeskError::from(RemoteError::Rejected {
            operation: "updateMethod".to_string(),
            status: 422,
            message: "IFSC code is invalid".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "updateMethod rejected with status 422: IFSC code is invalid"
        );
    }

    #[test]
    fn test_merge_error_keeps_source() {
        let err = MergeError::ReadFailed {
            kind: MethodKind::Bank,
            source: RemoteError::transport("readMethods", "connection reset"),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("connection reset"));
        assert!(err.to_string().starts_with("Failed to read bank methods"));
    }

    #[test]
    fn test_field_errors_are_listed() {
        let err = PaydeskError::from(ValidationError::FieldErrors(vec![
            FieldValidationError::new("IFSCcode", "Invalid IFSC code format"),
            FieldValidationError::new("bankName", "Bank name is required"),
        ]));

        assert_eq!(err.field_errors().len(), 2);
        assert!(err.to_string().contains("IFSCcode"));
        assert!(err.to_string().contains("bankName"));
    }

    #[test]
    fn test_field_errors_serialize_for_display() {
        let error = FieldValidationError::new("upiId", "UPI ID is required");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["field"], "upiId");
        assert_eq!(value["message"], "UPI ID is required");
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_match_on_state_error() {
        let err: PaydeskError = StateError::DeleteInFlight {
            id: "u1".to_string(),
        }
        .into();

        match err {
            PaydeskError::State(StateError::DeleteInFlight { id }) => assert_eq!(id, "u1"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_validation_errors_have_no_field_errors() {
        let err = PaydeskError::from(StateError::ModalClosed);
        assert!(err.field_errors().is_empty());
    }
}
