//! The single transient record behind the add/edit form
//!
//! A [`Draft`] is a sum type: the common block plus exactly one variant's
//! fields, chosen by the active tab. [`DraftStore`] owns the draft for the
//! lifetime of a form session and applies field patches to it.

use crate::core::error::DraftError;
use crate::core::field::FieldValue;
use crate::core::method::{
    BankDetails, CommonFields, MethodInput, MethodKind, PaymentMethod, UpiDetails,
};
use crate::core::schema::{self, FieldGroup};
use serde::Serialize;
use tracing::debug;

/// Variant-specific half of a draft
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DraftVariant {
    Bank {
        #[serde(flatten)]
        details: BankDetails,
        /// The "re-enter account number" input; `None` until typed into.
        /// Never sent to the API.
        #[serde(rename = "confirmAccountNo", skip_serializing_if = "Option::is_none")]
        confirm_account_no: Option<String>,
    },
    Upi {
        #[serde(flatten)]
        details: UpiDetails,
    },
}

impl DraftVariant {
    pub fn blank(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Bank => DraftVariant::Bank {
                details: BankDetails::default(),
                confirm_account_no: None,
            },
            MethodKind::Upi => DraftVariant::Upi {
                details: UpiDetails::default(),
            },
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            DraftVariant::Bank { .. } => MethodKind::Bank,
            DraftVariant::Upi { .. } => MethodKind::Upi,
        }
    }
}

/// The record being composed or edited
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft {
    /// Present only when editing a persisted record
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub variant: DraftVariant,
}

impl Draft {
    pub fn kind(&self) -> MethodKind {
        self.variant.kind()
    }

    pub fn account_no(&self) -> Option<&str> {
        match &self.variant {
            DraftVariant::Bank { details, .. } => Some(&details.account_no),
            DraftVariant::Upi { .. } => None,
        }
    }

    pub fn upi_id(&self) -> Option<&str> {
        match &self.variant {
            DraftVariant::Upi { details } => Some(&details.upi_id),
            DraftVariant::Bank { .. } => None,
        }
    }

    /// Copy a persisted record into a draft, keeping its id
    pub fn from_method(method: &PaymentMethod) -> Self {
        match method {
            PaymentMethod::Bank(m) => Draft {
                id: Some(m.id.clone()),
                common: m.common.clone(),
                variant: DraftVariant::Bank {
                    details: m.bank.clone(),
                    confirm_account_no: Some(m.bank.account_no.clone()),
                },
            },
            PaymentMethod::Upi(m) => Draft {
                id: Some(m.id.clone()),
                common: m.common.clone(),
                variant: DraftVariant::Upi {
                    details: m.upi.clone(),
                },
            },
        }
    }

    /// The payload sent to the remote API
    pub fn to_input(&self) -> MethodInput {
        match &self.variant {
            DraftVariant::Bank { details, .. } => MethodInput::Bank {
                common: self.common.clone(),
                bank: details.clone(),
            },
            DraftVariant::Upi { details } => MethodInput::Upi {
                common: self.common.clone(),
                upi: details.clone(),
            },
        }
    }
}

/// Values a fresh draft starts from
#[derive(Debug, Clone, PartialEq)]
pub struct DraftDefaults {
    pub kind: MethodKind,
    pub active_days: Vec<String>,
    pub active_months: Vec<String>,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            kind: MethodKind::Upi,
            active_days: vec!["Monday".to_string(), "Tuesday".to_string()],
            active_months: vec!["January".to_string(), "February".to_string()],
        }
    }
}

impl DraftDefaults {
    pub fn blank_draft(&self, kind: MethodKind, client_id: &str) -> Draft {
        Draft {
            id: None,
            common: CommonFields::blank(
                client_id,
                self.active_days.clone(),
                self.active_months.clone(),
            ),
            variant: DraftVariant::blank(kind),
        }
    }
}

/// Holds exactly one mutable draft
#[derive(Debug, Clone)]
pub struct DraftStore {
    defaults: DraftDefaults,
    draft: Draft,
}

impl DraftStore {
    /// A store whose draft is blank, of the default kind, owned by `client_id`
    pub fn initialize(client_id: &str, defaults: DraftDefaults) -> Self {
        let draft = defaults.blank_draft(defaults.kind, client_id);
        Self { defaults, draft }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn defaults(&self) -> &DraftDefaults {
        &self.defaults
    }

    pub fn kind(&self) -> MethodKind {
        self.draft.kind()
    }

    /// Same draft `initialize` would produce for `client_id`
    pub fn reset(&mut self, client_id: &str) {
        self.reset_as(self.defaults.kind, client_id);
    }

    /// Back to defaults for `kind`
    pub fn reset_as(&mut self, kind: MethodKind, client_id: &str) {
        debug!(kind = %kind, client_id, "Resetting draft");
        self.draft = self.defaults.blank_draft(kind, client_id);
    }

    /// Replace the draft wholesale (entering edit mode)
    pub fn load(&mut self, draft: Draft) {
        self.draft = draft;
    }

    /// Follow the active client without touching any other field
    pub fn sync_client(&mut self, client_id: &str) {
        if self.draft.common.client_id != client_id {
            debug!(client_id, "Syncing draft client");
            self.draft.common.client_id = client_id.to_string();
        }
    }

    /// Apply a shallow update to one field
    ///
    /// Only the value's shape is checked here. Cross-field rules (IFSC format,
    /// ranges, matching account numbers) run when the draft is submitted.
    pub fn patch(&mut self, field: &str, value: FieldValue) -> Result<(), DraftError> {
        let group = schema::field_group(field).ok_or_else(|| DraftError::UnknownField {
            field: field.to_string(),
        })?;
        let kind = self.kind();
        if !group.belongs_to(kind) {
            return Err(DraftError::FieldNotInVariant {
                field: field.to_string(),
                kind,
            });
        }

        match group {
            FieldGroup::Common => self.patch_common(field, value)?,
            FieldGroup::Only(_) => self.patch_variant(field, value)?,
        }
        debug!(field, "Patched draft field");
        Ok(())
    }

    fn patch_common(&mut self, field: &str, value: FieldValue) -> Result<(), DraftError> {
        let common = &mut self.draft.common;
        match field {
            schema::CLIENT_ID => common.client_id = text(field, value)?,
            schema::BENEFICIARY_NAME => common.beneficiary_name = text(field, value)?,
            schema::DAILY_LIMIT => {
                common.daily_limit = match value {
                    FieldValue::Integer(i) => i.to_string(),
                    FieldValue::Float(f) => f.to_string(),
                    other => text(field, other)?,
                }
            }
            schema::ACTIVE_DAYS => {
                common.active_days = names(field, value, |n| n.parse::<chrono::Weekday>().is_ok())?
            }
            schema::ACTIVE_MONTHS => {
                common.active_months = names(field, value, |n| n.parse::<chrono::Month>().is_ok())?
            }
            schema::IS_ACTIVE => {
                common.is_active = value.as_bool().ok_or_else(|| invalid(field, &value, "a boolean"))?
            }
            schema::RANGE_FROM => common.range_from = number(field, value)?,
            schema::RANGE_TO => common.range_to = number(field, value)?,
            _ => {
                return Err(DraftError::UnknownField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn patch_variant(&mut self, field: &str, value: FieldValue) -> Result<(), DraftError> {
        let value = text(field, value)?;
        match (&mut self.draft.variant, field) {
            (DraftVariant::Bank { details, .. }, schema::ACCOUNT_NO) => details.account_no = value,
            (DraftVariant::Bank { details, .. }, schema::IFSC_CODE) => details.ifsc_code = value,
            (DraftVariant::Bank { details, .. }, schema::BANK_NAME) => details.bank_name = value,
            (DraftVariant::Bank { confirm_account_no, .. }, schema::CONFIRM_ACCOUNT_NO) => {
                *confirm_account_no = Some(value)
            }
            (DraftVariant::Upi { details }, schema::UPI_ID) => details.upi_id = value,
            (DraftVariant::Upi { details }, schema::QR_CODE) => details.qr_code = value,
            (variant, _) => {
                return Err(DraftError::FieldNotInVariant {
                    field: field.to_string(),
                    kind: variant.kind(),
                });
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, value: &FieldValue, expected: &str) -> DraftError {
    DraftError::InvalidValue {
        field: field.to_string(),
        message: format!("expected {}, got {}", expected, value.type_name()),
    }
}

fn text(field: &str, value: FieldValue) -> Result<String, DraftError> {
    match value {
        FieldValue::String(s) => Ok(s),
        other => Err(invalid(field, &other, "text")),
    }
}

fn number(field: &str, value: FieldValue) -> Result<f64, DraftError> {
    if value.as_string().is_some_and(|s| s.trim().is_empty()) {
        return Ok(0.0);
    }
    match value.as_number() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(invalid(field, &value, "a number")),
    }
}

/// An ordered list of distinct names, each accepted by `known`
fn names(
    field: &str,
    value: FieldValue,
    known: impl Fn(&str) -> bool,
) -> Result<Vec<String>, DraftError> {
    let FieldValue::List(items) = value else {
        return Err(invalid(field, &value, "a list of names"));
    };
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !known(item.as_str()) {
            return Err(DraftError::InvalidValue {
                field: field.to_string(),
                message: format!("unknown name '{}'", item),
            });
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    Ok(out)
}
