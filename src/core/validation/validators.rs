//! Local schemas for bank and UPI drafts
//!
//! Presence and range rules are declared with `validator`; formats and
//! cross-field rules (IFSC, UPI handle, matching account numbers, range
//! order) are checked by hand afterwards. All messages are collected.

use crate::core::draft::{Draft, DraftVariant};
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::FieldFormat;
use crate::core::method::CommonFields;
use crate::core::schema;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Validate)]
struct CommonSchema {
    #[validate(length(min = 1, message = "Client is required"))]
    client_id: String,
    #[validate(length(min = 1, message = "Beneficiary name is required"))]
    beneficiary_name: String,
    #[validate(length(min = 1, message = "Daily limit must be a positive number"))]
    daily_limit: String,
    #[validate(range(min = 0.0, message = "Range start cannot be negative"))]
    range_from: f64,
    #[validate(range(min = 0.0, message = "Range end cannot be negative"))]
    range_to: f64,
}

impl From<&CommonFields> for CommonSchema {
    fn from(common: &CommonFields) -> Self {
        Self {
            client_id: common.client_id.trim().to_string(),
            beneficiary_name: common.beneficiary_name.trim().to_string(),
            daily_limit: common.daily_limit.trim().to_string(),
            range_from: common.range_from,
            range_to: common.range_to,
        }
    }
}

#[derive(Debug, Validate)]
struct BankSchema {
    #[validate(length(min = 1, message = "Account number is required"))]
    account_no: String,
    #[validate(length(min = 1, message = "Bank name is required"))]
    bank_name: String,
}

#[derive(Debug, Validate)]
struct UpiSchema {
    #[validate(length(min = 1, message = "UPI ID is required"))]
    upi_id: String,
}

/// Check a draft against its variant's schema
///
/// Returns every violation at once, keyed by the wire field name.
pub fn validate_draft(draft: &Draft) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    collect(&mut errors, CommonSchema::from(&draft.common).validate());
    check_common(&mut errors, &draft.common);

    match &draft.variant {
        DraftVariant::Bank {
            details,
            confirm_account_no,
        } => {
            let bank = BankSchema {
                account_no: details.account_no.trim().to_string(),
                bank_name: details.bank_name.trim().to_string(),
            };
            collect(&mut errors, bank.validate());

            if !FieldFormat::Ifsc.is_valid(&details.ifsc_code) {
                errors.push(FieldValidationError::new(
                    schema::IFSC_CODE,
                    "Invalid IFSC code format",
                ));
            }
            if confirm_account_no
                .as_ref()
                .is_some_and(|confirm| confirm != &details.account_no)
            {
                errors.push(FieldValidationError::new(
                    schema::CONFIRM_ACCOUNT_NO,
                    "Account numbers do not match",
                ));
            }
        }
        DraftVariant::Upi { details } => {
            let upi = UpiSchema {
                upi_id: details.upi_id.trim().to_string(),
            };
            collect(&mut errors, upi.validate());

            if !upi.upi_id.is_empty() && !FieldFormat::UpiHandle.is_valid(&upi.upi_id) {
                errors.push(FieldValidationError::new(
                    schema::UPI_ID,
                    "Invalid UPI ID format",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Err(ValidationError::FieldErrors(errors))
    }
}

fn check_common(errors: &mut Vec<FieldValidationError>, common: &CommonFields) {
    let limit = common.daily_limit.trim();
    if !limit.is_empty() {
        match limit.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => {}
            _ => errors.push(FieldValidationError::new(
                schema::DAILY_LIMIT,
                "Daily limit must be a positive number",
            )),
        }
    }
    if common.range_from > common.range_to {
        errors.push(FieldValidationError::new(
            schema::RANGE_TO,
            "Range end must not be below range start",
        ));
    }
}

fn collect(errors: &mut Vec<FieldValidationError>, result: Result<(), ValidationErrors>) {
    let Err(failures) = result else {
        return;
    };
    for (field, field_errors) in failures.field_errors() {
        let field = wire_name(&field);
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            errors.push(FieldValidationError::new(field.clone(), message));
        }
    }
}

/// Map a Rust field name onto the name the form and the API use
fn wire_name(field: &str) -> String {
    match field {
        "ifsc_code" => schema::IFSC_CODE.to_string(),
        other => {
            let mut out = String::with_capacity(other.len());
            let mut upper = false;
            for c in other.chars() {
                if c == '_' {
                    upper = true;
                } else if upper {
                    out.extend(c.to_uppercase());
                    upper = false;
                } else {
                    out.push(c);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draft::{DraftDefaults, DraftStore};
    use crate::core::method::MethodKind;

    fn bank_store() -> DraftStore {
        let mut store = DraftStore::initialize("c1", DraftDefaults::default());
        store.reset_as(MethodKind::Bank, "c1");
        store.patch("beneficiaryName", "Y".into()).unwrap();
        store.patch("accountNo", "1234".into()).unwrap();
        store.patch("confirmAccountNo", "1234".into()).unwrap();
        store.patch("IFSCcode", "ABCD0123456".into()).unwrap();
        store.patch("bankName", "X".into()).unwrap();
        store.patch("dailyLimit", "100".into()).unwrap();
        store.patch("rangeTo", 1000i64.into()).unwrap();
        store
    }

    fn upi_store() -> DraftStore {
        let mut store = DraftStore::initialize("c1", DraftDefaults::default());
        store.patch("beneficiaryName", "Y".into()).unwrap();
        store.patch("upiId", "shop@okaxis".into()).unwrap();
        store
    }

    fn fields(err: ValidationError) -> Vec<String> {
        match err {
            ValidationError::FieldErrors(errors) => errors.into_iter().map(|e| e.field).collect(),
            ValidationError::FieldError { field, .. } => vec![field],
        }
    }

    #[test]
    fn test_valid_bank_draft_passes() {
        assert!(validate_draft(bank_store().draft()).is_ok());
    }

    #[test]
    fn test_lowercase_ifsc_fails() {
        let mut store = bank_store();
        store.patch("IFSCcode", "abcd0123456".into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["IFSCcode"]);
    }

    #[test]
    fn test_missing_bank_fields_are_all_reported() {
        let mut store = DraftStore::initialize("c1", DraftDefaults::default());
        store.reset_as(MethodKind::Bank, "c1");
        let err = validate_draft(store.draft()).unwrap_err();
        let fields = fields(err);
        assert!(fields.contains(&"beneficiaryName".to_string()));
        assert!(fields.contains(&"accountNo".to_string()));
        assert!(fields.contains(&"bankName".to_string()));
        assert!(fields.contains(&"IFSCcode".to_string()));
    }

    #[test]
    fn test_mismatched_confirmation_fails() {
        let mut store = bank_store();
        store.patch("confirmAccountNo", "1243".into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["confirmAccountNo"]);
    }

    #[test]
    fn test_untouched_confirmation_is_not_required() {
        let mut store = DraftStore::initialize("c1", DraftDefaults::default());
        store.reset_as(MethodKind::Bank, "c1");
        store.patch("beneficiaryName", "Y".into()).unwrap();
        store.patch("accountNo", "1234".into()).unwrap();
        store.patch("IFSCcode", "ABCD0123456".into()).unwrap();
        store.patch("bankName", "X".into()).unwrap();
        store.patch("dailyLimit", "100".into()).unwrap();

        assert!(validate_draft(store.draft()).is_ok());
    }

    #[test]
    fn test_valid_upi_draft_passes() {
        assert!(validate_draft(upi_store().draft()).is_ok());
    }

    #[test]
    fn test_upi_handle_is_required_and_checked() {
        let mut store = upi_store();
        store.patch("upiId", "".into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["upiId"]);

        store.patch("upiId", "not-a-handle".into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["upiId"]);
    }

    #[test]
    fn test_range_and_limit_rules() {
        let mut store = upi_store();
        store.patch("rangeFrom", 500i64.into()).unwrap();
        store.patch("rangeTo", 100i64.into()).unwrap();
        store.patch("dailyLimit", "-5".into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["dailyLimit", "rangeTo"]);
    }

    #[test]
    fn test_negative_range_start_fails() {
        let mut store = upi_store();
        store.patch("rangeFrom", (-1i64).into()).unwrap();
        let err = validate_draft(store.draft()).unwrap_err();
        assert_eq!(fields(err), vec!["rangeFrom"]);
    }

    #[test]
    fn test_wire_name() {
        assert_eq!(wire_name("beneficiary_name"), "beneficiaryName");
        assert_eq!(wire_name("ifsc_code"), "IFSCcode");
        assert_eq!(wire_name("upiId"), "upiId");
    }
}
