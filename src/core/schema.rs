//! Static description of which form fields belong to which variant

use crate::core::method::MethodKind;

/// The input group a field is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    /// Shown on both tabs
    Common,
    /// Only meaningful for the given variant
    Only(MethodKind),
}

impl FieldGroup {
    /// True when a draft of `kind` carries this field
    pub fn belongs_to(&self, kind: MethodKind) -> bool {
        match self {
            FieldGroup::Common => true,
            FieldGroup::Only(k) => *k == kind,
        }
    }
}

pub const CLIENT_ID: &str = "clientId";
pub const BENEFICIARY_NAME: &str = "beneficiaryName";
pub const DAILY_LIMIT: &str = "dailyLimit";
pub const ACTIVE_DAYS: &str = "activeDays";
pub const ACTIVE_MONTHS: &str = "activeMonths";
pub const IS_ACTIVE: &str = "isActive";
pub const RANGE_FROM: &str = "rangeFrom";
pub const RANGE_TO: &str = "rangeTo";
pub const ACCOUNT_NO: &str = "accountNo";
pub const CONFIRM_ACCOUNT_NO: &str = "confirmAccountNo";
pub const IFSC_CODE: &str = "IFSCcode";
pub const BANK_NAME: &str = "bankName";
pub const UPI_ID: &str = "upiId";
pub const QR_CODE: &str = "qrCode";

const COMMON_FIELDS: &[&str] = &[
    CLIENT_ID,
    BENEFICIARY_NAME,
    DAILY_LIMIT,
    ACTIVE_DAYS,
    ACTIVE_MONTHS,
    IS_ACTIVE,
    RANGE_FROM,
    RANGE_TO,
];

const BANK_FIELDS: &[&str] = &[ACCOUNT_NO, CONFIRM_ACCOUNT_NO, IFSC_CODE, BANK_NAME];

const UPI_FIELDS: &[&str] = &[UPI_ID, QR_CODE];

/// Report which variant(s) a field belongs to, `None` for unknown names
pub fn field_group(field: &str) -> Option<FieldGroup> {
    if COMMON_FIELDS.contains(&field) {
        Some(FieldGroup::Common)
    } else if BANK_FIELDS.contains(&field) {
        Some(FieldGroup::Only(MethodKind::Bank))
    } else if UPI_FIELDS.contains(&field) {
        Some(FieldGroup::Only(MethodKind::Upi))
    } else {
        None
    }
}

/// Fields rendered on the tab of `kind`, common ones first
pub fn fields_for(kind: MethodKind) -> Vec<&'static str> {
    let specific = match kind {
        MethodKind::Bank => BANK_FIELDS,
        MethodKind::Upi => UPI_FIELDS,
    };
    COMMON_FIELDS.iter().chain(specific).copied().collect()
}

/// Fields that only exist for `kind`
pub fn variant_fields(kind: MethodKind) -> &'static [&'static str] {
    match kind {
        MethodKind::Bank => BANK_FIELDS,
        MethodKind::Upi => UPI_FIELDS,
    }
}
