//! Determine which variant a record or draft belongs to
//!
//! Typed records and drafts already carry their variant, so inference by
//! field presence is only needed for untyped payloads (legacy rows, raw API
//! responses). The same rules apply to every source through [`VariantFields`].

use crate::core::draft::Draft;
use crate::core::error::ClassificationError;
use crate::core::method::{MethodKind, PaymentMethod};
use serde_json::Value;

/// Read access to the fields classification looks at
pub trait VariantFields {
    fn account_no(&self) -> Option<&str>;

    fn upi_id(&self) -> Option<&str>;

    /// An explicit `type` discriminant, when the source carries one
    fn declared_kind(&self) -> Option<MethodKind> {
        None
    }
}

impl VariantFields for Value {
    fn account_no(&self) -> Option<&str> {
        self.get("accountNo").and_then(Value::as_str)
    }

    fn upi_id(&self) -> Option<&str> {
        self.get("upiId").and_then(Value::as_str)
    }

    fn declared_kind(&self) -> Option<MethodKind> {
        match self.get("type").and_then(Value::as_str) {
            Some("bank") => Some(MethodKind::Bank),
            Some("upi") => Some(MethodKind::Upi),
            _ => None,
        }
    }
}

impl VariantFields for Draft {
    fn account_no(&self) -> Option<&str> {
        Draft::account_no(self)
    }

    fn upi_id(&self) -> Option<&str> {
        Draft::upi_id(self)
    }

    fn declared_kind(&self) -> Option<MethodKind> {
        Some(self.kind())
    }
}

impl VariantFields for PaymentMethod {
    fn account_no(&self) -> Option<&str> {
        match self {
            PaymentMethod::Bank(m) => Some(&m.bank.account_no),
            PaymentMethod::Upi(_) => None,
        }
    }

    fn upi_id(&self) -> Option<&str> {
        match self {
            PaymentMethod::Upi(m) => Some(&m.upi.upi_id),
            PaymentMethod::Bank(_) => None,
        }
    }

    fn declared_kind(&self) -> Option<MethodKind> {
        Some(self.kind())
    }
}

fn populated(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Classify a persisted record from its populated fields
///
/// A non-empty account number means bank, a non-empty UPI handle means upi.
/// Records with both or neither are rejected, and so is a declared `type`
/// that disagrees with the fields.
pub fn classify_persisted<R: VariantFields + ?Sized>(
    record: &R,
) -> Result<MethodKind, ClassificationError> {
    let inferred = match (populated(record.account_no()), populated(record.upi_id())) {
        (true, true) => return Err(ClassificationError::Ambiguous),
        (true, false) => MethodKind::Bank,
        (false, true) => MethodKind::Upi,
        (false, false) => return Err(ClassificationError::Unclassifiable),
    };

    match record.declared_kind() {
        Some(declared) if declared != inferred => {
            Err(ClassificationError::Mismatch { declared, inferred })
        }
        _ => Ok(inferred),
    }
}

/// The tab the form should show for `draft`
///
/// UPI wins when a handle is present, then bank when an account number is
/// present; otherwise the current tab is kept.
pub fn infer_active_tab<R: VariantFields + ?Sized>(draft: &R, current: MethodKind) -> MethodKind {
    if populated(draft.upi_id()) {
        MethodKind::Upi
    } else if populated(draft.account_no()) {
        MethodKind::Bank
    } else {
        current
    }
}
