//! Payment-method records as they are persisted by the remote API
//!
//! A payment method is either a bank-transfer account or a UPI handle. Both
//! share a block of [`CommonFields`]; the variant-specific part lives in
//! [`BankDetails`] / [`UpiDetails`]. On the wire every record is flat JSON,
//! and the merged list tags it with `type: "bank" | "upi"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two mutually exclusive payment-method shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Bank,
    Upi,
}

impl MethodKind {
    /// Both kinds, in the order the merged list concatenates them
    pub const ALL: [MethodKind; 2] = [MethodKind::Bank, MethodKind::Upi];

    /// Resource segment used by the remote API (`/api/bank`, `/api/upi`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Bank => "bank",
            MethodKind::Upi => "upi",
        }
    }

    /// Position of this kind's tab in the form (UPI first)
    pub fn tab_index(&self) -> usize {
        match self {
            MethodKind::Upi => 0,
            MethodKind::Bank => 1,
        }
    }

    pub fn from_tab_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MethodKind::Upi),
            1 => Some(MethodKind::Bank),
            _ => None,
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by both variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub client_id: String,
    #[serde(default)]
    pub beneficiary_name: String,
    /// String-encoded non-negative amount
    #[serde(default = "default_daily_limit")]
    pub daily_limit: String,
    #[serde(default)]
    pub active_days: Vec<String>,
    #[serde(default)]
    pub active_months: Vec<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub range_from: f64,
    #[serde(default)]
    pub range_to: f64,
}

pub(crate) fn default_daily_limit() -> String {
    "0".to_string()
}

fn default_is_active() -> bool {
    true
}

impl CommonFields {
    /// Blank common block for `client_id` with the given schedule defaults
    pub fn blank(
        client_id: impl Into<String>,
        active_days: Vec<String>,
        active_months: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            beneficiary_name: String::new(),
            daily_limit: default_daily_limit(),
            active_days,
            active_months,
            is_active: true,
            range_from: 0.0,
            range_to: 0.0,
        }
    }

    /// True when `amount` falls inside the inclusive transaction range
    pub fn accepts_amount(&self, amount: f64) -> bool {
        amount >= self.range_from && amount <= self.range_to
    }
}

/// Bank-transfer specific fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_no: String,
    #[serde(rename = "IFSCcode")]
    pub ifsc_code: String,
    pub bank_name: String,
}

/// UPI specific fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpiDetails {
    pub upi_id: String,
    /// Reference to the uploaded QR image; empty when none was uploaded
    #[serde(default)]
    pub qr_code: String,
}

/// Server bookkeeping shared by persisted records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A persisted bank-transfer method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankMethod {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub bank: BankDetails,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A persisted UPI method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpiMethod {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub upi: UpiDetails,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// An entry of the merged list, tagged by variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaymentMethod {
    Bank(BankMethod),
    Upi(UpiMethod),
}

impl PaymentMethod {
    pub fn kind(&self) -> MethodKind {
        match self {
            PaymentMethod::Bank(_) => MethodKind::Bank,
            PaymentMethod::Upi(_) => MethodKind::Upi,
        }
    }

    /// Server-assigned identifier, stable for the life of the record
    pub fn id(&self) -> &str {
        match self {
            PaymentMethod::Bank(m) => &m.id,
            PaymentMethod::Upi(m) => &m.id,
        }
    }

    pub fn common(&self) -> &CommonFields {
        match self {
            PaymentMethod::Bank(m) => &m.common,
            PaymentMethod::Upi(m) => &m.common,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.common().client_id
    }

    pub fn is_active(&self) -> bool {
        self.common().is_active
    }

    /// Same variant and same server id
    pub fn same_record(&self, kind: MethodKind, id: &str) -> bool {
        self.kind() == kind && self.id() == id
    }
}

/// Payload sent to the remote API on create/update: a record without its id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MethodInput {
    Bank {
        #[serde(flatten)]
        common: CommonFields,
        #[serde(flatten)]
        bank: BankDetails,
    },
    Upi {
        #[serde(flatten)]
        common: CommonFields,
        #[serde(flatten)]
        upi: UpiDetails,
    },
}

impl MethodInput {
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodInput::Bank { .. } => MethodKind::Bank,
            MethodInput::Upi { .. } => MethodKind::Upi,
        }
    }

    pub fn common(&self) -> &CommonFields {
        match self {
            MethodInput::Bank { common, .. } | MethodInput::Upi { common, .. } => common,
        }
    }

    /// Attach a server id, producing the persisted record
    pub fn into_method(self, id: impl Into<String>, timestamps: Timestamps) -> PaymentMethod {
        match self {
            MethodInput::Bank { common, bank } => PaymentMethod::Bank(BankMethod {
                id: id.into(),
                common,
                bank,
                timestamps,
            }),
            MethodInput::Upi { common, upi } => PaymentMethod::Upi(UpiMethod {
                id: id.into(),
                common,
                upi,
                timestamps,
            }),
        }
    }
}
