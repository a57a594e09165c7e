//! Core module containing the data model, draft handling and the remote contract

pub mod classify;
pub mod draft;
pub mod error;
pub mod field;
pub mod method;
pub mod schema;
pub mod service;
pub mod validation;

pub use classify::{VariantFields, classify_persisted, infer_active_tab};
pub use draft::{Draft, DraftDefaults, DraftStore, DraftVariant};
pub use error::{PaydeskError, Result};
pub use field::{FieldFormat, FieldValue};
pub use method::{
    BankDetails, BankMethod, CommonFields, MethodInput, MethodKind, PaymentMethod, Timestamps,
    UpiDetails, UpiMethod,
};
pub use schema::FieldGroup;
pub use service::PaymentMethodApi;
pub use validation::validate_draft;
