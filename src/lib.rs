//! # Paydesk
//!
//! Form state and reconciliation core for managing a client's payment-collection
//! methods: bank-transfer accounts and UPI handles.
//!
//! ## Features
//!
//! - **Unified list**: bank and UPI collections merged into one list tagged by variant
//! - **Single draft**: one record driven through create/edit/reset across two schemas
//! - **Variant inference**: the variant of a record is derived from its populated fields
//! - **Consistent updates**: local list follows remote create/update/delete outcomes
//! - **Pluggable remote**: in-memory and HTTP implementations of one async trait
//! - **Configuration-Based**: draft defaults and API settings from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paydesk::prelude::*;
//! use std::sync::Arc;
//!
//! let api = Arc::new(InMemoryPaymentMethodApi::new());
//! let controller = MethodController::new(api, "client-1");
//!
//! controller.refresh().await?;
//! controller.open_for_create()?;
//! controller.field_changed("beneficiaryName", "Asha Traders")?;
//! controller.field_changed("upiId", "asha@okaxis")?;
//! controller.field_changed("dailyLimit", "5000")?;
//! controller.field_changed("rangeTo", "5000")?;
//!
//! let created = controller.submit().await?;
//! assert_eq!(created.kind(), MethodKind::Upi);
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod methods;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Data model ===
    pub use crate::core::{
        classify::{VariantFields, classify_persisted, infer_active_tab},
        draft::{Draft, DraftDefaults, DraftStore, DraftVariant},
        field::{FieldFormat, FieldValue},
        method::{
            BankDetails, BankMethod, CommonFields, MethodInput, MethodKind, PaymentMethod,
            Timestamps, UpiDetails, UpiMethod,
        },
        schema::FieldGroup,
        service::PaymentMethodApi,
        validation::validate_draft,
    };

    // === Errors ===
    pub use crate::core::error::{
        ClassificationError, ConfigError, DraftError, FieldValidationError, MergeError,
        PaydeskError, RemoteError, StateError, ValidationError,
    };

    // === Controller ===
    pub use crate::methods::{
        CollectionMerger, EditTarget, FormMode, FormState, FormView, MethodController,
    };

    // === Remote implementations ===
    #[cfg(feature = "http")]
    pub use crate::client::HttpPaymentMethodApi;
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryPaymentMethodApi;

    // === Config ===
    pub use crate::config::{ApiConfig, FormConfig, PaydeskConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
