//! Local validation of drafts before they are submitted
//!
//! Both variants carry a schema. A draft that fails it never reaches the
//! remote API.

pub mod validators;

pub use validators::validate_draft;
