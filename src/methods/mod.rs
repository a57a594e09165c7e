//! Merged method list and the form controller driving it

pub mod controller;
pub mod merger;

pub use controller::{EditTarget, FormMode, FormState, FormView, MethodController};
pub use merger::CollectionMerger;
