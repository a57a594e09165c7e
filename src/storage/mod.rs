//! Remote API implementations that keep their data in process

#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryPaymentMethodApi;
