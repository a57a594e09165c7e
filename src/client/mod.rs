//! Remote API adapters that talk to a real server

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpPaymentMethodApi;
