//! Remote API contract consumed by the controller

use crate::core::error::RemoteError;
use crate::core::method::{MethodInput, MethodKind, PaymentMethod};
use async_trait::async_trait;

/// Service trait for the remote payment-method collections
///
/// There is one collection per [`MethodKind`], each scoped by client. The
/// core is agnostic to the transport; implementations must not retry on
/// their own.
#[async_trait]
pub trait PaymentMethodApi: Send + Sync {
    /// List the records of one collection owned by `client_id`
    ///
    /// Returned records are tagged with `kind`.
    async fn read_methods(
        &self,
        kind: MethodKind,
        client_id: &str,
    ) -> Result<Vec<PaymentMethod>, RemoteError>;

    /// Insert a record, returning it with its generated id
    async fn create_method(&self, input: MethodInput) -> Result<PaymentMethod, RemoteError>;

    /// Replace the record identified by `id` with `input`
    async fn update_method(
        &self,
        id: &str,
        input: MethodInput,
    ) -> Result<PaymentMethod, RemoteError>;

    /// Delete the record identified by `id`
    async fn delete_method(
        &self,
        kind: MethodKind,
        id: &str,
        client_id: &str,
    ) -> Result<(), RemoteError>;

    /// Store an image, returning an opaque reference to it
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, RemoteError>;
}
