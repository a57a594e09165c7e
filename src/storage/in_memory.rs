//! In-memory implementation of PaymentMethodApi for testing and development

use crate::core::error::RemoteError;
use crate::core::method::{MethodInput, MethodKind, PaymentMethod, Timestamps};
use crate::core::service::PaymentMethodApi;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Collections = HashMap<MethodKind, Vec<PaymentMethod>>;

/// In-memory payment-method API
///
/// Keeps one collection per kind in insertion order and generates UUID ids.
/// Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryPaymentMethodApi {
    collections: Arc<RwLock<Collections>>,
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryPaymentMethodApi {
    /// Create an empty in-memory API
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an already persisted record as-is
    pub fn insert(&self, method: PaymentMethod) -> Result<(), RemoteError> {
        let mut collections = self.write("insert")?;
        collections.entry(method.kind()).or_default().push(method);
        Ok(())
    }

    /// Number of stored records of `kind`, across all clients
    pub fn count(&self, kind: MethodKind) -> usize {
        self.collections
            .read()
            .map(|c| c.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Bytes of a previously uploaded image
    pub fn image(&self, reference: &str) -> Option<Vec<u8>> {
        self.images.read().ok()?.get(reference).cloned()
    }

    fn read(&self, operation: &str) -> Result<RwLockReadGuard<'_, Collections>, RemoteError> {
        self.collections.read().map_err(|e| {
            RemoteError::transport(operation, format!("Failed to acquire read lock: {}", e))
        })
    }

    fn write(&self, operation: &str) -> Result<RwLockWriteGuard<'_, Collections>, RemoteError> {
        self.collections.write().map_err(|e| {
            RemoteError::transport(operation, format!("Failed to acquire write lock: {}", e))
        })
    }
}

fn rejected(operation: &str, message: &str) -> RemoteError {
    RemoteError::Rejected {
        operation: operation.to_string(),
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl PaymentMethodApi for InMemoryPaymentMethodApi {
    async fn read_methods(
        &self,
        kind: MethodKind,
        client_id: &str,
    ) -> Result<Vec<PaymentMethod>, RemoteError> {
        let collections = self.read("readMethods")?;

        Ok(collections
            .get(&kind)
            .map(|methods| {
                methods
                    .iter()
                    .filter(|m| m.client_id() == client_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_method(&self, input: MethodInput) -> Result<PaymentMethod, RemoteError> {
        if input.common().client_id.is_empty() {
            return Err(rejected("createMethod", "clientId is required"));
        }

        let now = Utc::now();
        let method = input.into_method(
            Uuid::new_v4().to_string(),
            Timestamps {
                created_at: Some(now),
                updated_at: Some(now),
            },
        );

        let mut collections = self.write("createMethod")?;
        collections
            .entry(method.kind())
            .or_default()
            .push(method.clone());

        Ok(method)
    }

    async fn update_method(
        &self,
        id: &str,
        input: MethodInput,
    ) -> Result<PaymentMethod, RemoteError> {
        let kind = input.kind();
        let mut collections = self.write("updateMethod")?;

        let slot = collections
            .get_mut(&kind)
            .and_then(|methods| {
                methods
                    .iter_mut()
                    .find(|m| m.id() == id && m.client_id() == input.common().client_id)
            })
            .ok_or_else(|| RemoteError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        let created_at = match slot {
            PaymentMethod::Bank(m) => m.timestamps.created_at,
            PaymentMethod::Upi(m) => m.timestamps.created_at,
        };
        let updated = input.into_method(
            id,
            Timestamps {
                created_at,
                updated_at: Some(Utc::now()),
            },
        );
        *slot = updated.clone();

        Ok(updated)
    }

    async fn delete_method(
        &self,
        kind: MethodKind,
        id: &str,
        client_id: &str,
    ) -> Result<(), RemoteError> {
        let mut collections = self.write("deleteMethod")?;

        let methods = collections.entry(kind).or_default();
        let before = methods.len();
        methods.retain(|m| !(m.id() == id && m.client_id() == client_id));

        if methods.len() == before {
            return Err(RemoteError::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, RemoteError> {
        if bytes.is_empty() {
            return Err(rejected("uploadImage", &format!("{} is empty", file_name)));
        }

        let reference = format!("qr/{}", Uuid::new_v4());
        let mut images = self.images.write().map_err(|e| {
            RemoteError::transport("uploadImage", format!("Failed to acquire write lock: {}", e))
        })?;
        images.insert(reference.clone(), bytes);

        Ok(reference)
    }
}
