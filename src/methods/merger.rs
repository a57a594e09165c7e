//! Merge the bank and UPI collections into one tagged display list

use crate::core::error::MergeError;
use crate::core::method::{MethodKind, PaymentMethod};
use crate::core::service::PaymentMethodApi;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Owns the merged list and keeps it in step with the remote collections
///
/// A refresh reads both collections concurrently and replaces the list only
/// when both reads succeed. Point mutations keep the list consistent after
/// a create, update or delete without another round trip.
pub struct CollectionMerger {
    api: Arc<dyn PaymentMethodApi>,
    merged: RwLock<Vec<PaymentMethod>>,
    generation: AtomicU64,
}

impl CollectionMerger {
    pub fn new(api: Arc<dyn PaymentMethodApi>) -> Self {
        Self {
            api,
            merged: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Read both collections for `client_id` and replace the merged list
    ///
    /// Bank records come first, then UPI records, each in server order. If
    /// either read fails the previous list is kept untouched. A fetch that
    /// completes after a newer fetch started, or after a point mutation or
    /// `clear`, does not overwrite the list.
    pub async fn fetch(&self, client_id: &str) -> Result<Vec<PaymentMethod>, MergeError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(client_id, ticket, "Fetching payment methods");

        let (bank, upi) = tokio::try_join!(
            self.read(MethodKind::Bank, client_id),
            self.read(MethodKind::Upi, client_id),
        )
        .inspect_err(|e| warn!(client_id, error = %e, "Payment method refresh failed"))?;

        let mut combined = bank;
        combined.extend(upi);

        let mut merged = self.write();
        if self.generation.load(Ordering::SeqCst) == ticket {
            info!(client_id, count = combined.len(), "Payment methods refreshed");
            *merged = combined.clone();
        } else {
            debug!(client_id, ticket, "Discarding superseded refresh");
        }

        Ok(combined)
    }

    async fn read(
        &self,
        kind: MethodKind,
        client_id: &str,
    ) -> Result<Vec<PaymentMethod>, MergeError> {
        let records = self
            .api
            .read_methods(kind, client_id)
            .await
            .map_err(|source| MergeError::ReadFailed { kind, source })?;

        Ok(records
            .into_iter()
            .filter(|record| {
                let matches = record.kind() == kind;
                if !matches {
                    warn!(id = record.id(), expected = %kind, "Dropping record from the wrong collection");
                }
                matches
            })
            .collect())
    }

    /// Add a freshly created record at the end of the list
    pub fn append(&self, method: PaymentMethod) {
        let mut merged = self.write();
        self.supersede();
        merged.push(method);
    }

    /// Replace the entry with the same kind and id, appending if absent
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn replace(&self, method: PaymentMethod) -> bool {
        let mut merged = self.write();
        self.supersede();
        match merged
            .iter_mut()
            .find(|m| m.same_record(method.kind(), method.id()))
        {
            Some(slot) => {
                *slot = method;
                true
            }
            None => {
                debug!(id = method.id(), "Updated record was not listed, appending");
                merged.push(method);
                false
            }
        }
    }

    /// Remove every entry with this kind and id, returning how many went
    pub fn remove(&self, kind: MethodKind, id: &str) -> usize {
        let mut merged = self.write();
        self.supersede();
        let before = merged.len();
        merged.retain(|m| !m.same_record(kind, id));
        before - merged.len()
    }

    /// The whole merged list, inactive records included
    pub fn snapshot(&self) -> Vec<PaymentMethod> {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records shown in the grid: active ones only
    pub fn active(&self) -> Vec<PaymentMethod> {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|m| m.is_active())
            .cloned()
            .collect()
    }

    pub fn find(&self, kind: MethodKind, id: &str) -> Option<PaymentMethod> {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|m| m.same_record(kind, id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.merged
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget the list, e.g. when the active client changes
    pub fn clear(&self) {
        let mut merged = self.write();
        self.supersede();
        merged.clear();
    }

    /// Invalidate every fetch still in flight
    fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<PaymentMethod>> {
        self.merged.write().unwrap_or_else(PoisonError::into_inner)
    }
}
