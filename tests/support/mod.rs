//! Shared fixtures for the integration tests
//!
//! `ScriptedApi` wraps the in-memory API and lets a test inject failures,
//! hold a write or a bank read open until released, and inspect which calls were made.

#![allow(dead_code)]

use async_trait::async_trait;
use paydesk::prelude::*;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub const CLIENT: &str = "client-1";

/// Route tracing output through the test writer; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct ScriptedApi {
    pub inner: InMemoryPaymentMethodApi,
    pub fail_bank_read: AtomicBool,
    pub fail_upi_read: AtomicBool,
    pub fail_writes: AtomicBool,
    pub hold_writes: AtomicBool,
    pub hold_bank_read: AtomicBool,
    pub release: Notify,
    pub entered: Notify,
    pub reads: AtomicUsize,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// Block a write until the test calls `release.notify_one()`
    async fn gate(&self) {
        if self.hold_writes.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    fn write_outcome(&self, operation: &str) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected {
                operation: operation.to_string(),
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentMethodApi for ScriptedApi {
    async fn read_methods(
        &self,
        kind: MethodKind,
        client_id: &str,
    ) -> Result<Vec<PaymentMethod>, RemoteError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if kind == MethodKind::Bank && self.hold_bank_read.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let failing = match kind {
            MethodKind::Bank => &self.fail_bank_read,
            MethodKind::Upi => &self.fail_upi_read,
        };
        if failing.load(Ordering::SeqCst) {
            return Err(RemoteError::transport("readMethods", "connection reset"));
        }
        self.inner.read_methods(kind, client_id).await
    }

    async fn create_method(&self, input: MethodInput) -> Result<PaymentMethod, RemoteError> {
        self.record(format!("create {}", input.kind()));
        self.gate().await;
        self.write_outcome("createMethod")?;
        self.inner.create_method(input).await
    }

    async fn update_method(
        &self,
        id: &str,
        input: MethodInput,
    ) -> Result<PaymentMethod, RemoteError> {
        self.record(format!("update {} {}", input.kind(), id));
        self.gate().await;
        self.write_outcome("updateMethod")?;
        self.inner.update_method(id, input).await
    }

    async fn delete_method(
        &self,
        kind: MethodKind,
        id: &str,
        client_id: &str,
    ) -> Result<(), RemoteError> {
        self.record(format!("delete {} {}", kind, id));
        self.gate().await;
        self.write_outcome("deleteMethod")?;
        self.inner.delete_method(kind, id, client_id).await
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, RemoteError> {
        self.record(format!("upload {}", file_name));
        self.gate().await;
        self.write_outcome("uploadImage")?;
        self.inner.upload_image(file_name, bytes).await
    }
}

pub fn bank_json(id: &str, account_no: &str) -> Value {
    json!({
        "_id": id,
        "clientId": CLIENT,
        "beneficiaryName": "Asha Traders",
        "accountNo": account_no,
        "IFSCcode": "HDFC0001234",
        "bankName": "HDFC Bank",
        "dailyLimit": "50000",
        "activeDays": ["Monday", "Friday"],
        "activeMonths": ["March"],
        "isActive": true,
        "rangeFrom": 100,
        "rangeTo": 50000
    })
}

pub fn upi_json(id: &str, upi_id: &str) -> Value {
    json!({
        "_id": id,
        "clientId": CLIENT,
        "beneficiaryName": "Asha Traders",
        "upiId": upi_id,
        "qrCode": "",
        "dailyLimit": "2000",
        "activeDays": ["Monday"],
        "activeMonths": ["January"],
        "isActive": true,
        "rangeFrom": 0,
        "rangeTo": 2000
    })
}

pub fn bank_record(id: &str, account_no: &str) -> PaymentMethod {
    PaymentMethod::Bank(serde_json::from_value(bank_json(id, account_no)).unwrap())
}

pub fn upi_record(id: &str, upi_id: &str) -> PaymentMethod {
    PaymentMethod::Upi(serde_json::from_value(upi_json(id, upi_id)).unwrap())
}

/// Fill every bank field with values that pass validation
pub fn fill_valid_bank(controller: &MethodController) {
    controller.field_changed("beneficiaryName", "Y").unwrap();
    controller.field_changed("accountNo", "1234").unwrap();
    controller.field_changed("confirmAccountNo", "1234").unwrap();
    controller.field_changed("IFSCcode", "ABCD0123456").unwrap();
    controller.field_changed("bankName", "X").unwrap();
    controller.field_changed("dailyLimit", "100").unwrap();
    controller.field_changed("rangeFrom", "0").unwrap();
    controller.field_changed("rangeTo", "1000").unwrap();
}

/// Fill every UPI field with values that pass validation
pub fn fill_valid_upi(controller: &MethodController) {
    controller.field_changed("beneficiaryName", "Y").unwrap();
    controller.field_changed("upiId", "shop@okaxis").unwrap();
    controller.field_changed("dailyLimit", "100").unwrap();
    controller.field_changed("rangeTo", "1000").unwrap();
}
