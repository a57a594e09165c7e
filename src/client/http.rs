//! reqwest-backed implementation of PaymentMethodApi
//!
//! Endpoints, relative to `api.base_url`:
//!
//! | call          | request                                   | response          |
//! |---------------|-------------------------------------------|-------------------|
//! | read_methods  | `GET /api/{kind}?clientId=…`              | `{ data: [...] }` |
//! | create_method | `POST /api/{kind}` record body            | `{ data: {...} }` |
//! | update_method | `PUT /api/{kind}` record + `bankID/upiID` | `{ data: {...} }` |
//! | delete_method | `DELETE /api/{kind}` `{ bankId/upiId, clientId }` | any       |
//! | upload_image  | `POST /api/image-upload` multipart `file` | `{ publicId }`    |

use crate::config::ApiConfig;
use crate::core::error::RemoteError;
use crate::core::method::{BankMethod, MethodInput, MethodKind, PaymentMethod, UpiMethod};
use crate::core::service::PaymentMethodApi;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    public_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Talks to the payment-method REST API
#[derive(Clone)]
pub struct HttpPaymentMethodApi {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpPaymentMethodApi {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Build a client with the configured timeout and token
    pub fn from_config(config: &ApiConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RemoteError::transport("connect", e))?;
        Ok(Self::new(http, config.base_url.clone()).with_token(config.auth_token.clone()))
    }

    pub fn with_token(mut self, token: impl Into<Option<String>>) -> Self {
        self.auth_token = token.into().filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, operation: &str, req: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| RemoteError::transport(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = map_error(operation, status, &body);
        warn!(operation, status = status.as_u16(), error = %err, "Remote call rejected");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, RemoteError> {
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::decode(operation, e))
    }
}

fn map_error(operation: &str, status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    RemoteError::Rejected {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    }
}

/// Interpret a flat record from the `kind` collection
fn tag(operation: &str, kind: MethodKind, record: Value) -> Result<PaymentMethod, RemoteError> {
    let tagged = match kind {
        MethodKind::Bank => serde_json::from_value::<BankMethod>(record).map(PaymentMethod::Bank),
        MethodKind::Upi => serde_json::from_value::<UpiMethod>(record).map(PaymentMethod::Upi),
    };
    tagged.map_err(|e| RemoteError::decode(operation, e))
}

/// Key naming the edited record in an update body
fn update_key(kind: MethodKind) -> &'static str {
    match kind {
        MethodKind::Bank => "bankID",
        MethodKind::Upi => "upiID",
    }
}

/// Key naming the deleted record in a delete body
fn delete_key(kind: MethodKind) -> &'static str {
    match kind {
        MethodKind::Bank => "bankId",
        MethodKind::Upi => "upiId",
    }
}

#[async_trait]
impl PaymentMethodApi for HttpPaymentMethodApi {
    async fn read_methods(
        &self,
        kind: MethodKind,
        client_id: &str,
    ) -> Result<Vec<PaymentMethod>, RemoteError> {
        let operation = "readMethods";
        debug!(kind = %kind, client_id, "GET /api/{}", kind);

        let req = self
            .http
            .get(self.url(kind.as_str()))
            .query(&[("clientId", client_id)]);
        let response = self.send(operation, req).await?;
        let envelope: Envelope<Vec<Value>> = Self::decode(operation, response).await?;

        envelope
            .data
            .into_iter()
            .map(|record| tag(operation, kind, record))
            .collect()
    }

    async fn create_method(&self, input: MethodInput) -> Result<PaymentMethod, RemoteError> {
        let operation = "createMethod";
        let kind = input.kind();

        let req = self.http.post(self.url(kind.as_str())).json(&input);
        let response = self.send(operation, req).await?;
        let envelope: Envelope<Value> = Self::decode(operation, response).await?;

        let record = tag(operation, kind, envelope.data)?;
        info!(kind = %kind, id = record.id(), "Remote record created");
        Ok(record)
    }

    async fn update_method(
        &self,
        id: &str,
        input: MethodInput,
    ) -> Result<PaymentMethod, RemoteError> {
        let operation = "updateMethod";
        let kind = input.kind();

        let mut body =
            serde_json::to_value(&input).map_err(|e| RemoteError::decode(operation, e))?;
        if let Value::Object(fields) = &mut body {
            fields.insert(update_key(kind).to_string(), Value::String(id.to_string()));
        }

        let req = self.http.put(self.url(kind.as_str())).json(&body);
        let response = self.send(operation, req).await?;
        let envelope: Envelope<Value> = Self::decode(operation, response).await?;

        let record = tag(operation, kind, envelope.data)?;
        info!(kind = %kind, id, "Remote record updated");
        Ok(record)
    }

    async fn delete_method(
        &self,
        kind: MethodKind,
        id: &str,
        client_id: &str,
    ) -> Result<(), RemoteError> {
        let mut body = serde_json::Map::new();
        body.insert(delete_key(kind).to_string(), json!(id));
        body.insert("clientId".to_string(), json!(client_id));

        let req = self.http.delete(self.url(kind.as_str())).json(&body);
        match self.send("deleteMethod", req).await {
            Err(RemoteError::Rejected { status: 404, .. }) => Err(RemoteError::NotFound {
                kind,
                id: id.to_string(),
            }),
            other => other.map(|_| ()),
        }
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, RemoteError> {
        let operation = "uploadImage";
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let req = self.http.post(self.url("image-upload")).multipart(form);
        let response = self.send(operation, req).await?;
        let uploaded: UploadResponse = Self::decode(operation, response).await?;
        Ok(uploaded.public_id)
    }
}
