use crate::config::GatewayTransport;
use crate::model::SignedPaymentRequest;
use common_crypto::SecretString;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("gateway response did not include a redirect url")]
    MissingRedirect { error_message: Option<String> },
}

/// Gateway reply to a payment submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirect {
    #[serde(default)]
    pub payment_request_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit(&self, request: &SignedPaymentRequest) -> Result<PaymentRedirect, GatewayError>;
    async fn transaction_by_reference(
        &self,
        site_code: &str,
        transaction_reference: &str,
    ) -> Result<serde_json::Value, GatewayError>;
}

/// reqwest-backed client for the gateway REST endpoints. No retries.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: SecretString,
    transport: GatewayTransport,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        transport: GatewayTransport,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            transport,
        })
    }
}

async fn read_success(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::Rejected { status: status.as_u16(), body })
}

#[async_trait::async_trait]
impl PaymentGateway for HttpGateway {
    async fn submit(&self, request: &SignedPaymentRequest) -> Result<PaymentRedirect, GatewayError> {
        let url = format!("{}/PostPaymentRequest", self.base_url);
        let builder = self
            .client
            .post(&url)
            .header("ApiKey", request.api_key().expose())
            .header(ACCEPT, "application/json");
        let builder = match self.transport {
            GatewayTransport::Json => builder.json(request),
            GatewayTransport::Form => builder.form(&request.form_fields()),
        };
        debug!(
            url = %url,
            transaction_reference = %request.request().transaction_reference,
            transport = ?self.transport,
            "submitting signed payment request"
        );
        let resp = read_success(builder.send().await?).await?;
        let redirect: PaymentRedirect = resp.json().await?;
        if redirect.url.as_deref().map_or(true, str::is_empty) {
            return Err(GatewayError::MissingRedirect { error_message: redirect.error_message });
        }
        Ok(redirect)
    }

    async fn transaction_by_reference(
        &self,
        site_code: &str,
        transaction_reference: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}/GetTransactionByReference", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("ApiKey", self.api_key.expose())
            .header(ACCEPT, "application/json")
            .query(&[("siteCode", site_code), ("transactionReference", transaction_reference)])
            .send()
            .await?;
        let resp = read_success(resp).await?;
        Ok(resp.json().await?)
    }
}

/// In-process gateway that accepts everything and remembers what it was sent.
#[derive(Default)]
pub struct StubGateway {
    submitted: Mutex<Vec<SignedPaymentRequest>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<SignedPaymentRequest> {
        self.submitted.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StubGateway {
    async fn submit(&self, request: &SignedPaymentRequest) -> Result<PaymentRedirect, GatewayError> {
        let reference = request.request().transaction_reference.clone();
        if let Ok(mut guard) = self.submitted.lock() {
            guard.push(request.clone());
        }
        Ok(PaymentRedirect {
            payment_request_id: Some(format!("stub-{}", reference)),
            url: Some(format!("https://pay.example.test/{}", reference)),
            error_message: None,
        })
    }

    async fn transaction_by_reference(
        &self,
        site_code: &str,
        transaction_reference: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::json!([{
            "siteCode": site_code,
            "transactionReference": transaction_reference,
            "status": "Pending",
        }]))
    }
}
