use axum::{
    extract::{FromRef, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common_http_errors::ApiError;
use common_observability::PaymentMetrics;
use std::sync::Arc;

pub mod canonical;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod payment_handlers;
pub mod signer;
pub mod status;
pub mod verifier;
pub mod webhook;

pub use canonical::{canonicalize_notification, canonicalize_request, CanonicalFields};
pub use config::{GatewayConfig, GatewayTransport};
pub use error::{SigningError, VerificationFailure};
pub use gateway::{GatewayError, HttpGateway, PaymentGateway, PaymentRedirect, StubGateway};
pub use model::{PaymentRequest, SignedPaymentRequest, VerificationResult, VerifiedNotification, WebhookNotification};
pub use signer::{HashCasing, Signer, SigningConfig};
pub use status::{map_status, TransactionState};
pub use verifier::Verifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub signer: Arc<Signer>,
    pub verifier: Arc<Verifier>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub metrics: Arc<PaymentMetrics>,
}

impl AppState {
    pub fn new(config: GatewayConfig, gateway: Arc<dyn PaymentGateway>) -> anyhow::Result<Self> {
        let signing = config.signing_config();
        let metrics = PaymentMetrics::new()?;
        Ok(Self {
            signer: Arc::new(Signer::new(signing.clone())),
            verifier: Arc::new(Verifier::new(signing)),
            config: Arc::new(config),
            gateway,
            metrics: Arc::new(metrics),
        })
    }
}

impl FromRef<AppState> for Arc<PaymentMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "mode": state.config.mode() }))
}

async fn metrics(State(metrics): State<Arc<PaymentMetrics>>) -> Result<impl IntoResponse, ApiError> {
    let body = metrics.render().map_err(|err| ApiError::internal(err, None))?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/payments/create", post(payment_handlers::create_payment))
        .route("/api/payments/webhook", post(webhook::handle_notification))
        .route("/api/payments/status/:reference", get(payment_handlers::transaction_status))
        .with_state(state)
}
