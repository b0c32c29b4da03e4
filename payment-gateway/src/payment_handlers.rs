use crate::canonical::bank_reference_from;
use crate::config::GatewayConfig;
use crate::gateway::GatewayError;
use crate::model::PaymentRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use common_http_errors::{ApiError, ApiResult};
use common_money::GatewayAmount;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    fn to_gateway_amount(&self) -> Result<GatewayAmount, ApiError> {
        let raw = match self {
            AmountInput::Text(s) => s.clone(),
            AmountInput::Number(n) => n.to_string(),
        };
        GatewayAmount::parse_rounded(&raw).map_err(|err| ApiError::bad_request("invalid_amount", err.to_string()))
    }
}

/// Merchant-facing request to start a payment. Site, URLs and test mode default from config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody {
    pub amount: AmountInput,
    pub reference: String,
    #[serde(default)]
    pub bank_reference: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub customer_mobile: Option<String>,
    #[serde(default)]
    pub is_test: Option<bool>,
    #[serde(default)]
    pub optional1: Option<String>,
    #[serde(default)]
    pub optional2: Option<String>,
    #[serde(default)]
    pub optional3: Option<String>,
    #[serde(default)]
    pub optional4: Option<String>,
    #[serde(default)]
    pub optional5: Option<String>,
}

impl CreatePaymentBody {
    pub fn into_payment_request(self, config: &GatewayConfig) -> Result<PaymentRequest, ApiError> {
        let amount = self.amount.to_gateway_amount()?;
        if self.reference.trim().is_empty() {
            return Err(ApiError::bad_request("missing_field", "required field 'reference' is missing"));
        }
        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let full_name = (!full_name.is_empty()).then_some(full_name);
        let bank_reference = match self.bank_reference {
            Some(explicit) => explicit,
            None => {
                let derived = bank_reference_from(&self.reference);
                if derived.trim().is_empty() {
                    return Err(ApiError::bad_request(
                        "invalid_field_format",
                        format!(
                            "reference '{}' has no characters usable as a bank reference; send bankReference",
                            self.reference
                        ),
                    ));
                }
                derived
            }
        };
        Ok(PaymentRequest {
            site_code: config.site_code.clone(),
            country_code: config.country_code.clone(),
            currency_code: config.currency_code.clone(),
            amount: amount.as_gateway_string(),
            transaction_reference: self.reference,
            bank_reference,
            customer: self.customer.or_else(|| full_name.clone()),
            customer_name: full_name,
            customer_mobile: self.customer_mobile,
            cancel_url: config.cancel_url(),
            error_url: config.error_url(),
            success_url: config.success_url(),
            notify_url: config.notify_url(),
            is_test: self.is_test.unwrap_or(config.is_test),
            optional1: self.optional1,
            optional2: self.optional2,
            optional3: self.optional3,
            optional4: self.optional4,
            optional5: self.optional5,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub payment_request_id: Option<String>,
    pub url: String,
    pub transaction_reference: String,
}

pub async fn create_payment(
    State(state): State<AppState>,
    body: Result<Json<CreatePaymentBody>, JsonRejection>,
) -> ApiResult<Json<CreatePaymentResponse>> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "unparseable payment request");
        ApiError::bad_request("malformed_request", rejection.body_text())
    })?;
    let request = body.into_payment_request(&state.config)?;
    let signed = state.signer.sign_request(request, state.config.api_key.clone()).map_err(|err| {
        state.metrics.record_submission("invalid");
        warn!(error = %err, "payment request failed validation");
        ApiError::from(err)
    })?;
    let reference = signed.request().transaction_reference.clone();

    match state.gateway.submit(&signed).await {
        Ok(redirect) => {
            state.metrics.record_submission("accepted");
            info!(
                transaction_reference = %reference,
                amount = %signed.request().amount,
                is_test = signed.request().is_test,
                payment_request_id = ?redirect.payment_request_id,
                "payment request accepted by gateway"
            );
            Ok(Json(CreatePaymentResponse {
                payment_request_id: redirect.payment_request_id,
                url: redirect.url.unwrap_or_default(),
                transaction_reference: reference,
            }))
        }
        Err(err) => {
            state.metrics.record_submission("failed");
            match &err {
                GatewayError::MissingRedirect { error_message } => {
                    warn!(transaction_reference = %reference, ?error_message, "gateway returned no redirect url")
                }
                other => warn!(transaction_reference = %reference, error = %other, "payment submission failed"),
            }
            Err(ApiError::bad_gateway(err, None))
        }
    }
}

pub async fn transaction_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let value = state
        .gateway
        .transaction_by_reference(&state.config.site_code, &reference)
        .await
        .map_err(|err| {
            warn!(transaction_reference = %reference, error = %err, "transaction lookup failed");
            ApiError::bad_gateway(err, None)
        })?;
    Ok(Json(value))
}
