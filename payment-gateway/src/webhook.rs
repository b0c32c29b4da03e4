use crate::model::WebhookNotification;
use crate::status::TransactionState;
use crate::AppState;
use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{header::CONTENT_TYPE, HeaderValue, Request},
    Form, Json,
};
use common_http_errors::{ApiError, ApiResult};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
    pub transaction_reference: String,
    pub state: &'static str,
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Media types are case-insensitive; parameters such as `charset` are ignored.
fn is_form(req: &Request<Body>) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn malformed(message: String) -> ApiError {
    ApiError::bad_request("malformed_notification", message)
}

/// Parse the body as form or JSON depending on its content type.
async fn parse_notification(state: &AppState, mut req: Request<Body>) -> ApiResult<WebhookNotification> {
    if is_form(&req) {
        // axum's Form only matches the lowercase media type
        req.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        let Form(notification) = Form::<WebhookNotification>::from_request(req, state)
            .await
            .map_err(|rejection| malformed(rejection.body_text()))?;
        Ok(notification)
    } else {
        let Json(notification) = Json::<WebhookNotification>::from_request(req, state)
            .await
            .map_err(|rejection| malformed(rejection.body_text()))?;
        Ok(notification)
    }
}

/// Gateway status callback. Acknowledged with 200 only after the hash verifies.
pub async fn handle_notification(State(state): State<AppState>, req: Request<Body>) -> ApiResult<Json<WebhookAck>> {
    let notification = parse_notification(&state, req).await.map_err(|err| {
        state.metrics.record_verification("malformed_notification");
        warn!(error_code = err.code(), "unparseable gateway notification");
        err
    })?;

    let verified = state.verifier.authenticate(notification).map_err(|failure| {
        state.metrics.record_verification(failure.code());
        warn!(reason = %failure, "gateway notification rejected");
        ApiError::from(failure)
    })?;

    let site_code = verified.notification().site_code.as_deref().unwrap_or_default();
    if site_code != state.config.site_code {
        state.metrics.record_verification("site_mismatch");
        warn!(
            site_code,
            transaction_reference = verified.transaction_reference(),
            "notification for a different site"
        );
        return Err(ApiError::unauthorized("site_mismatch", "notification is for a different site"));
    }

    state.metrics.record_verification("valid");
    state.metrics.record_state(verified.state().as_str());
    let status = verified.notification().status.as_deref().unwrap_or_default();
    if verified.state() == TransactionState::Unknown {
        warn!(
            transaction_reference = verified.transaction_reference(),
            transaction_id = verified.transaction_id(),
            status,
            "verified notification carries an unrecognised status"
        );
    } else {
        info!(
            transaction_reference = verified.transaction_reference(),
            transaction_id = verified.transaction_id(),
            state = %verified.state(),
            is_final = verified.state().is_final(),
            "verified gateway notification"
        );
    }

    Ok(Json(WebhookAck {
        received: true,
        transaction_reference: verified.transaction_reference().to_string(),
        state: verified.state().as_str(),
    }))
}
