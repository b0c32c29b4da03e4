//! Field canonicalization for the gateway hash.
//!
//! The order of the fields is part of the gateway protocol and differs between
//! outbound requests and inbound notifications. Absent optional fields are kept
//! as empty strings so every later field stays in position.

use crate::error::{SigningError, VerificationFailure};
use crate::model::{PaymentRequest, WebhookNotification};
use common_money::GatewayAmount;
use url::Url;

/// Longest BankReference the gateway accepts.
pub const BANK_REFERENCE_MAX: usize = 20;

pub const OUTBOUND_FIELD_ORDER: [&str; 17] = [
    "SiteCode",
    "CountryCode",
    "CurrencyCode",
    "Amount",
    "TransactionReference",
    "BankReference",
    "Customer",
    "CancelUrl",
    "ErrorUrl",
    "SuccessUrl",
    "NotifyUrl",
    "IsTest",
    "Optional1",
    "Optional2",
    "Optional3",
    "Optional4",
    "Optional5",
];

pub const INBOUND_FIELD_ORDER: [&str; 13] = [
    "SiteCode",
    "TransactionId",
    "TransactionReference",
    "Amount",
    "Status",
    "Optional1",
    "Optional2",
    "Optional3",
    "Optional4",
    "Optional5",
    "CurrencyCode",
    "IsTest",
    "StatusMessage",
];

/// Ordered hash inputs, one entry per protocol field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFields(Vec<String>);

impl CanonicalFields {
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Separator-free concatenation in protocol order.
    pub fn concat(&self) -> String {
        self.0.concat()
    }
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SigningError> {
    if value.trim().is_empty() {
        return Err(SigningError::MissingField { field });
    }
    Ok(value)
}

fn absolute_url<'a>(field: &'static str, value: &'a str) -> Result<&'a str, SigningError> {
    let value = required(field, value)?;
    let parsed = Url::parse(value).map_err(|err| SigningError::invalid(field, format!("not an absolute url: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(SigningError::invalid(field, "url must be http(s) with a host"));
    }
    Ok(value)
}

/// Validate a payment request and lay out its hash inputs in outbound order.
pub fn canonicalize_request(request: &PaymentRequest) -> Result<CanonicalFields, SigningError> {
    let amount = GatewayAmount::parse_strict(&request.amount)
        .map_err(|err| SigningError::invalid("Amount", err.to_string()))?;
    let bank_reference = required("BankReference", &request.bank_reference)?;
    if bank_reference.chars().count() > BANK_REFERENCE_MAX {
        return Err(SigningError::invalid(
            "BankReference",
            format!("longer than {BANK_REFERENCE_MAX} characters"),
        ));
    }

    let mut fields = Vec::with_capacity(OUTBOUND_FIELD_ORDER.len());
    fields.push(required("SiteCode", &request.site_code)?.to_string());
    fields.push(required("CountryCode", &request.country_code)?.to_string());
    fields.push(required("CurrencyCode", &request.currency_code)?.to_string());
    fields.push(amount.as_gateway_string());
    fields.push(required("TransactionReference", &request.transaction_reference)?.to_string());
    fields.push(bank_reference.to_string());
    fields.push(request.customer.clone().unwrap_or_default());
    fields.push(absolute_url("CancelUrl", &request.cancel_url)?.to_string());
    fields.push(absolute_url("ErrorUrl", &request.error_url)?.to_string());
    fields.push(absolute_url("SuccessUrl", &request.success_url)?.to_string());
    fields.push(absolute_url("NotifyUrl", &request.notify_url)?.to_string());
    fields.push(flag(request.is_test).to_string());
    fields.extend(request.optionals().into_iter().map(|v| v.unwrap_or_default().to_string()));
    Ok(CanonicalFields(fields))
}

fn present(field: &'static str, value: &Option<String>) -> Result<String, VerificationFailure> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(VerificationFailure::MissingField { field }),
    }
}

/// Lay out a notification's hash inputs in inbound order.
pub fn canonicalize_notification(notification: &WebhookNotification) -> Result<CanonicalFields, VerificationFailure> {
    let site_code = present("SiteCode", &notification.site_code)?;
    let transaction_id = present("TransactionId", &notification.transaction_id)?;
    let transaction_reference = present("TransactionReference", &notification.transaction_reference)?;
    let raw_amount = present("Amount", &notification.amount)?;
    let status = present("Status", &notification.status)?;
    let currency_code = present("CurrencyCode", &notification.currency_code)?;
    let is_test = notification.is_test.ok_or(VerificationFailure::MissingField { field: "IsTest" })?;
    let amount = GatewayAmount::parse_exact(&raw_amount).map_err(|err| VerificationFailure::InvalidFieldFormat {
        field: "Amount",
        reason: err.to_string(),
    })?;

    let mut fields = Vec::with_capacity(INBOUND_FIELD_ORDER.len());
    fields.push(site_code);
    fields.push(transaction_id);
    fields.push(transaction_reference);
    fields.push(amount.as_gateway_string());
    fields.push(status);
    fields.extend(notification.optionals().into_iter().map(|v| v.unwrap_or_default().to_string()));
    fields.push(currency_code);
    fields.push(flag(is_test).to_string());
    fields.push(notification.status_message.clone().unwrap_or_default());
    Ok(CanonicalFields(fields))
}

/// Derive a statement reference from a merchant reference: keep `[A-Za-z0-9- ]`, cap at 20 characters.
pub fn bank_reference_from(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ' ')
        .take(BANK_REFERENCE_MAX)
        .collect()
}
