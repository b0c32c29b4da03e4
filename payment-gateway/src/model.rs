use crate::error::VerificationFailure;
use crate::status::TransactionState;
use common_crypto::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Outbound payment request in the gateway's field vocabulary.
///
/// `amount` stays textual: it is validated (exactly two decimals) when the
/// request is canonicalized, not coerced on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentRequest {
    pub site_code: String,
    pub country_code: String,
    pub currency_code: String,
    pub amount: String,
    pub transaction_reference: String,
    pub bank_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_mobile: Option<String>,
    pub cancel_url: String,
    pub error_url: String,
    pub success_url: String,
    pub notify_url: String,
    pub is_test: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional5: Option<String>,
}

impl PaymentRequest {
    pub fn optionals(&self) -> [Option<&str>; 5] {
        [
            self.optional1.as_deref(),
            self.optional2.as_deref(),
            self.optional3.as_deref(),
            self.optional4.as_deref(),
            self.optional5.as_deref(),
        ]
    }
}

/// A payment request with its `HashCheck`. Only [`crate::signer::Signer`] builds one,
/// and the fields cannot be changed afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SignedPaymentRequest {
    #[serde(flatten)]
    request: PaymentRequest,
    #[serde(rename = "HashCheck")]
    hash_check: String,
    #[serde(skip)]
    api_key: SecretString,
}

impl SignedPaymentRequest {
    pub(crate) fn new(request: PaymentRequest, hash_check: String, api_key: SecretString) -> Self {
        Self { request, hash_check, api_key }
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.request
    }

    pub fn hash_check(&self) -> &str {
        &self.hash_check
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Form-encoded body. The form transport carries `ApiKey` as a field as well as a header.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let r = &self.request;
        let mut fields = vec![
            ("SiteCode", r.site_code.clone()),
            ("CountryCode", r.country_code.clone()),
            ("CurrencyCode", r.currency_code.clone()),
            ("Amount", r.amount.clone()),
            ("TransactionReference", r.transaction_reference.clone()),
            ("BankReference", r.bank_reference.clone()),
        ];
        let optional_person = [
            ("Customer", &r.customer),
            ("CustomerName", &r.customer_name),
            ("CustomerMobile", &r.customer_mobile),
        ];
        fields.extend(
            optional_person
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name, v))),
        );
        fields.extend([
            ("CancelUrl", r.cancel_url.clone()),
            ("ErrorUrl", r.error_url.clone()),
            ("SuccessUrl", r.success_url.clone()),
            ("NotifyUrl", r.notify_url.clone()),
            ("IsTest", r.is_test.to_string()),
        ]);
        const OPTIONAL_NAMES: [&str; 5] = ["Optional1", "Optional2", "Optional3", "Optional4", "Optional5"];
        for (name, value) in OPTIONAL_NAMES.into_iter().zip(r.optionals()) {
            if let Some(value) = value {
                fields.push((name, value.to_string()));
            }
        }
        fields.push(("HashCheck", self.hash_check.clone()));
        fields.push(("ApiKey", self.api_key.expose().to_string()));
        fields
    }
}

/// Asynchronous status callback as posted by the gateway (JSON or form-encoded).
///
/// Required fields are optional here so an absent field surfaces as
/// `MissingField` from the verifier instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookNotification {
    #[serde(default)]
    pub site_code: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_reference: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
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
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default, deserialize_with = "loose_flag")]
    pub is_test: Option<bool>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl WebhookNotification {
    pub fn optionals(&self) -> [Option<&str>; 5] {
        [
            self.optional1.as_deref(),
            self.optional2.as_deref(),
            self.optional3.as_deref(),
            self.optional4.as_deref(),
            self.optional5.as_deref(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseValue>::deserialize(deserializer)?.map(|value| match value {
        LooseValue::Text(s) => s,
        LooseValue::Flag(b) => b.to_string(),
        LooseValue::Number(n) => n.to_string(),
    }))
}

fn loose_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseValue::Flag(b)) => Ok(Some(b)),
        Some(LooseValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!("IsTest must be true or false, got '{s}'"))),
        },
        Some(LooseValue::Number(_)) => Err(serde::de::Error::custom("IsTest must be true or false")),
    }
}

/// Outcome of checking one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub reason: Option<VerificationFailure>,
}

impl VerificationResult {
    pub fn passed() -> Self {
        Self { valid: true, reason: None }
    }

    pub fn failed(reason: VerificationFailure) -> Self {
        Self { valid: false, reason: Some(reason) }
    }

    pub fn into_result(self) -> Result<(), VerificationFailure> {
        match (self.valid, self.reason) {
            (true, _) => Ok(()),
            (false, Some(reason)) => Err(reason),
            (false, None) => Err(VerificationFailure::InvalidHash),
        }
    }
}

/// A notification whose hash checked out, with its classified state.
#[derive(Debug, Clone)]
pub struct VerifiedNotification {
    notification: WebhookNotification,
    state: TransactionState,
}

impl VerifiedNotification {
    pub(crate) fn new(notification: WebhookNotification, state: TransactionState) -> Self {
        Self { notification, state }
    }

    pub fn notification(&self) -> &WebhookNotification {
        &self.notification
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn transaction_reference(&self) -> &str {
        self.notification.transaction_reference.as_deref().unwrap_or_default()
    }

    pub fn transaction_id(&self) -> &str {
        self.notification.transaction_id.as_deref().unwrap_or_default()
    }

    pub fn into_inner(self) -> WebhookNotification {
        self.notification
    }
}
