use crate::signer::{HashCasing, SigningConfig};
use anyhow::{anyhow, Context, Result};
use common_crypto::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Body encoding used when submitting a signed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayTransport {
    #[default]
    Json,
    Form,
}

impl FromStr for GatewayTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(GatewayTransport::Json),
            "form" => Ok(GatewayTransport::Form),
            other => Err(format!("unknown gateway transport '{other}' (expected json or form)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub site_code: String,
    pub country_code: String,
    pub currency_code: String,
    pub private_key: SecretString,
    pub api_key: SecretString,
    pub api_url: String,
    pub redirect_base_url: String,
    pub webhook_base_url: String,
    pub is_test: bool,
    pub hash_casing: HashCasing,
    pub transport: GatewayTransport,
    pub timeout_secs: u64,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_code = lookup("GATEWAY_SITE_CODE").context("GATEWAY_SITE_CODE must be set")?;
        let private_key = lookup("GATEWAY_PRIVATE_KEY").context("GATEWAY_PRIVATE_KEY must be set")?;
        let private_key = SecretString::new(private_key).context("GATEWAY_PRIVATE_KEY must not be empty")?;
        let api_key = lookup("GATEWAY_API_KEY").context("GATEWAY_API_KEY must be set")?;
        let api_key = SecretString::new(api_key).context("GATEWAY_API_KEY must not be empty")?;
        let redirect_base_url = lookup("REDIRECT_BASE_URL").context("REDIRECT_BASE_URL must be set")?;
        let webhook_base_url = lookup("WEBHOOK_BASE_URL").context("WEBHOOK_BASE_URL must be set")?;
        let country_code = lookup("GATEWAY_COUNTRY_CODE").unwrap_or_else(|| "ZA".to_string());
        let currency_code = lookup("GATEWAY_CURRENCY_CODE").unwrap_or_else(|| "ZAR".to_string());
        let api_url = lookup("GATEWAY_API_URL").unwrap_or_else(|| "https://api.ozow.com".to_string());
        let is_test = lookup("GATEWAY_IS_TEST")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(true);
        let hash_casing = match lookup("GATEWAY_HASH_CASING") {
            Some(value) => value.parse::<HashCasing>().map_err(|err| anyhow!(err))?,
            None => HashCasing::default(),
        };
        let transport = match lookup("GATEWAY_TRANSPORT") {
            Some(value) => value.parse::<GatewayTransport>().map_err(|err| anyhow!(err))?,
            None => GatewayTransport::default(),
        };
        let timeout_secs = lookup("GATEWAY_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30);
        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|csv| {
                csv.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(10000);

        Ok(Self {
            site_code,
            country_code,
            currency_code,
            private_key,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            redirect_base_url: redirect_base_url.trim_end_matches('/').to_string(),
            webhook_base_url: webhook_base_url.trim_end_matches('/').to_string(),
            is_test,
            hash_casing,
            transport,
            timeout_secs: timeout_secs.max(1),
            allowed_origins,
            host,
            port,
        })
    }

    pub fn signing_config(&self) -> SigningConfig {
        SigningConfig::new(self.private_key.clone()).with_casing(self.hash_casing)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/api/payments/redirect/cancel", self.redirect_base_url)
    }

    pub fn error_url(&self) -> String {
        format!("{}/api/payments/redirect/error", self.redirect_base_url)
    }

    pub fn success_url(&self) -> String {
        format!("{}/api/payments/redirect/success", self.redirect_base_url)
    }

    pub fn notify_url(&self) -> String {
        format!("{}/api/payments/webhook", self.webhook_base_url)
    }

    pub fn mode(&self) -> &'static str {
        if self.is_test { "test" } else { "live" }
    }
}
