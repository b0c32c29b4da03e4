use common_http_errors::ApiError;
use serde::Serialize;
use thiserror::Error;

/// Why a payment request could not be signed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("field '{field}' has an invalid format: {reason}")]
    InvalidFieldFormat { field: &'static str, reason: String },
    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },
}

impl SigningError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFieldFormat { field, reason: reason.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SigningError::InvalidFieldFormat { .. } => "invalid_field_format",
            SigningError::MissingField { .. } => "missing_field",
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        ApiError::BadRequest { code: err.code(), trace_id: None, message: Some(err.to_string()) }
    }
}

/// Why a notification was not trusted.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum VerificationFailure {
    #[error("notification hash does not match")]
    InvalidHash,
    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("field '{field}' has an invalid format: {reason}")]
    InvalidFieldFormat { field: &'static str, reason: String },
}

impl VerificationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            VerificationFailure::InvalidHash => "invalid_hash",
            VerificationFailure::MissingField { .. } => "missing_field",
            VerificationFailure::InvalidFieldFormat { .. } => "invalid_field_format",
        }
    }
}

/// Hash mismatches are 401, malformed notifications 400. Never 5xx.
impl From<VerificationFailure> for ApiError {
    fn from(failure: VerificationFailure) -> Self {
        let code = failure.code();
        let message = Some(failure.to_string());
        match failure {
            VerificationFailure::InvalidHash => ApiError::Unauthorized { code, trace_id: None, message },
            VerificationFailure::MissingField { .. } | VerificationFailure::InvalidFieldFormat { .. } => {
                ApiError::BadRequest { code, trace_id: None, message }
            }
        }
    }
}
