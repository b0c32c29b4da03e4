use crate::canonical::{canonicalize_request, CanonicalFields};
use crate::error::SigningError;
use crate::model::{PaymentRequest, SignedPaymentRequest};
use common_crypto::{sha512_hex_with_secret, sha512_hex_with_secret_lowercased, SecretString};
use std::str::FromStr;
use tracing::debug;

/// Casing applied to the hash pre-image (canonical fields followed by the secret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashCasing {
    /// Hash the pre-image exactly as assembled.
    #[default]
    Preserve,
    /// Lower-case the whole pre-image before hashing.
    Lowercase,
}

impl FromStr for HashCasing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(HashCasing::Preserve),
            "lowercase" | "lower" => Ok(HashCasing::Lowercase),
            other => Err(format!("unknown hash casing '{other}' (expected preserve or lowercase)")),
        }
    }
}

/// Everything the signer and verifier need, handed over at construction.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub secret: SecretString,
    pub casing: HashCasing,
}

impl SigningConfig {
    pub fn new(secret: SecretString) -> Self {
        Self { secret, casing: HashCasing::default() }
    }

    pub fn with_casing(mut self, casing: HashCasing) -> Self {
        self.casing = casing;
        self
    }
}

/// Produces `HashCheck` digests: SHA-512 over the canonical string with the
/// shared secret appended, rendered as lowercase hex.
#[derive(Debug, Clone)]
pub struct Signer {
    config: SigningConfig,
}

impl Signer {
    pub fn new(config: SigningConfig) -> Self {
        Self { config }
    }

    pub fn casing(&self) -> HashCasing {
        self.config.casing
    }

    pub fn sign(&self, canonical: &str) -> String {
        match self.config.casing {
            HashCasing::Preserve => sha512_hex_with_secret(canonical, &self.config.secret),
            HashCasing::Lowercase => sha512_hex_with_secret_lowercased(canonical, &self.config.secret),
        }
    }

    pub fn sign_fields(&self, fields: &CanonicalFields) -> String {
        self.sign(&fields.concat())
    }

    /// Validate, canonicalize and sign a request. The amount carried on the wire is
    /// replaced by its canonical rendering so body and hash cannot disagree.
    pub fn sign_request(
        &self,
        mut request: PaymentRequest,
        api_key: SecretString,
    ) -> Result<SignedPaymentRequest, SigningError> {
        let fields = canonicalize_request(&request)?;
        request.amount = fields.fields()[3].clone();
        let hash_check = self.sign_fields(&fields);
        debug!(
            transaction_reference = %request.transaction_reference,
            amount = %request.amount,
            is_test = request.is_test,
            "signed payment request"
        );
        Ok(SignedPaymentRequest::new(request, hash_check, api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(casing: HashCasing) -> Signer {
        let secret = SecretString::new("215114531AFF7134A94C88CEEA48E").unwrap();
        Signer::new(SigningConfig::new(secret).with_casing(casing))
    }

    #[test]
    fn digest_is_lowercase_hex_of_expected_length() {
        let digest = signer(HashCasing::Preserve).sign("anything");
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn casing_changes_digest_only_for_mixed_case_input() {
        let preserve = signer(HashCasing::Preserve);
        let lower = signer(HashCasing::Lowercase);
        assert_ne!(preserve.sign("TSTSTE0001"), lower.sign("TSTSTE0001"));
        let lowercase_secret = Signer::new(SigningConfig::new(SecretString::new("abc").unwrap()));
        let lowercase_secret_lowered = Signer::new(
            SigningConfig::new(SecretString::new("abc").unwrap()).with_casing(HashCasing::Lowercase),
        );
        assert_eq!(lowercase_secret.sign("site"), lowercase_secret_lowered.sign("site"));
    }

    #[test]
    fn casing_parses_from_config_text() {
        assert_eq!("preserve".parse::<HashCasing>(), Ok(HashCasing::Preserve));
        assert_eq!("LowerCase".parse::<HashCasing>(), Ok(HashCasing::Lowercase));
        assert!("upper".parse::<HashCasing>().is_err());
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", signer(HashCasing::Preserve));
        assert!(!rendered.contains("215114531AFF7134A94C88CEEA48E"));
    }
}
