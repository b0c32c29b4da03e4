use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

/// Hex characters in a full SHA-512 digest.
pub const SHA512_HEX_LENGTH: usize = 128;

/// Errors produced by the common-crypto helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("secret must not be empty")]
    EmptySecret,
    #[error("digest is not hexadecimal")]
    NotHex,
    #[error("digest has {actual} hex characters, expected at most {expected}")]
    DigestLength { expected: usize, actual: usize },
}

/// A credential held only in process memory.
///
/// The buffer is wiped on drop and `Debug` never prints the value, so a secret
/// that ends up in a `tracing` field or a panic message stays redacted.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Result<Self, CryptoError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(Zeroizing::new(value)))
    }

    /// Borrow the cleartext. Callers must not log or persist it.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretString").field(&"***redacted***").finish()
    }
}

/// SHA-512 over the UTF-8 bytes of `message` followed by `secret`, as lowercase hex.
///
/// The pre-image is assembled in a zeroizing buffer because it embeds the secret.
pub fn sha512_hex_with_secret(message: &str, secret: &SecretString) -> String {
    let mut preimage = Zeroizing::new(String::with_capacity(message.len() + secret.expose().len()));
    preimage.push_str(message);
    preimage.push_str(secret.expose());
    sha512_hex(preimage.as_bytes())
}

/// As [`sha512_hex_with_secret`], with the whole pre-image lower-cased first.
pub fn sha512_hex_with_secret_lowercased(message: &str, secret: &SecretString) -> String {
    let mut preimage = Zeroizing::new(String::with_capacity(message.len() + secret.expose().len()));
    preimage.push_str(message);
    preimage.push_str(secret.expose());
    let lowered = Zeroizing::new(preimage.to_lowercase());
    sha512_hex(lowered.as_bytes())
}

pub fn sha512_hex(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// Reduce a received digest to the form used for comparison: lowercase, no leading zeros.
pub fn normalize_digest(digest: &str) -> String {
    digest.trim().to_ascii_lowercase().trim_start_matches('0').to_string()
}

/// Check that a received digest is plausible hex before comparing it.
pub fn validate_digest(digest: &str) -> Result<(), CryptoError> {
    let trimmed = digest.trim();
    if trimmed.len() > SHA512_HEX_LENGTH {
        return Err(CryptoError::DigestLength { expected: SHA512_HEX_LENGTH, actual: trimmed.len() });
    }
    if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CryptoError::NotHex);
    }
    Ok(())
}

/// Compare two hex digests ignoring case and leading zero padding.
///
/// The byte comparison is constant-time over the normalized forms; a length
/// difference after normalization is a mismatch.
pub fn digests_match(expected: &str, received: &str) -> bool {
    let expected = normalize_digest(expected);
    let received = normalize_digest(received);
    if expected.is_empty() || received.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA512: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

    #[test]
    fn sha512_known_vector() {
        assert_eq!(sha512_hex(b"abc"), ABC_SHA512);
    }

    #[test]
    fn secret_is_appended_after_message() {
        let secret = SecretString::new("c").unwrap();
        assert_eq!(sha512_hex_with_secret("ab", &secret), ABC_SHA512);
    }

    #[test]
    fn lowercased_preimage_includes_secret() {
        let secret = SecretString::new("C").unwrap();
        assert_eq!(sha512_hex_with_secret_lowercased("AB", &secret), ABC_SHA512);
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SecretString::new("super-secret-key").unwrap();
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(SecretString::new("   ").unwrap_err(), CryptoError::EmptySecret);
    }

    #[test]
    fn match_ignores_case_and_leading_zeros() {
        assert!(digests_match("0abc12", "ABC12"));
        assert!(digests_match("00ABC12", "0abc12"));
        assert!(digests_match(ABC_SHA512, &ABC_SHA512.to_uppercase()));
    }

    #[test]
    fn match_rejects_other_differences() {
        assert!(!digests_match("0abc12", "abc13"));
        assert!(!digests_match("abc12", "abc120"));
        assert!(!digests_match("abc12", ""));
        assert!(!digests_match("000", "0"));
    }

    #[test]
    fn digest_validation() {
        assert!(validate_digest(ABC_SHA512).is_ok());
        assert_eq!(validate_digest("xyz"), Err(CryptoError::NotHex));
        let long = "a".repeat(SHA512_HEX_LENGTH + 1);
        assert!(matches!(validate_digest(&long), Err(CryptoError::DigestLength { .. })));
    }
}
