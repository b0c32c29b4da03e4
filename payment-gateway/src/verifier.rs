use crate::canonical::canonicalize_notification;
use crate::error::VerificationFailure;
use crate::model::{VerificationResult, VerifiedNotification, WebhookNotification};
use crate::signer::{Signer, SigningConfig};
use crate::status::map_status;
use common_crypto::{digests_match, validate_digest};
use tracing::warn;

/// Authenticates gateway notifications by recomputing their hash.
#[derive(Debug, Clone)]
pub struct Verifier {
    signer: Signer,
}

impl Verifier {
    pub fn new(config: SigningConfig) -> Self {
        Self { signer: Signer::new(config) }
    }

    /// Check `received_hash` against the notification fields.
    ///
    /// The comparison ignores hex case and leading zeros on both sides.
    pub fn verify(&self, notification: &WebhookNotification, received_hash: &str) -> VerificationResult {
        if received_hash.trim().is_empty() {
            return VerificationResult::failed(VerificationFailure::MissingField { field: "Hash" });
        }
        let fields = match canonicalize_notification(notification) {
            Ok(fields) => fields,
            Err(failure) => return VerificationResult::failed(failure),
        };
        if let Err(err) = validate_digest(received_hash) {
            warn!(
                transaction_reference = notification.transaction_reference.as_deref().unwrap_or_default(),
                error = %err,
                "rejecting notification with malformed hash"
            );
            return VerificationResult::failed(VerificationFailure::InvalidHash);
        }
        let expected = self.signer.sign_fields(&fields);
        if digests_match(&expected, received_hash) {
            VerificationResult::passed()
        } else {
            warn!(
                transaction_reference = notification.transaction_reference.as_deref().unwrap_or_default(),
                transaction_id = notification.transaction_id.as_deref().unwrap_or_default(),
                "notification hash mismatch"
            );
            VerificationResult::failed(VerificationFailure::InvalidHash)
        }
    }

    /// Verify against the notification's own `Hash` and classify its status.
    pub fn authenticate(&self, notification: WebhookNotification) -> Result<VerifiedNotification, VerificationFailure> {
        let received = notification.hash.clone().unwrap_or_default();
        self.verify(&notification, &received).into_result()?;
        let state = map_status(notification.status.as_deref().unwrap_or_default());
        Ok(VerifiedNotification::new(notification, state))
    }
}
