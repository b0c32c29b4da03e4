use serde::Serialize;
use std::fmt;

/// Transaction outcome as reported by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransactionState {
    Pending,
    Complete,
    Cancelled,
    Error,
    Abandoned,
    /// Status text outside the gateway vocabulary. Do not finalize; investigate.
    Unknown,
}

impl TransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Pending => "pending",
            TransactionState::Complete => "complete",
            TransactionState::Cancelled => "cancelled",
            TransactionState::Error => "error",
            TransactionState::Abandoned => "abandoned",
            TransactionState::Unknown => "unknown",
        }
    }

    /// States after which the gateway sends no further updates for the transaction.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TransactionState::Complete
                | TransactionState::Cancelled
                | TransactionState::Error
                | TransactionState::Abandoned
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw status. Matching is exact and case-sensitive; anything else is `Unknown`.
pub fn map_status(status: &str) -> TransactionState {
    match status {
        "Complete" => TransactionState::Complete,
        "Cancelled" => TransactionState::Cancelled,
        "Error" => TransactionState::Error,
        "Pending" => TransactionState::Pending,
        "Abandoned" => TransactionState::Abandoned,
        _ => TransactionState::Unknown,
    }
}
