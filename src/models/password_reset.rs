use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored reset-token record. Only the SHA-256 hash of the token is kept;
/// the plain token exists solely in the reset link handed to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetToken {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
