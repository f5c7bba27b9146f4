use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-held proof of a successful login: an opaque token plus expiry.
/// At most one session is persisted per store; a new login overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: u32,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid iff the current time is before its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
