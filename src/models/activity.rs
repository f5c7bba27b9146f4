use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successful login, recorded with a masked identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginEvent {
    pub user_id: u32,
    pub identifier: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub user_id: u32,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutEvent {
    pub user_id: u32,
    pub timestamp: DateTime<Utc>,
}

/// One line in the dashboard's recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub action: String,
    pub timestamp: DateTime<Utc>,
}
