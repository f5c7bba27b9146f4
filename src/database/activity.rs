use crate::models::activity::{Activity, LoginEvent, LogoutEvent, RegistrationEvent};
use crate::models::dashboard::Prediction;
use crate::storage::{get_json, push_capped, KeyValueStore};
use chrono::Utc;
use std::sync::Arc;

const LOGIN_EVENTS_KEY: &str = "login_events";
const REGISTRATIONS_KEY: &str = "registrations";
const LOGOUTS_KEY: &str = "logouts";
const ACTIVITIES_PREFIX: &str = "activities_";
const PREDICTIONS_PREFIX: &str = "predictions_";

const EVENT_CAP: usize = 50;
const FEED_CAP: usize = 10;

/// Append-only event journal over the key-value store. Each list is
/// newest-first and capped, so the store never grows without bound.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn KeyValueStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn activities_key(email: &str) -> String {
        format!("{ACTIVITIES_PREFIX}{email}")
    }

    fn predictions_key(email: &str) -> String {
        format!("{PREDICTIONS_PREFIX}{email}")
    }

    /// Identifiers are masked before they hit the journal.
    pub fn record_login(&self, user_id: u32, identifier: &str, success: bool) {
        let event = LoginEvent {
            user_id,
            identifier: mask_identifier(identifier),
            timestamp: Utc::now(),
            success,
        };
        push_capped(&*self.store, LOGIN_EVENTS_KEY, event, EVENT_CAP);
    }

    pub fn record_registration(&self, user_id: u32, email: &str) {
        let event = RegistrationEvent {
            user_id,
            email: mask_identifier(email),
            timestamp: Utc::now(),
        };
        push_capped(&*self.store, REGISTRATIONS_KEY, event, EVENT_CAP);
    }

    pub fn record_logout(&self, user_id: u32) {
        let event = LogoutEvent { user_id, timestamp: Utc::now() };
        push_capped(&*self.store, LOGOUTS_KEY, event, EVENT_CAP);
    }

    /// Per-user feed shown on the dashboard.
    pub fn record_activity(&self, email: &str, action: &str) {
        let entry = Activity {
            action: action.to_string(),
            timestamp: Utc::now(),
        };
        push_capped(&*self.store, &Self::activities_key(email), entry, FEED_CAP);
    }

    pub fn recent_activities(&self, email: &str) -> Vec<Activity> {
        get_json(&*self.store, &Self::activities_key(email)).unwrap_or_default()
    }

    pub fn record_prediction(&self, email: &str, prediction: Prediction) {
        push_capped(&*self.store, &Self::predictions_key(email), prediction, FEED_CAP);
    }

    pub fn predictions(&self, email: &str) -> Vec<Prediction> {
        get_json(&*self.store, &Self::predictions_key(email)).unwrap_or_default()
    }

    pub fn login_events(&self) -> Vec<LoginEvent> {
        get_json(&*self.store, LOGIN_EVENTS_KEY).unwrap_or_default()
    }

    /// Deletes every per-user list (activities, predictions, appointments)
    /// for the given email. Used when an account is removed.
    pub fn purge_user(&self, email: &str) {
        let suffix = format!("_{email}");
        for key in self.store.keys() {
            if key.ends_with(&suffix) {
                self.store.remove(&key);
            }
        }
    }
}

/// Keeps just enough of the identifier to recognize it in a journal:
/// the first two characters of an email's local part plus its domain,
/// or the last four digits of a phone number.
fn mask_identifier(identifier: &str) -> String {
    if let Some((local, domain)) = identifier.split_once('@') {
        let head: String = local.chars().take(2).collect();
        return format!("{head}***@{domain}");
    }

    let digits: Vec<char> = identifier.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 4 {
        let tail: String = digits[digits.len() - 4..].iter().collect();
        return format!("***{tail}");
    }

    "***".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn log() -> (Arc<MemoryStore>, ActivityLog) {
        let kv = Arc::new(MemoryStore::new());
        let log = ActivityLog::new(kv.clone());
        (kv, log)
    }

    #[test]
    fn masks_email_identifiers() {
        assert_eq!(mask_identifier("bharat@example.com"), "bh***@example.com");
        assert_eq!(mask_identifier("a@example.com"), "a***@example.com");
    }

    #[test]
    fn masks_phone_identifiers() {
        assert_eq!(mask_identifier("+91 98765 43210"), "***3210");
        assert_eq!(mask_identifier("108"), "***");
    }

    #[test]
    fn login_events_never_store_the_raw_identifier() {
        let (kv, log) = log();
        log.record_login(1, "bharat@example.com", true);
        let raw = kv.get(LOGIN_EVENTS_KEY).unwrap();
        assert!(!raw.contains("bharat@example.com"));
        assert!(raw.contains("bh***@example.com"));
    }

    #[test]
    fn activity_feed_is_newest_first_and_capped() {
        let (_, log) = log();
        for n in 0..12 {
            log.record_activity("bharat@example.com", &format!("action {n}"));
        }
        let feed = log.recent_activities("bharat@example.com");
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].action, "action 11");
    }

    #[test]
    fn purge_user_removes_every_per_user_list() {
        let (kv, log) = log();
        log.record_activity("bharat@example.com", "Logged in");
        log.record_login(1, "bharat@example.com", true);
        kv.set("appointments_bharat@example.com", "[]".to_string());

        log.purge_user("bharat@example.com");
        assert!(kv.get("activities_bharat@example.com").is_none());
        assert!(kv.get("appointments_bharat@example.com").is_none());
        // The global journal is untouched.
        assert!(kv.get(LOGIN_EVENTS_KEY).is_some());
    }

    #[test]
    fn feeds_are_scoped_per_user() {
        let (_, log) = log();
        log.record_activity("bharat@example.com", "Logged in");
        assert!(log.recent_activities("rahul@example.com").is_empty());
    }
}
