use crate::config::AuthConfig;
use crate::models::rate_limit::FailedAttempt;
use crate::storage::{get_json, set_json, KeyValueStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

const ATTEMPTS_PREFIX: &str = "login_attempts_";
const LOCKOUT_PREFIX: &str = "lockout_until_";

/// Gates login attempts per identifier using only timestamp comparisons
/// against the key-value store. An identifier is locked out iff a
/// non-expired lockout timestamp exists; the attempt counter and the
/// lockout marker are mutually exclusive.
#[derive(Clone)]
pub struct LockoutTracker {
    store: Arc<dyn KeyValueStore>,
    config: AuthConfig,
}

impl LockoutTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    fn attempts_key(identifier: &str) -> String {
        format!("{ATTEMPTS_PREFIX}{identifier}")
    }

    fn lockout_key(identifier: &str) -> String {
        format!("{LOCKOUT_PREFIX}{identifier}")
    }

    /// An expired lockout is cleared lazily on read, together with the
    /// attempt counter, so counting restarts from scratch afterwards.
    pub fn is_locked_out(&self, identifier: &str) -> bool {
        let lockout_until: Option<DateTime<Utc>> = get_json(&*self.store, &Self::lockout_key(identifier));
        let Some(lockout_until) = lockout_until else {
            return false;
        };

        if Utc::now() > lockout_until {
            self.store.remove(&Self::lockout_key(identifier));
            self.store.remove(&Self::attempts_key(identifier));
            return false;
        }

        true
    }

    /// Increments the counter; installing the lockout marker and deleting
    /// the counter happen together once the threshold is reached.
    pub fn record_failed_attempt(&self, identifier: &str) -> FailedAttempt {
        let attempts_key = Self::attempts_key(identifier);
        let attempts: u32 = get_json::<u32>(&*self.store, &attempts_key).unwrap_or(0) + 1;

        if attempts >= self.config.max_login_attempts {
            let lockout_until = Utc::now() + Duration::minutes(self.config.lockout_duration_minutes);
            set_json(&*self.store, &Self::lockout_key(identifier), &lockout_until);
            self.store.remove(&attempts_key);
            info!(identifier, attempts, "identifier locked out");

            return FailedAttempt::Locked {
                duration_minutes: self.config.lockout_duration_minutes,
            };
        }

        set_json(&*self.store, &attempts_key, &attempts);

        FailedAttempt::Remaining {
            attempts: self.config.max_login_attempts - attempts,
        }
    }

    /// Called on successful login.
    pub fn reset(&self, identifier: &str) {
        self.store.remove(&Self::attempts_key(identifier));
        self.store.remove(&Self::lockout_key(identifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn tracker() -> (Arc<MemoryStore>, LockoutTracker) {
        let kv = Arc::new(MemoryStore::new());
        let tracker = LockoutTracker::new(kv.clone(), AuthConfig::default());
        (kv, tracker)
    }

    #[test]
    fn unknown_identifier_is_not_locked() {
        let (_, tracker) = tracker();
        assert!(!tracker.is_locked_out("x@example.com"));
    }

    #[test]
    fn five_failures_lock_and_clear_the_counter() {
        let (kv, tracker) = tracker();
        let id = "x@example.com";

        for expected in [4u32, 3, 2, 1] {
            assert_eq!(tracker.record_failed_attempt(id), FailedAttempt::Remaining { attempts: expected });
        }
        assert_eq!(tracker.record_failed_attempt(id), FailedAttempt::Locked { duration_minutes: 15 });

        assert!(tracker.is_locked_out(id));
        assert!(kv.get(&LockoutTracker::attempts_key(id)).is_none());
    }

    #[test]
    fn expired_lockout_clears_lazily_and_counting_restarts() {
        let (kv, tracker) = tracker();
        let id = "x@example.com";

        let past = Utc::now() - Duration::seconds(1);
        set_json(&*kv, &LockoutTracker::lockout_key(id), &past);
        set_json(&*kv, &LockoutTracker::attempts_key(id), &4u32);

        assert!(!tracker.is_locked_out(id));
        assert!(kv.get(&LockoutTracker::lockout_key(id)).is_none());
        assert!(kv.get(&LockoutTracker::attempts_key(id)).is_none());

        // Fresh count starts at 1, not at the pre-lockout value.
        assert_eq!(tracker.record_failed_attempt(id), FailedAttempt::Remaining { attempts: 4 });
    }

    #[test]
    fn reset_clears_both_keys() {
        let (kv, tracker) = tracker();
        let id = "x@example.com";
        tracker.record_failed_attempt(id);
        set_json(&*kv, &LockoutTracker::lockout_key(id), &(Utc::now() + Duration::minutes(5)));

        tracker.reset(id);
        assert!(kv.get(&LockoutTracker::attempts_key(id)).is_none());
        assert!(kv.get(&LockoutTracker::lockout_key(id)).is_none());
        assert!(!tracker.is_locked_out(id));
    }

    #[test]
    fn malformed_counter_restarts_from_one() {
        let (kv, tracker) = tracker();
        let id = "x@example.com";
        kv.set(&LockoutTracker::attempts_key(id), "garbage".to_string());
        assert_eq!(tracker.record_failed_attempt(id), FailedAttempt::Remaining { attempts: 4 });
    }

    proptest! {
        /// Counter and lockout marker are mutually exclusive at every step.
        #[test]
        fn counter_and_marker_never_coexist(failures in 1usize..12) {
            let kv = Arc::new(MemoryStore::new());
            let tracker = LockoutTracker::new(kv.clone(), AuthConfig::default());
            let id = "p@example.com";

            for _ in 0..failures {
                if tracker.is_locked_out(id) {
                    break;
                }
                tracker.record_failed_attempt(id);
                let has_counter = kv.get(&LockoutTracker::attempts_key(id)).is_some();
                let has_marker = kv.get(&LockoutTracker::lockout_key(id)).is_some();
                prop_assert!(!(has_counter && has_marker));
            }
        }
    }
}
