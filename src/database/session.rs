use crate::config::AuthConfig;
use crate::models::session::Session;
use crate::models::user::{UserProfile, UserRecord};
use crate::storage::{get_json, set_json, KeyValueStore};
use chrono::{Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use std::sync::Arc;

pub(crate) const SESSION_KEY: &str = "auth_token";
pub(crate) const USER_KEY: &str = "user";
pub(crate) const REMEMBER_ME_KEY: &str = "remember_me";

const TOKEN_LEN: usize = 32;

/// Single-slot session persistence over the key-value store. A new login
/// overwrites whatever session was there before.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    config: AuthConfig,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Issues a fresh opaque token and persists the session alongside the
    /// sanitized user. Expiry is now + 7 days with "remember me", else
    /// now + 24 hours.
    pub fn create(&self, user: &UserRecord, remember_me: bool) -> Session {
        let now = Utc::now();
        let lifetime = if remember_me {
            Duration::days(self.config.remember_me_days)
        } else {
            Duration::hours(self.config.session_hours)
        };

        let session = Session {
            token: Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LEN),
            user_id: user.id,
            email: user.email.clone(),
            created_at: now,
            expires_at: now + lifetime,
        };

        let mut profile = UserProfile::from(user);
        profile.last_login = Some(now);

        set_json(&*self.store, SESSION_KEY, &session);
        set_json(&*self.store, USER_KEY, &profile);
        if remember_me {
            self.store.set(REMEMBER_ME_KEY, "true".to_string());
        }

        session
    }

    /// Returns the live session, purging session and user keys eagerly
    /// when the stored one has expired. Malformed data reads as absence.
    pub fn current(&self) -> Option<Session> {
        let session: Session = get_json(&*self.store, SESSION_KEY)?;
        if session.is_expired() {
            self.destroy();
            return None;
        }
        Some(session)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current()?;
        get_json(&*self.store, USER_KEY)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Removes session and user keys only. The "remember me" preference,
    /// attempt counters and activity logs are intentionally preserved.
    pub fn destroy(&self) {
        self.store.remove(SESSION_KEY);
        self.store.remove(USER_KEY);
    }

    /// Rewrites the stored sanitized user after a profile change, if a
    /// session is live.
    pub fn replace_user(&self, user: &UserRecord) {
        if self.current().is_some() {
            set_json(&*self.store, USER_KEY, &UserProfile::from(user));
        }
    }
}
