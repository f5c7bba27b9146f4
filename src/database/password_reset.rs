use crate::config::AuthConfig;
use crate::models::password_reset::ResetToken;
use crate::storage::{get_json, set_json, KeyValueStore};
use chrono::{Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const RESET_PREFIX: &str = "reset_token_";
const TOKEN_LEN: usize = 48;

/// Issues and redeems one-shot password reset tokens. Only the SHA-256
/// hash of a token is ever persisted; redeeming compares hashes, so a
/// stolen store dump cannot be replayed into a reset.
#[derive(Clone)]
pub struct ResetTokenStore {
    store: Arc<dyn KeyValueStore>,
    config: AuthConfig,
}

impl ResetTokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    fn key(user_id: u32) -> String {
        format!("{RESET_PREFIX}{user_id}")
    }

    fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Generates a fresh token for the user, replacing any earlier one,
    /// and returns the plain token for delivery.
    pub fn issue(&self, user_id: u32) -> String {
        let token = Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LEN);
        let record = ResetToken {
            token_hash: Self::hash_token(&token),
            expires_at: Utc::now() + Duration::minutes(self.config.reset_token_ttl_minutes),
        };
        set_json(&*self.store, &Self::key(user_id), &record);
        token
    }

    /// Redeems a plain token, returning the user it was issued for. The
    /// stored record is removed whether it matched by expiry or by use,
    /// so a token can never be redeemed twice.
    pub fn consume(&self, token: &str) -> Option<u32> {
        let wanted = Self::hash_token(token);

        for key in self.store.keys() {
            let Some(user_id) = key.strip_prefix(RESET_PREFIX).and_then(|id| id.parse::<u32>().ok()) else {
                continue;
            };
            let Some(record) = get_json::<ResetToken>(&*self.store, &key) else {
                continue;
            };
            if record.token_hash != wanted {
                continue;
            }

            self.store.remove(&key);
            if record.is_expired() {
                return None;
            }
            return Some(user_id);
        }

        None
    }
}
