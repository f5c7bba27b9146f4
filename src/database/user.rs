use crate::error::app_error::AppError;
use crate::models::user::{canonical_phone, NewUser, ProfileUpdate, UserRecord};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString};
use std::sync::LazyLock;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that login requests for non-existent users take the same time as
/// requests for existing users.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", Salt::from(&salt))
        .expect("failed to generate dummy hash")
        .to_string()
});

/// Credential store interface. The auth workflow only ever talks to this
/// trait, so a real backend can replace the in-memory store without
/// touching any call site.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up by email (case-insensitive) or by phone after reducing it
    /// to the canonical ten digits.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;
    async fn find_by_id(&self, id: u32) -> Result<Option<UserRecord>, AppError>;
    /// Appends a new record; fails with `UserExists` if the email
    /// (case-insensitive) or normalized phone is already taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError>;
    /// Applies the allowed profile fields and recomputes completeness.
    async fn apply_profile_update(&self, id: u32, update: &ProfileUpdate) -> Result<UserRecord, AppError>;
    async fn set_password_hash(&self, id: u32, hash: &str) -> Result<(), AppError>;
    async fn set_last_login(&self, id: u32, at: DateTime<Utc>) -> Result<(), AppError>;
    async fn set_active(&self, id: u32, active: bool) -> Result<(), AppError>;
    async fn delete(&self, id: u32) -> Result<(), AppError>;
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt_string = SaltString::generate(&mut OsRng);
    let salt = Salt::from(&salt_string);
    let hash = PasswordHash::generate(Argon2::default(), password.as_bytes(), salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials { remaining_attempts: None })?;

    Ok(())
}

/// Perform a throwaway Argon2 verification to equalize response timing
/// regardless of whether the target account exists.
pub fn dummy_verify(password: &str) {
    let hash = PasswordHash::new(&DUMMY_HASH).expect("invalid dummy hash");
    let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
}

/// True when two identifiers refer to the same user record. Stored
/// phones are canonical ten-digit strings, so the identifier is brought
/// to the same form before comparing.
pub(crate) fn identifier_matches(user: &UserRecord, identifier: &str) -> bool {
    user.email.eq_ignore_ascii_case(identifier) || user.phone == canonical_phone(identifier)
}
