use crate::config::AuthConfig;
use crate::database::activity::ActivityLog;
use crate::database::password_reset::ResetTokenStore;
use crate::database::rate_limit::LockoutTracker;
use crate::database::session::SessionStore;
use crate::database::user::{dummy_verify, hash_password, verify_password, UserRepository};
use crate::error::app_error::AppError;
use crate::models::rate_limit::FailedAttempt;
use crate::models::session::Session;
use crate::models::user::{canonical_phone, NewUser, ProfileUpdate, RegisterRequest, UserProfile};
use chrono::Utc;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::info;
use validator::Validate;

/// Indian mobile numbers: ten digits starting 6-9.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("invalid phone regex"));

const SPECIAL_CHARS: &str = "!@#$%^&*";

/// A login or registration that produced a live session.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub user: UserProfile,
    pub session: Session,
}

/// The authentication workflow: login with lockout bookkeeping,
/// registration, password reset and change, profile and account
/// lifecycle. All state flows through the injected repository and
/// key-value stores.
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    sessions: SessionStore,
    lockouts: LockoutTracker,
    reset_tokens: ResetTokenStore,
    activity: ActivityLog,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        sessions: SessionStore,
        lockouts: LockoutTracker,
        reset_tokens: ResetTokenStore,
        activity: ActivityLog,
        config: AuthConfig,
    ) -> Self {
        Self {
            repo,
            sessions,
            lockouts,
            reset_tokens,
            activity,
            config,
        }
    }

    /// Authenticates by email or phone. Failed attempts count per
    /// identifier whether or not the account exists, and the fifth
    /// failure locks the identifier out. Credentials are checked before
    /// the active flag, so a wrong password on a deactivated account
    /// still reads as invalid credentials.
    pub async fn login(&self, identifier: &str, password: &str, remember_me: bool) -> Result<LoginSuccess, AppError> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(AppError::MissingField("Email or phone"));
        }
        if password.is_empty() {
            return Err(AppError::MissingField("Password"));
        }

        if self.lockouts.is_locked_out(&identifier) {
            return Err(AppError::AccountLocked {
                minutes: self.config.lockout_duration_minutes,
            });
        }

        let Some(user) = self.repo.find_by_identifier(&identifier).await? else {
            // Equalize timing with the existing-user path before counting
            // the failure.
            dummy_verify(password);
            return Err(self.failed_attempt(&identifier, None));
        };

        if verify_password(password, &user.password_hash).is_err() {
            self.activity.record_login(user.id, &identifier, false);
            return Err(self.failed_attempt(&identifier, Some(user.id)));
        }

        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        self.lockouts.reset(&identifier);
        let now = Utc::now();
        self.repo.set_last_login(user.id, now).await?;

        let session = self.sessions.create(&user, remember_me);
        self.activity.record_login(user.id, &identifier, true);
        self.activity.record_activity(&user.email, "Logged in");
        info!(user_id = user.id, "login succeeded");

        let mut profile = UserProfile::from(&user);
        profile.last_login = Some(now);
        Ok(LoginSuccess { user: profile, session })
    }

    fn failed_attempt(&self, identifier: &str, user_id: Option<u32>) -> AppError {
        match self.lockouts.record_failed_attempt(identifier) {
            FailedAttempt::Locked { duration_minutes } => {
                info!(identifier, ?user_id, "login locked out");
                AppError::AccountLocked { minutes: duration_minutes }
            }
            FailedAttempt::Remaining { attempts } => AppError::InvalidCredentials {
                remaining_attempts: Some(attempts),
            },
        }
    }

    /// Validates, creates the account and signs the new user straight in.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<LoginSuccess, AppError> {
        let first_name = required(&request.first_name, "First name")?;
        let last_name = required(&request.last_name, "Last name")?;
        request.email = required(&request.email, "Email")?.to_lowercase();
        request.validate().map_err(|_| AppError::InvalidEmail)?;
        let email = request.email.clone();
        let phone = validate_phone(&request.phone)?;
        self.check_password_strength(&request.password)?;
        if request.password != request.confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repo
            .insert(NewUser {
                first_name,
                last_name,
                email,
                password_hash,
                phone,
                dob: request.dob,
                gender: request.gender,
                city: request.city.unwrap_or_default(),
                state: request.state.unwrap_or_default(),
                blood_group: request.blood_group,
                emergency_contact: request.emergency_contact,
            })
            .await?;

        self.activity.record_registration(user.id, &user.email);
        let session = self.sessions.create(&user, request.remember_me);
        self.activity.record_activity(&user.email, "Account created");
        info!(user_id = user.id, "registration succeeded");

        Ok(LoginSuccess {
            user: UserProfile::from(&user),
            session,
        })
    }

    /// Ends the current session, if any. Attempt counters, activity logs
    /// and the "remember me" preference all survive a logout.
    pub fn logout(&self) {
        if let Some(user) = self.sessions.current_user() {
            self.activity.record_logout(user.id);
            self.activity.record_activity(&user.email, "Logged out");
        }
        self.sessions.destroy();
    }

    /// Issues a reset token for the account behind `identifier`. Returns
    /// `None` for unknown identifiers; callers show the same confirmation
    /// either way so the response does not reveal which accounts exist.
    pub async fn request_password_reset(&self, identifier: &str) -> Result<Option<String>, AppError> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(AppError::MissingField("Email or phone"));
        }

        let Some(user) = self.repo.find_by_identifier(&identifier).await? else {
            return Ok(None);
        };

        let token = self.reset_tokens.issue(user.id);
        info!(user_id = user.id, "password reset requested");
        Ok(Some(token))
    }

    /// Redeems a reset token and installs the new password. The token is
    /// spent even when it turns out to be expired.
    pub async fn reset_password(&self, token: &str, new_password: &str, confirm_password: &str) -> Result<(), AppError> {
        self.check_password_strength(new_password)?;
        if new_password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let user_id = self.reset_tokens.consume(token).ok_or(AppError::InvalidToken)?;
        let hash = hash_password(new_password)?;
        self.repo.set_password_hash(user_id, &hash).await?;

        if let Some(user) = self.repo.find_by_id(user_id).await? {
            self.activity.record_activity(&user.email, "Password reset");
        }
        info!(user_id, "password reset completed");
        Ok(())
    }

    /// Changes the signed-in user's password after re-verifying the
    /// current one.
    pub async fn change_password(&self, current_password: &str, new_password: &str, confirm_password: &str) -> Result<(), AppError> {
        let profile = self.sessions.current_user().ok_or(AppError::NotAuthenticated)?;
        let user = self.repo.find_by_id(profile.id).await?.ok_or(AppError::UserNotFound)?;

        verify_password(current_password, &user.password_hash)?;
        self.check_password_strength(new_password)?;
        if new_password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let hash = hash_password(new_password)?;
        self.repo.set_password_hash(user.id, &hash).await?;
        self.activity.record_activity(&user.email, "Password changed");
        Ok(())
    }

    /// Applies the given profile fields and refreshes the stored session
    /// copy of the user.
    pub async fn update_profile(&self, mut update: ProfileUpdate) -> Result<UserProfile, AppError> {
        let profile = self.sessions.current_user().ok_or(AppError::NotAuthenticated)?;

        if let Some(phone) = &update.phone {
            update.phone = Some(validate_phone(phone)?);
        }

        let user = self.repo.apply_profile_update(profile.id, &update).await?;
        self.sessions.replace_user(&user);
        self.activity.record_activity(&user.email, "Profile updated");
        Ok(UserProfile::from(&user))
    }

    /// Marks the account inactive and ends the session. The record stays
    /// in the store, so the next login attempt reports the deactivation.
    pub async fn deactivate_account(&self) -> Result<(), AppError> {
        let profile = self.sessions.current_user().ok_or(AppError::NotAuthenticated)?;
        self.repo.set_active(profile.id, false).await?;
        info!(user_id = profile.id, "account deactivated");
        self.logout();
        Ok(())
    }

    /// Removes the account record and every per-user storage list, then
    /// ends the session.
    pub async fn delete_account(&self) -> Result<(), AppError> {
        let profile = self.sessions.current_user().ok_or(AppError::NotAuthenticated)?;
        self.repo.delete(profile.id).await?;
        self.activity.purge_user(&profile.email);
        self.sessions.destroy();
        info!(user_id = profile.id, "account deleted");
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.sessions.current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.sessions.is_logged_in()
    }

    pub fn is_profile_complete(&self) -> bool {
        self.sessions.current_user().map(|u| u.profile_complete).unwrap_or(false)
    }

    fn check_password_strength(&self, password: &str) -> Result<(), AppError> {
        if password.is_empty() {
            return Err(AppError::MissingField("Password"));
        }
        if password.len() < self.config.min_password_length {
            return Err(AppError::WeakPassword(format!(
                "Password must be at least {} characters long",
                self.config.min_password_length
            )));
        }

        let mut missing = Vec::new();
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            missing.push("one uppercase letter");
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            missing.push("one lowercase letter");
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            missing.push("one number");
        }
        if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            missing.push("one special character (!@#$%^&*)");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::WeakPassword(format!(
                "Password must contain at least {}",
                missing.join(", ")
            )))
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Reduces to the canonical ten digits and checks the Indian mobile
/// pattern.
fn validate_phone(raw: &str) -> Result<String, AppError> {
    let digits = canonical_phone(raw);
    if !PHONE_RE.is_match(&digits) {
        return Err(AppError::InvalidPhone);
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_repository::MemoryRepository;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn service() -> (Arc<MemoryStore>, AuthService) {
        let kv: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let store: Arc<dyn KeyValueStore> = kv.clone();
        let config = AuthConfig::default();
        let auth = AuthService::new(
            Arc::new(MemoryRepository::seeded()),
            SessionStore::new(store.clone(), config.clone()),
            LockoutTracker::new(store.clone(), config.clone()),
            ResetTokenStore::new(store.clone(), config.clone()),
            ActivityLog::new(store),
            config,
        );
        (kv, auth)
    }

    fn register_request(email: &str, phone: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Asha".to_string(),
            last_name: "Patel".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
            dob: None,
            gender: None,
            city: None,
            state: None,
            blood_group: None,
            emergency_contact: None,
            remember_me: false,
        }
    }

    #[tokio::test]
    async fn seeded_patient_logs_in_by_email() {
        let (_, auth) = service();
        let success = auth.login("bharat@example.com", "patient123", false).await.unwrap();
        assert_eq!(success.user.email, "bharat@example.com");
        assert!(success.user.last_login.is_some());
        assert!(auth.is_logged_in());
    }

    #[tokio::test]
    async fn login_accepts_phone_and_mixed_case_email() {
        let (_, auth) = service();
        assert!(auth.login("+91 98765 43210", "patient123", false).await.is_ok());
        assert!(auth.login("BHARAT@Example.COM", "patient123", false).await.is_ok());
    }

    #[tokio::test]
    async fn failed_logins_count_down_then_lock() {
        let (_, auth) = service();

        for expected in [4u32, 3, 2, 1] {
            let err = auth.login("bharat@example.com", "wrong", false).await.unwrap_err();
            match err {
                AppError::InvalidCredentials { remaining_attempts } => {
                    assert_eq!(remaining_attempts, Some(expected));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let err = auth.login("bharat@example.com", "wrong", false).await.unwrap_err();
        assert!(matches!(err, AppError::AccountLocked { minutes: 15 }));

        // Even the correct password is rejected while locked out.
        let err = auth.login("bharat@example.com", "patient123", false).await.unwrap_err();
        assert!(matches!(err, AppError::AccountLocked { .. }));
    }

    #[tokio::test]
    async fn unknown_identifier_also_counts_toward_lockout() {
        let (_, auth) = service();
        for _ in 0..4 {
            let err = auth.login("ghost@example.com", "whatever", false).await.unwrap_err();
            assert_eq!(err.tag(), "invalid_credentials");
        }
        let err = auth.login("ghost@example.com", "whatever", false).await.unwrap_err();
        assert_eq!(err.tag(), "account_locked");
    }

    #[tokio::test]
    async fn successful_login_resets_the_counter() {
        let (_, auth) = service();
        for _ in 0..3 {
            let _ = auth.login("bharat@example.com", "wrong", false).await;
        }
        auth.login("bharat@example.com", "patient123", false).await.unwrap();

        // Counting starts over after the successful login.
        let err = auth.login("bharat@example.com", "wrong", false).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials { remaining_attempts: Some(4) }));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_lookup() {
        let (_, auth) = service();
        assert_eq!(auth.login("", "x", false).await.unwrap_err().tag(), "missing_fields");
        assert_eq!(auth.login("bharat@example.com", "", false).await.unwrap_err().tag(), "missing_fields");
    }

    #[tokio::test]
    async fn deactivated_account_is_reported_only_with_valid_credentials() {
        let (_, auth) = service();
        auth.login("bharat@example.com", "patient123", false).await.unwrap();
        auth.deactivate_account().await.unwrap();

        let err = auth.login("bharat@example.com", "patient123", false).await.unwrap_err();
        assert_eq!(err.tag(), "account_inactive");

        // A wrong password still reads as invalid credentials.
        let err = auth.login("bharat@example.com", "wrong", false).await.unwrap_err();
        assert_eq!(err.tag(), "invalid_credentials");
    }

    #[tokio::test]
    async fn register_then_login_round_trip() {
        let (_, auth) = service();
        let success = auth.register(register_request("asha@example.com", "9811122233", "Abcdef1!")).await.unwrap();
        assert_eq!(success.user.email, "asha@example.com");
        assert!(auth.is_logged_in());

        auth.logout();
        assert!(auth.login("asha@example.com", "Abcdef1!", false).await.is_ok());
    }

    #[tokio::test]
    async fn register_rejects_bad_inputs() {
        let (_, auth) = service();

        let mut request = register_request("asha@example.com", "9811122233", "Abcdef1!");
        request.email = "not-an-email".to_string();
        assert_eq!(auth.register(request).await.unwrap_err().tag(), "invalid_email");

        // Indian mobiles start with 6-9.
        let request = register_request("asha@example.com", "1234567890", "Abcdef1!");
        assert_eq!(auth.register(request).await.unwrap_err().tag(), "invalid_phone");

        let request = register_request("asha@example.com", "9811122233", "abcdefgh");
        assert_eq!(auth.register(request).await.unwrap_err().tag(), "weak_password");

        let mut request = register_request("asha@example.com", "9811122233", "Abcdef1!");
        request.confirm_password = "Abcdef1?".to_string();
        assert_eq!(auth.register(request).await.unwrap_err().tag(), "password_mismatch");

        let request = register_request("bharat@example.com", "9811122233", "Abcdef1!");
        assert_eq!(auth.register(request).await.unwrap_err().tag(), "user_exists");
    }

    #[tokio::test]
    async fn register_trims_and_lowercases_the_email() {
        let (_, auth) = service();
        let success = auth.register(register_request("  Asha@Example.com  ", "9811122233", "Abcdef1!")).await.unwrap();
        assert_eq!(success.user.email, "asha@example.com");
    }

    #[tokio::test]
    async fn phone_accepts_country_prefix() {
        let (_, auth) = service();
        let success = auth.register(register_request("asha@example.com", "+91 98111 22233", "Abcdef1!")).await.unwrap();
        assert_eq!(success.user.phone, "9811122233");
    }

    #[tokio::test]
    async fn password_strength_names_missing_classes() {
        let (_, auth) = service();
        let request = register_request("asha@example.com", "9811122233", "abcdefg1");
        let err = auth.register(request).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("one uppercase letter"));
        assert!(message.contains("one special character"));
        assert!(!message.contains("one number"));
    }

    #[tokio::test]
    async fn logout_preserves_activity_and_remember_me() {
        let (kv, auth) = service();
        auth.login("bharat@example.com", "patient123", true).await.unwrap();
        auth.logout();

        assert!(!auth.is_logged_in());
        assert_eq!(kv.get("remember_me").as_deref(), Some("true"));
        assert!(kv.get("activities_bharat@example.com").is_some());
    }

    #[tokio::test]
    async fn reset_flow_round_trip() {
        let (_, auth) = service();
        let token = auth.request_password_reset("bharat@example.com").await.unwrap().unwrap();
        auth.reset_password(&token, "Newpass1!", "Newpass1!").await.unwrap();

        assert_eq!(
            auth.login("bharat@example.com", "patient123", false).await.unwrap_err().tag(),
            "invalid_credentials"
        );
        assert!(auth.login("bharat@example.com", "Newpass1!", false).await.is_ok());

        // One-shot token.
        assert_eq!(
            auth.reset_password(&token, "Other1!aa", "Other1!aa").await.unwrap_err().tag(),
            "invalid_token"
        );
    }

    #[tokio::test]
    async fn reset_request_hides_unknown_identifiers() {
        let (_, auth) = service();
        assert!(auth.request_password_reset("ghost@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn change_password_requires_session_and_current_password() {
        let (_, auth) = service();
        assert_eq!(
            auth.change_password("patient123", "Newpass1!", "Newpass1!").await.unwrap_err().tag(),
            "not_authenticated"
        );

        auth.login("bharat@example.com", "patient123", false).await.unwrap();
        assert_eq!(
            auth.change_password("wrong", "Newpass1!", "Newpass1!").await.unwrap_err().tag(),
            "invalid_credentials"
        );

        auth.change_password("patient123", "Newpass1!", "Newpass1!").await.unwrap();
        auth.logout();
        assert!(auth.login("bharat@example.com", "Newpass1!", false).await.is_ok());
    }

    #[tokio::test]
    async fn profile_update_refreshes_the_session_copy() {
        let (_, auth) = service();
        auth.login("priya@example.com", "patient123", false).await.unwrap();
        assert!(!auth.is_profile_complete());

        let update = ProfileUpdate {
            blood_group: Some("A+".to_string()),
            emergency_contact: Some("9876543215".to_string()),
            ..ProfileUpdate::default()
        };
        let profile = auth.update_profile(update).await.unwrap();
        assert!(profile.profile_complete);
        assert!(auth.is_profile_complete());
    }

    #[tokio::test]
    async fn deleted_account_cannot_log_back_in() {
        let (kv, auth) = service();
        auth.login("rahul@example.com", "patient123", false).await.unwrap();
        auth.delete_account().await.unwrap();

        assert!(!auth.is_logged_in());
        assert!(kv.get("activities_rahul@example.com").is_none());
        assert_eq!(
            auth.login("rahul@example.com", "patient123", false).await.unwrap_err().tag(),
            "invalid_credentials"
        );
    }
}
