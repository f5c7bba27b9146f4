use thiserror::Error;

/// Application error taxonomy. Every recoverable failure carries a stable
/// string tag (see [`AppError::tag`]) so callers can branch on the kind of
/// failure without matching on display text.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Too many failed attempts. Please try again after {minutes} minutes.")]
    AccountLocked { minutes: i64 },
    #[error("Invalid email/phone or password")]
    InvalidCredentials { remaining_attempts: Option<u32> },
    #[error("Your account has been deactivated. Please contact support.")]
    AccountInactive,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit Indian phone number")]
    InvalidPhone,
    #[error("{0}")]
    WeakPassword(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("User with this email or phone already exists")]
    UserExists,
    #[error("Invalid or expired reset token")]
    InvalidToken,
    #[error("You must be logged in to perform this action")]
    NotAuthenticated,
    #[error("User not found")]
    UserNotFound,
    #[error("Doctor not found")]
    DoctorNotFound,
    #[error("Internal error")]
    PasswordHash { message: String },
    #[error("Failed to read configuration")]
    Configuration {
        #[source]
        source: figment::Error,
    },
}

impl AppError {
    pub fn password_hash(message: impl Into<String>, source: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }

    /// Stable machine-readable tag for this error.
    pub fn tag(&self) -> &'static str {
        match self {
            AppError::AccountLocked { .. } => "account_locked",
            AppError::InvalidCredentials { .. } => "invalid_credentials",
            AppError::AccountInactive => "account_inactive",
            AppError::MissingField(_) => "missing_fields",
            AppError::InvalidEmail => "invalid_email",
            AppError::InvalidPhone => "invalid_phone",
            AppError::WeakPassword(_) => "weak_password",
            AppError::PasswordMismatch => "password_mismatch",
            AppError::UserExists => "user_exists",
            AppError::InvalidToken => "invalid_token",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::UserNotFound => "user_not_found",
            AppError::DoctorNotFound => "doctor_not_found",
            AppError::PasswordHash { .. } => "internal_error",
            AppError::Configuration { .. } => "internal_error",
        }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Configuration { source: e }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_taxonomy() {
        assert_eq!(AppError::AccountLocked { minutes: 15 }.tag(), "account_locked");
        assert_eq!(
            AppError::InvalidCredentials { remaining_attempts: Some(3) }.tag(),
            "invalid_credentials"
        );
        assert_eq!(AppError::MissingField("email").tag(), "missing_fields");
        assert_eq!(AppError::UserExists.tag(), "user_exists");
        assert_eq!(AppError::NotAuthenticated.tag(), "not_authenticated");
    }

    #[test]
    fn lockout_message_includes_duration() {
        let err = AppError::AccountLocked { minutes: 15 };
        assert!(err.to_string().contains("15 minutes"));
    }
}
