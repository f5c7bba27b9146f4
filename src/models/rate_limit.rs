/// Outcome of recording a failed login attempt for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAttempt {
    /// The failure threshold was reached; a lockout marker is now in place
    /// and the attempt counter has been cleared.
    Locked { duration_minutes: i64 },
    /// Attempts left before the identifier is locked out.
    Remaining { attempts: u32 },
}
