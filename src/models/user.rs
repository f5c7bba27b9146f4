use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Full user record as held by the credential store. The password hash
/// never leaves this type; everything handed to callers is a [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city: String,
    pub state: String,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_complete: bool,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Sanitized user: everything from [`UserRecord`] except the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city: String,
    pub state: String,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_complete: bool,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            dob: user.dob,
            gender: user.gender,
            city: user.city.clone(),
            state: user.state.clone(),
            blood_group: user.blood_group.clone(),
            emergency_contact: user.emergency_contact.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login: user.last_login,
            profile_complete: user.profile_complete,
        }
    }
}

/// Registration payload. Field-shape checks live on the derive; the
/// workflow layers password strength and uniqueness on top.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
}

/// Validated insert payload; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city: String,
    pub state: String,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Profile fields a signed-in user may change about themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Strip everything but digits.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical form for phone storage and comparison: digits only, with an
/// optional leading 91 country code removed. Lookup, uniqueness checks
/// and registration all agree on this form.
pub fn canonical_phone(raw: &str) -> String {
    let digits = normalize_phone(raw);
    if digits.len() == 12 && digits.starts_with("91") {
        digits[2..].to_string()
    } else {
        digits
    }
}

/// `+91 98765 43210` display form for a 10-digit mobile number.
pub fn format_phone_for_display(phone: &str) -> String {
    let digits = canonical_phone(phone);
    if digits.len() == 10 {
        format!("+91 {} {}", &digits[..5], &digits[5..])
    } else {
        phone.to_string()
    }
}

pub fn calculate_age(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}
