use crate::models::user::{Gender, Role, UserRecord};
use chrono::{NaiveDate, Utc};

pub fn sample_user(id: u32, email: &str, phone: &str) -> UserRecord {
    UserRecord {
        id,
        first_name: "Bharat".to_string(),
        last_name: "Goswami".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$unused$unused".to_string(),
        phone: phone.to_string(),
        dob: NaiveDate::from_ymd_opt(1985, 6, 15),
        gender: Some(Gender::Male),
        city: "Kota".to_string(),
        state: "Rajasthan".to_string(),
        blood_group: Some("B+".to_string()),
        emergency_contact: Some("9876543211".to_string()),
        role: Role::Patient,
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
        profile_complete: true,
    }
}
