use crate::database::user::{hash_password, identifier_matches, UserRepository};
use crate::error::app_error::AppError;
use crate::models::user::{canonical_phone, Gender, NewUser, ProfileUpdate, Role, UserRecord};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::Mutex;

/// In-memory credential store seeded with the demo patients. State lives
/// for the lifetime of the process; a restart reverts to the seed while
/// the key-value store (sessions, counters, logs) is managed separately.
pub struct MemoryRepository {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryRepository {
    pub fn empty() -> Self {
        Self { users: Mutex::new(Vec::new()) }
    }

    /// The three demo patients, all with password `patient123`.
    pub fn seeded() -> Self {
        Self {
            users: Mutex::new(seed_users()),
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| identifier_matches(u, identifier)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_id(&self, id: u32) -> Result<Option<UserRecord>, AppError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users.lock().await;

        let phone = canonical_phone(&user.phone);
        let taken = users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email) || u.phone == phone);
        if taken {
            return Err(AppError::UserExists);
        }

        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let record = UserRecord {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.to_lowercase(),
            password_hash: user.password_hash,
            phone,
            dob: user.dob,
            gender: user.gender,
            city: user.city,
            state: user.state,
            blood_group: user.blood_group,
            emergency_contact: user.emergency_contact,
            role: Role::Patient,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
            profile_complete: user.dob.is_some() && user.gender.is_some(),
        };
        users.push(record.clone());

        Ok(record)
    }

    async fn apply_profile_update(&self, id: u32, update: &ProfileUpdate) -> Result<UserRecord, AppError> {
        let mut users = self.users.lock().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;

        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(phone) = &update.phone {
            user.phone = canonical_phone(phone);
        }
        if let Some(dob) = update.dob {
            user.dob = Some(dob);
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }
        if let Some(city) = &update.city {
            user.city = city.clone();
        }
        if let Some(state) = &update.state {
            user.state = state.clone();
        }
        if let Some(blood_group) = &update.blood_group {
            user.blood_group = Some(blood_group.clone());
        }
        if let Some(emergency_contact) = &update.emergency_contact {
            user.emergency_contact = Some(emergency_contact.clone());
        }

        user.profile_complete =
            user.dob.is_some() && user.gender.is_some() && user.blood_group.is_some() && user.emergency_contact.is_some();

        Ok(user.clone())
    }

    async fn set_password_hash(&self, id: u32, hash: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;
        user.password_hash = hash.to_string();
        Ok(())
    }

    async fn set_last_login(&self, id: u32, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn set_active(&self, id: u32, active: bool) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or(AppError::UserNotFound)?;
        user.is_active = active;
        Ok(())
    }

    async fn delete(&self, id: u32) -> Result<(), AppError> {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}

fn seed_users() -> Vec<UserRecord> {
    let patient123 = hash_password("patient123").expect("failed to hash seed password");

    let seed = |id: u32,
                first_name: &str,
                last_name: &str,
                email: &str,
                phone: &str,
                dob: (i32, u32, u32),
                gender: Gender,
                city: &str,
                state: &str,
                blood_group: &str,
                emergency_contact: &str,
                created: (i32, u32, u32),
                profile_complete: bool| UserRecord {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password_hash: patient123.clone(),
        phone: phone.to_string(),
        dob: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2),
        gender: Some(gender),
        city: city.to_string(),
        state: state.to_string(),
        blood_group: Some(blood_group.to_string()),
        emergency_contact: Some(emergency_contact.to_string()),
        role: Role::Patient,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(created.0, created.1, created.2, 0, 0, 0).unwrap(),
        last_login: None,
        profile_complete,
    };

    vec![
        seed(
            1,
            "Bharat",
            "Goswami",
            "bharat@example.com",
            "9876543210",
            (1985, 6, 15),
            Gender::Male,
            "Kota",
            "Rajasthan",
            "B+",
            "9876543211",
            (2026, 1, 1),
            true,
        ),
        seed(
            2,
            "Rahul",
            "Sharma",
            "rahul@example.com",
            "9876543212",
            (1990, 3, 20),
            Gender::Male,
            "Jaipur",
            "Rajasthan",
            "O+",
            "9876543213",
            (2026, 1, 15),
            true,
        ),
        seed(
            3,
            "Priya",
            "Verma",
            "priya@example.com",
            "9876543214",
            (1988, 11, 10),
            Gender::Female,
            "Delhi",
            "Delhi",
            "A+",
            "9876543215",
            (2026, 2, 1),
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;

    fn new_user(email: &str, phone: &str) -> NewUser {
        NewUser {
            first_name: "Asha".to_string(),
            last_name: "Patel".to_string(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            phone: phone.to_string(),
            dob: None,
            gender: None,
            city: String::new(),
            state: String::new(),
            blood_group: None,
            emergency_contact: None,
        }
    }

    #[tokio::test]
    async fn seeded_store_resolves_identifiers() {
        let repo = MemoryRepository::seeded();
        assert!(repo.find_by_identifier("bharat@example.com").await.unwrap().is_some());
        assert!(repo.find_by_identifier("RAHUL@EXAMPLE.COM").await.unwrap().is_some());
        assert!(repo.find_by_identifier("+91 98765 43214").await.unwrap().is_some());
        assert!(repo.find_by_identifier("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email_without_mutation() {
        let repo = MemoryRepository::seeded();
        let err = repo.insert(new_user("BHARAT@example.com", "9999999999")).await.unwrap_err();
        assert_eq!(err.tag(), "user_exists");
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_phone() {
        let repo = MemoryRepository::seeded();
        let err = repo.insert(new_user("asha@example.com", "+91 98765 43210")).await.unwrap_err();
        assert_eq!(err.tag(), "user_exists");
    }

    #[tokio::test]
    async fn insert_assigns_next_id_and_normalizes() {
        let repo = MemoryRepository::seeded();
        let user = repo.insert(new_user("Asha@Example.com", "+91 98888 77766")).await.unwrap();
        assert_eq!(user.id, 4);
        assert_eq!(user.email, "asha@example.com");
        assert_eq!(user.phone, "9888877766");
        assert!(user.is_active);
        assert!(!user.profile_complete);
    }

    #[tokio::test]
    async fn country_coded_phone_round_trips_through_lookup() {
        let repo = MemoryRepository::seeded();
        repo.insert(new_user("asha@example.com", "+91 98888 77766")).await.unwrap();
        assert!(repo.find_by_identifier("9888877766").await.unwrap().is_some());
        assert!(repo.find_by_identifier("+91 98888 77766").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn profile_update_recomputes_completeness() {
        let repo = MemoryRepository::seeded();
        // Priya has no complete profile in the seed
        let update = ProfileUpdate {
            blood_group: Some("A+".to_string()),
            emergency_contact: Some("9876543215".to_string()),
            ..ProfileUpdate::default()
        };
        let user = repo.apply_profile_update(3, &update).await.unwrap();
        assert!(user.profile_complete);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = MemoryRepository::seeded();
        repo.delete(2).await.unwrap();
        assert!(repo.find_by_id(2).await.unwrap().is_none());
        assert_eq!(repo.delete(2).await.unwrap_err().tag(), "user_not_found");
    }
}
