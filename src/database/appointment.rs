use crate::models::doctor::{Appointment, AppointmentStatus};
use crate::storage::{get_json, set_json, KeyValueStore};
use std::sync::Arc;

const APPOINTMENTS_PREFIX: &str = "appointments_";
const APPOINTMENT_CAP: usize = 20;

/// Per-user appointment list in the key-value store, newest-first.
#[derive(Clone)]
pub struct AppointmentBook {
    store: Arc<dyn KeyValueStore>,
}

impl AppointmentBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(email: &str) -> String {
        format!("{APPOINTMENTS_PREFIX}{email}")
    }

    pub fn add(&self, email: &str, appointment: Appointment) {
        let mut appointments = self.list(email);
        appointments.insert(0, appointment);
        appointments.truncate(APPOINTMENT_CAP);
        set_json(&*self.store, &Self::key(email), &appointments);
    }

    pub fn list(&self, email: &str) -> Vec<Appointment> {
        get_json(&*self.store, &Self::key(email)).unwrap_or_default()
    }

    /// Marks the appointment cancelled in place; returns false when the
    /// id is unknown or the appointment was already cancelled.
    pub fn cancel(&self, email: &str, appointment_id: &str) -> bool {
        let mut appointments = self.list(email);
        let Some(appointment) = appointments
            .iter_mut()
            .find(|a| a.id == appointment_id && a.status == AppointmentStatus::Confirmed)
        else {
            return false;
        };

        appointment.status = AppointmentStatus::Cancelled;
        set_json(&*self.store, &Self::key(email), &appointments);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::doctor::AppointmentKind;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, Utc};

    fn appointment(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            doctor_id: 1,
            doctor_name: "Dr. Rakesh Gupta".to_string(),
            hospital: "Kota Heart & Lung Institute".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            time: "10:30 AM".to_string(),
            kind: AppointmentKind::Clinic,
            reason: None,
            status: AppointmentStatus::Confirmed,
            booked_at: Utc::now(),
        }
    }

    #[test]
    fn add_is_newest_first() {
        let book = AppointmentBook::new(Arc::new(MemoryStore::new()));
        book.add("bharat@example.com", appointment("APT1"));
        book.add("bharat@example.com", appointment("APT2"));

        let list = book.list("bharat@example.com");
        assert_eq!(list[0].id, "APT2");
        assert_eq!(list[1].id, "APT1");
    }

    #[test]
    fn lists_are_scoped_per_user() {
        let book = AppointmentBook::new(Arc::new(MemoryStore::new()));
        book.add("bharat@example.com", appointment("APT1"));
        assert!(book.list("rahul@example.com").is_empty());
    }

    #[test]
    fn cancel_marks_in_place_once() {
        let book = AppointmentBook::new(Arc::new(MemoryStore::new()));
        book.add("bharat@example.com", appointment("APT1"));

        assert!(book.cancel("bharat@example.com", "APT1"));
        assert_eq!(book.list("bharat@example.com")[0].status, AppointmentStatus::Cancelled);
        // Already cancelled, nothing to cancel again.
        assert!(!book.cancel("bharat@example.com", "APT1"));
    }

    #[test]
    fn cancel_unknown_id_is_a_no_op() {
        let book = AppointmentBook::new(Arc::new(MemoryStore::new()));
        assert!(!book.cancel("bharat@example.com", "APT404"));
    }
}
