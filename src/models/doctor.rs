use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: u32,
    pub name: String,
    pub rating: f32,
    pub reviews: u32,
    pub qualification: String,
    pub specialty: String,
    pub hospital: String,
    pub area: String,
    pub city: String,
    pub state: String,
    pub experience_years: u32,
    /// Consultation fees in rupees.
    pub fee_initial: u32,
    pub fee_followup: u32,
    pub available_today: bool,
    pub lat: f64,
    pub lng: f64,
    pub phone: String,
    pub languages: Vec<String>,
    pub expertise: Vec<String>,
    pub video_consultation: bool,
    pub emergency_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Today,
    #[default]
    AnyTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Distance,
    Rating,
    Experience,
    PriceLow,
    PriceHigh,
}

/// Search filters; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DoctorSearch {
    pub specialty: Option<String>,
    pub availability: Availability,
    /// Search origin; falls back to the configured default location.
    pub origin: Option<(f64, f64)>,
    pub radius_km: Option<f64>,
    pub sort: SortBy,
}

/// A doctor together with the distance from the search origin.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorMatch {
    pub doctor: Doctor,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Clinic,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: u32,
    pub doctor_name: String,
    pub hospital: String,
    pub date: NaiveDate,
    pub time: String,
    pub kind: AppointmentKind,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub doctor_id: u32,
    pub date: NaiveDate,
    pub time: String,
    pub kind: AppointmentKind,
    pub reason: Option<String>,
}
