use crate::config::GeoConfig;
use crate::database::appointment::AppointmentBook;
use crate::error::app_error::AppError;
use crate::models::doctor::{
    Appointment, AppointmentStatus, Availability, BookingRequest, Doctor, DoctorMatch, DoctorSearch, SortBy,
};
use chrono::Utc;
use tracing::info;

/// Directory lookup, distance-aware search and appointment booking over
/// the bundled pulmonologist directory for Kota.
pub struct DoctorService {
    directory: Vec<Doctor>,
    appointments: AppointmentBook,
    config: GeoConfig,
}

impl DoctorService {
    pub fn new(appointments: AppointmentBook, config: GeoConfig) -> Self {
        Self {
            directory: doctor_directory(),
            appointments,
            config,
        }
    }

    pub fn all(&self) -> &[Doctor] {
        &self.directory
    }

    pub fn find(&self, id: u32) -> Result<&Doctor, AppError> {
        self.directory.iter().find(|d| d.id == id).ok_or(AppError::DoctorNotFound)
    }

    /// Filters by specialty substring and availability, drops everything
    /// outside the search radius, and sorts by the requested key.
    /// Distance is measured from the search origin, defaulting to the
    /// configured city center.
    pub async fn search(&self, search: &DoctorSearch) -> Vec<DoctorMatch> {
        let (lat, lng) = search.origin.unwrap_or((self.config.default_lat, self.config.default_lng));
        let radius_km = search.radius_km.unwrap_or(self.config.search_radius_km);

        let mut matches: Vec<DoctorMatch> = self
            .directory
            .iter()
            .filter(|d| match &search.specialty {
                Some(wanted) => d.specialty.to_lowercase().contains(&wanted.to_lowercase()),
                None => true,
            })
            .filter(|d| search.availability == Availability::AnyTime || d.available_today)
            .map(|d| DoctorMatch {
                doctor: d.clone(),
                distance_km: haversine_km(lat, lng, d.lat, d.lng),
            })
            .filter(|m| m.distance_km <= radius_km)
            .collect();

        match search.sort {
            SortBy::Distance => matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km)),
            SortBy::Rating => matches.sort_by(|a, b| b.doctor.rating.total_cmp(&a.doctor.rating)),
            SortBy::Experience => matches.sort_by(|a, b| b.doctor.experience_years.cmp(&a.doctor.experience_years)),
            SortBy::PriceLow => matches.sort_by(|a, b| a.doctor.fee_initial.cmp(&b.doctor.fee_initial)),
            SortBy::PriceHigh => matches.sort_by(|a, b| b.doctor.fee_initial.cmp(&a.doctor.fee_initial)),
        }

        matches
    }

    /// Books an appointment for the given user and returns the confirmed
    /// record with its `APT`-prefixed booking id.
    pub async fn book(&self, email: &str, request: BookingRequest) -> Result<Appointment, AppError> {
        let doctor = self.find(request.doctor_id)?;
        if request.time.trim().is_empty() {
            return Err(AppError::MissingField("Appointment time"));
        }

        let appointment = Appointment {
            id: format!("APT{}", Utc::now().timestamp_millis()),
            doctor_id: doctor.id,
            doctor_name: doctor.name.clone(),
            hospital: doctor.hospital.clone(),
            date: request.date,
            time: request.time,
            kind: request.kind,
            reason: request.reason,
            status: AppointmentStatus::Confirmed,
            booked_at: Utc::now(),
        };

        self.appointments.add(email, appointment.clone());
        info!(booking_id = %appointment.id, doctor_id = doctor.id, "appointment booked");
        Ok(appointment)
    }

    pub fn appointments(&self, email: &str) -> Vec<Appointment> {
        self.appointments.list(email)
    }

    /// True when a confirmed appointment with this id existed and is now
    /// cancelled.
    pub fn cancel(&self, email: &str, appointment_id: &str) -> bool {
        self.appointments.cancel(email, appointment_id)
    }
}

/// Great-circle distance between two coordinates.
fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

fn doctor_directory() -> Vec<Doctor> {
    let doctor = |id: u32,
                  name: &str,
                  rating: f32,
                  reviews: u32,
                  qualification: &str,
                  specialty: &str,
                  hospital: &str,
                  area: &str,
                  experience_years: u32,
                  fee_initial: u32,
                  fee_followup: u32,
                  available_today: bool,
                  lat: f64,
                  lng: f64,
                  phone: &str,
                  languages: &[&str],
                  expertise: &[&str],
                  video_consultation: bool,
                  emergency_available: bool| Doctor {
        id,
        name: name.to_string(),
        rating,
        reviews,
        qualification: qualification.to_string(),
        specialty: specialty.to_string(),
        hospital: hospital.to_string(),
        area: area.to_string(),
        city: "Kota".to_string(),
        state: "Rajasthan".to_string(),
        experience_years,
        fee_initial,
        fee_followup,
        available_today,
        lat,
        lng,
        phone: phone.to_string(),
        languages: languages.iter().map(|s| s.to_string()).collect(),
        expertise: expertise.iter().map(|s| s.to_string()).collect(),
        video_consultation,
        emergency_available,
    };

    vec![
        doctor(
            1,
            "Dr. Rakesh Gupta",
            4.8,
            150,
            "MD, FCCP",
            "Senior Pulmonologist",
            "Apex Lung Centre",
            "Talwandi",
            18,
            800,
            500,
            true,
            25.1765,
            75.8451,
            "+91 98765 43210",
            &["English", "Hindi", "Rajasthani"],
            &[
                "COPD Management",
                "Asthma",
                "Interstitial Lung Disease",
                "Pulmonary Rehabilitation",
                "Bronchoscopy",
                "Sleep Apnea",
            ],
            true,
            true,
        ),
        doctor(
            2,
            "Dr. Suman Verma",
            4.7,
            88,
            "DNB",
            "Chest Physician & Allergist",
            "Maitri Hospital",
            "Vigan Nagar",
            10,
            600,
            400,
            true,
            25.1698,
            75.8423,
            "+91 98765 43211",
            &["English", "Hindi"],
            &[
                "Allergic Asthma",
                "COPD",
                "Respiratory Allergies",
                "Pulmonary Function Testing",
                "Immunotherapy",
            ],
            true,
            false,
        ),
        doctor(
            3,
            "Dr. Amit Jain",
            4.5,
            65,
            "MD",
            "Pulmonologist",
            "Kota Heart & Lung Institute",
            "Civil Lines",
            8,
            500,
            300,
            false,
            25.1723,
            75.8489,
            "+91 98765 43212",
            &["English", "Hindi"],
            &["COPD", "Asthma", "Respiratory Infections", "Tuberculosis", "Sleep Disorders"],
            false,
            true,
        ),
        doctor(
            4,
            "Dr. Priya Sharma",
            4.9,
            200,
            "MD, FCCP",
            "Respiratory Specialist",
            "Shree Hospital",
            "Kunadi",
            15,
            900,
            600,
            true,
            25.1634,
            75.8312,
            "+91 98765 43213",
            &["English", "Hindi", "Punjabi"],
            &[
                "Interventional Pulmonology",
                "Lung Cancer Screening",
                "COPD",
                "Pulmonary Hypertension",
                "Critical Care",
                "Bronchoscopy",
            ],
            true,
            true,
        ),
        doctor(
            5,
            "Dr. Vikas Mehta",
            4.6,
            120,
            "DM",
            "Critical Care Specialist",
            "MBS Hospital",
            "Nayapura",
            12,
            700,
            400,
            false,
            25.1689,
            75.8398,
            "+91 98765 43214",
            &["English", "Hindi"],
            &[
                "Critical Care",
                "Ventilator Management",
                "Sepsis",
                "ARDS",
                "COPD Exacerbations",
                "Post-ICU Rehabilitation",
            ],
            true,
            true,
        ),
        doctor(
            6,
            "Dr. Neha Gupta",
            4.8,
            95,
            "MD",
            "Pediatric Pulmonologist",
            "Children's Lung Center",
            "Dadabari",
            9,
            650,
            400,
            true,
            25.1587,
            75.8523,
            "+91 98765 43215",
            &["English", "Hindi"],
            &[
                "Pediatric Asthma",
                "Childhood COPD",
                "Respiratory Allergies in Children",
                "Cystic Fibrosis",
                "Neonatal Respiratory Care",
            ],
            true,
            true,
        ),
        doctor(
            7,
            "Dr. Rajesh Kumar",
            4.4,
            78,
            "MD",
            "Sleep Medicine Specialist",
            "Kota Sleep Clinic",
            "Mahaveer Nagar",
            7,
            550,
            350,
            true,
            25.1812,
            75.8621,
            "+91 98765 43216",
            &["English", "Hindi"],
            &["Sleep Apnea", "Insomnia", "CPAP Therapy", "Sleep Studies", "COPD-Related Sleep Disorders"],
            false,
            false,
        ),
    ]
}
