pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::database::activity::ActivityLog;
use crate::database::appointment::AppointmentBook;
use crate::database::memory_repository::MemoryRepository;
use crate::database::password_reset::ResetTokenStore;
use crate::database::rate_limit::LockoutTracker;
use crate::database::session::SessionStore;
use crate::database::user::UserRepository;
use crate::service::auth::AuthService;
use crate::service::dashboard::DashboardService;
use crate::service::diet::DietService;
use crate::service::doctor::DoctorService;
use crate::service::geo::GeoClient;
use crate::service::share::ShareService;
use crate::storage::{KeyValueStore, MemoryStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence for fine-grained control per module:
    //   RUST_LOG=debug
    //   RUST_LOG=copd_care=debug
    //   RUST_LOG=info,copd_care::service=trace
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// All services wired over one shared key-value store and credential
/// repository.
pub struct App {
    pub auth: AuthService,
    pub doctors: DoctorService,
    pub diet: DietService,
    pub dashboard: DashboardService,
    pub share: ShareService,
    pub geo: GeoClient,
    pub config: Config,
}

/// Assembles the app against the in-memory stores, seeded with the demo
/// patients.
pub fn build_app(config: Config) -> App {
    build_app_with(config, Arc::new(MemoryStore::new()), Arc::new(MemoryRepository::seeded()))
}

/// Assembles the app over caller-provided storage, for tests or an
/// alternative persistence backend.
pub fn build_app_with(config: Config, store: Arc<dyn KeyValueStore>, repo: Arc<dyn UserRepository>) -> App {
    let activity = ActivityLog::new(store.clone());

    let auth = AuthService::new(
        repo,
        SessionStore::new(store.clone(), config.auth.clone()),
        LockoutTracker::new(store.clone(), config.auth.clone()),
        ResetTokenStore::new(store.clone(), config.auth.clone()),
        activity.clone(),
        config.auth.clone(),
    );

    App {
        auth,
        doctors: DoctorService::new(AppointmentBook::new(store), config.geo.clone()),
        diet: DietService::new(),
        dashboard: DashboardService::new(activity),
        share: ShareService::new(config.support.clone()),
        geo: GeoClient::new(config.geo.clone()),
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::{HealthAssessment, SmokingStatus};

    #[tokio::test]
    async fn assembled_app_shares_one_store() {
        let app = build_app(Config::default());
        let success = app.auth.login("bharat@example.com", "patient123", false).await.unwrap();

        // A prediction recorded through the dashboard shows up in the
        // same activity feed the auth flow writes to.
        let assessment = HealthAssessment {
            age: 41,
            smoking_status: SmokingStatus::Former,
            symptoms: vec!["cough".to_string()],
            oxygen_saturation: 96,
        };
        app.dashboard.assess(&success.user.email, &assessment).await;

        let feed = app.dashboard.recent_activities(&success.user.email);
        assert!(feed.iter().any(|a| a.action == "Logged in"));
        assert!(feed.iter().any(|a| a.action == "Completed health assessment"));
    }
}
