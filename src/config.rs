use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub geo: GeoConfig,
    pub support: SupportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub min_password_length: usize,
    pub max_login_attempts: u32,
    pub lockout_duration_minutes: i64,
    /// Session lifetime for a plain login.
    pub session_hours: i64,
    /// Session lifetime when "remember me" is chosen.
    pub remember_me_days: i64,
    pub reset_token_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeoConfig {
    pub tile_url_template: String,
    pub overpass_url: String,
    pub nominatim_url: String,
    pub search_radius_km: f64,
    pub default_lat: f64,
    pub default_lng: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupportConfig {
    /// Destination for wa.me deep links, digits with country code.
    pub whatsapp_number: String,
    pub emergency_number: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
            session_hours: 24,
            remember_me_days: 7,
            reset_token_ttl_minutes: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            tile_url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            search_radius_km: 10.0,
            // Kota, Rajasthan
            default_lat: 25.1765,
            default_lng: 75.8451,
        }
    }
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: "14155238886".to_string(),
            emergency_number: "108".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. CopdCare.toml (base configuration file)
    /// 3. Environment variables (prefixed with COPD_)
    pub fn load() -> Result<Self, figment::Error> {
        let defaults = toml::to_string(&Config::default()).map_err(|e| figment::Error::from(e.to_string()))?;
        let figment = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("CopdCare.toml"))
            .merge(Env::prefixed("COPD_").split("_"));

        figment.extract()
    }
}
