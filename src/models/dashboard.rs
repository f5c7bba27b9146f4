use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Score bands: 0-30 low, 31-60 moderate, above high.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=30 => RiskLevel::Low,
            31..=60 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmokingStatus {
    Never,
    Former,
    Current,
}

/// Self-reported inputs for the risk assessment.
#[derive(Debug, Clone)]
pub struct HealthAssessment {
    pub age: u32,
    pub smoking_status: SmokingStatus,
    pub symptoms: Vec<String>,
    /// SpO2 percentage.
    pub oxygen_saturation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Weather {
    pub temp_c: i32,
    pub condition: String,
    pub humidity: u32,
    pub air_quality_index: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreathingExercise {
    pub id: u32,
    pub name: &'static str,
    pub duration_secs: u32,
    pub description: &'static str,
    pub steps: &'static [&'static str],
    pub benefits: &'static [&'static str],
}
