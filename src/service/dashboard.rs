use crate::database::activity::ActivityLog;
use crate::models::activity::Activity;
use crate::models::dashboard::{BreathingExercise, HealthAssessment, Prediction, RiskLevel, SmokingStatus, Weather};
use chrono::Utc;
use rand::prelude::IndexedRandom;
use rand::RngExt;
use tracing::info;

pub const HEALTH_TIPS: &[&str] = &[
    "Stay hydrated! Proper hydration helps thin mucus and makes breathing easier. Aim for 8-10 glasses of water daily.",
    "Practice pursed-lip breathing when you feel short of breath. Inhale through nose, exhale slowly through pursed lips.",
    "Avoid smoking and secondhand smoke. It's the most important step to prevent COPD progression.",
    "Eat small, frequent meals rather than large meals to prevent bloating and make breathing easier.",
    "Get your annual flu shot and pneumonia vaccine to prevent respiratory infections.",
    "Exercise regularly but listen to your body. Start slow and gradually increase intensity.",
    "Keep your home clean and dust-free. Use air purifiers if needed.",
    "Monitor your oxygen levels if prescribed. Contact doctor if levels drop below 92%.",
    "Join a pulmonary rehabilitation program for supervised exercise and education.",
    "Take medications exactly as prescribed. Don't skip doses even if you feel well.",
    "Use a humidifier in dry environments to keep airways moist.",
    "Practice deep breathing exercises daily to strengthen your lungs.",
    "Avoid extreme temperatures and air pollution when possible.",
    "Keep emergency numbers handy and inform family members about your condition.",
    "Track your symptoms daily to identify triggers and patterns.",
];

const BREATHING_EXERCISES: &[BreathingExercise] = &[
    BreathingExercise {
        id: 1,
        name: "Pursed Lip Breathing",
        duration_secs: 300,
        description: "This exercise helps slow your breathing pace and keeps airways open longer.",
        steps: &[
            "Relax your neck and shoulder muscles",
            "Breathe in slowly through your nose for 2 counts",
            "Purse your lips as if whistling",
            "Breathe out slowly through pursed lips for 4 counts",
            "Repeat for 5-10 minutes",
        ],
        benefits: &["Slows breathing pace", "Keeps airways open longer", "Reduces shortness of breath"],
    },
    BreathingExercise {
        id: 2,
        name: "Diaphragmatic Breathing",
        duration_secs: 300,
        description: "This exercise strengthens your diaphragm and decreases breathing effort.",
        steps: &[
            "Lie on your back with knees bent",
            "Place one hand on your chest, one on your belly",
            "Breathe in slowly through your nose, feeling belly rise",
            "Tighten stomach muscles as you exhale",
            "Practice for 5-10 minutes, 3-4 times daily",
        ],
        benefits: &["Strengthens diaphragm", "Decreases breathing effort", "Improves oxygen flow"],
    },
    BreathingExercise {
        id: 3,
        name: "Deep Breathing",
        duration_secs: 300,
        description: "Simple deep breathing to increase oxygen flow and reduce stress.",
        steps: &[
            "Sit comfortably with straight back",
            "Breathe in deeply through your nose for 4 seconds",
            "Hold breath for 2 seconds",
            "Exhale slowly through your mouth for 6 seconds",
            "Repeat 10 times",
        ],
        benefits: &["Increases oxygen levels", "Reduces stress", "Calms nervous system"],
    },
    BreathingExercise {
        id: 4,
        name: "Coordinated Breathing",
        duration_secs: 300,
        description: "Coordinate breathing with activities that require effort.",
        steps: &[
            "Breathe in before starting an activity",
            "Breathe out during the hardest part of activity",
            "Practice during walking or climbing stairs",
            "Use pursed lips when exhaling",
        ],
        benefits: &["Prevents breathlessness during activities", "Improves exercise tolerance"],
    },
];

/// Risk assessment, health tips, breathing exercises and the widgets
/// backing the signed-in dashboard.
pub struct DashboardService {
    activity: ActivityLog,
}

impl DashboardService {
    pub fn new(activity: ActivityLog) -> Self {
        Self { activity }
    }

    /// Scores the self-reported inputs, records the prediction in the
    /// user's history and returns it.
    pub async fn assess(&self, email: &str, assessment: &HealthAssessment) -> Prediction {
        let risk_score = risk_score(assessment);
        let risk_level = RiskLevel::from_score(risk_score);

        let prediction = Prediction {
            risk_score,
            risk_level,
            recommendations: recommendations(risk_level),
            timestamp: Utc::now(),
        };

        self.activity.record_prediction(email, prediction.clone());
        self.activity.record_activity(email, "Completed health assessment");
        info!(risk_score, level = risk_level.label(), "health assessment scored");

        prediction
    }

    pub fn prediction_history(&self, email: &str) -> Vec<Prediction> {
        self.activity.predictions(email)
    }

    pub fn recent_activities(&self, email: &str) -> Vec<Activity> {
        self.activity.recent_activities(email)
    }

    pub fn breathing_exercises(&self) -> &'static [BreathingExercise] {
        BREATHING_EXERCISES
    }

    pub fn breathing_exercise(&self, id: u32) -> Option<&'static BreathingExercise> {
        BREATHING_EXERCISES.iter().find(|e| e.id == id)
    }

    pub fn random_tip(&self) -> &'static str {
        HEALTH_TIPS.choose(&mut rand::rng()).copied().unwrap_or(HEALTH_TIPS[0])
    }

    /// Placeholder weather for the dashboard widget; conditions are
    /// sampled, not fetched.
    pub fn weather(&self) -> Weather {
        let mut rng = rand::rng();
        let condition = *["Sunny", "Partly Cloudy", "Cloudy", "Hazy"].choose(&mut rng).unwrap_or(&"Sunny");
        Weather {
            temp_c: rng.random_range(20..=38),
            condition: condition.to_string(),
            humidity: rng.random_range(30..=70),
            air_quality_index: rng.random_range(50..=180),
        }
    }
}

/// Additive risk score from age band, smoking status, symptom count and
/// oxygen saturation, clamped to 100.
fn risk_score(assessment: &HealthAssessment) -> u32 {
    let mut score = 0u32;

    if assessment.age > 60 {
        score += 25;
    } else if assessment.age > 50 {
        score += 20;
    } else if assessment.age > 40 {
        score += 15;
    }

    match assessment.smoking_status {
        SmokingStatus::Current => score += 30,
        SmokingStatus::Former => score += 15,
        SmokingStatus::Never => {}
    }

    score += assessment.symptoms.len() as u32 * 5;

    if assessment.oxygen_saturation < 90 {
        score += 25;
    } else if assessment.oxygen_saturation < 95 {
        score += 15;
    }

    score.min(100)
}

fn recommendations(risk: RiskLevel) -> Vec<String> {
    let lines: &[&str] = match risk {
        RiskLevel::Low => &[
            "Maintain a healthy lifestyle with regular exercise",
            "Eat a balanced diet rich in antioxidants",
            "Avoid smoking and secondhand smoke",
            "Get annual check-ups",
            "Practice breathing exercises daily",
        ],
        RiskLevel::Moderate => &[
            "Consult a pulmonologist for a check-up",
            "Follow an anti-inflammatory diet plan",
            "Monitor your symptoms daily",
            "Avoid exposure to pollutants",
            "Take prescribed medications regularly",
            "Practice pursed-lip breathing",
        ],
        RiskLevel::High => &[
            "IMMEDIATE CONSULTATION WITH PULMONOLOGIST REQUIRED",
            "Follow prescribed treatment plan strictly",
            "Use oxygen therapy if prescribed",
            "Avoid all respiratory irritants",
            "Keep emergency contact handy",
            "Monitor oxygen levels regularly",
            "Consider pulmonary rehabilitation",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn service() -> DashboardService {
        DashboardService::new(ActivityLog::new(Arc::new(MemoryStore::new())))
    }

    fn assessment(age: u32, smoking: SmokingStatus, symptoms: usize, oxygen: u32) -> HealthAssessment {
        HealthAssessment {
            age,
            smoking_status: smoking,
            symptoms: (0..symptoms).map(|n| format!("symptom {n}")).collect(),
            oxygen_saturation: oxygen,
        }
    }

    #[test]
    fn healthy_adult_scores_low() {
        let score = risk_score(&assessment(35, SmokingStatus::Never, 0, 98));
        assert_eq!(score, 0);
        assert_eq!(RiskLevel::from_score(score), RiskLevel::Low);
    }

    #[test]
    fn age_bands_are_exclusive() {
        assert_eq!(risk_score(&assessment(41, SmokingStatus::Never, 0, 98)), 15);
        assert_eq!(risk_score(&assessment(51, SmokingStatus::Never, 0, 98)), 20);
        assert_eq!(risk_score(&assessment(61, SmokingStatus::Never, 0, 98)), 25);
    }

    #[test]
    fn elderly_current_smoker_with_low_oxygen_is_high_risk() {
        // 25 + 30 + 20 + 25 = 100
        let score = risk_score(&assessment(65, SmokingStatus::Current, 4, 88));
        assert_eq!(score, 100);
        assert_eq!(RiskLevel::from_score(score), RiskLevel::High);
    }

    #[test]
    fn score_is_capped_at_100() {
        let score = risk_score(&assessment(70, SmokingStatus::Current, 12, 85));
        assert_eq!(score, 100);
    }

    #[test]
    fn oxygen_bands() {
        assert_eq!(risk_score(&assessment(30, SmokingStatus::Never, 0, 94)), 15);
        assert_eq!(risk_score(&assessment(30, SmokingStatus::Never, 0, 89)), 25);
        assert_eq!(risk_score(&assessment(30, SmokingStatus::Never, 0, 95)), 0);
    }

    #[tokio::test]
    async fn assess_records_history_newest_first() {
        let dashboard = service();
        dashboard.assess("bharat@example.com", &assessment(35, SmokingStatus::Never, 0, 98)).await;
        dashboard.assess("bharat@example.com", &assessment(65, SmokingStatus::Current, 4, 88)).await;

        let history = dashboard.prediction_history("bharat@example.com");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].risk_level, RiskLevel::High);
        assert_eq!(history[1].risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn high_risk_leads_with_urgent_consultation() {
        let dashboard = service();
        let prediction = dashboard.assess("bharat@example.com", &assessment(65, SmokingStatus::Current, 4, 88)).await;
        assert!(prediction.recommendations[0].contains("IMMEDIATE CONSULTATION"));
    }

    #[test]
    fn four_breathing_exercises_with_steps() {
        let dashboard = service();
        assert_eq!(dashboard.breathing_exercises().len(), 4);
        let exercise = dashboard.breathing_exercise(1).unwrap();
        assert_eq!(exercise.name, "Pursed Lip Breathing");
        assert!(!exercise.steps.is_empty());
        assert!(dashboard.breathing_exercise(9).is_none());
    }

    #[test]
    fn weather_stays_in_plausible_ranges() {
        let dashboard = service();
        for _ in 0..20 {
            let weather = dashboard.weather();
            assert!((20..=38).contains(&weather.temp_c));
            assert!((30..=70).contains(&weather.humidity));
        }
    }
}
