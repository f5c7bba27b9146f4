use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub calories: u32,
    /// Suggested time, e.g. "8:00 AM".
    pub time: String,
}

impl Meal {
    pub fn new(name: &str, calories: u32, time: &str) -> Self {
        Self {
            name: name.to_string(),
            calories,
            time: time.to_string(),
        }
    }
}

/// A day's plan, tiered by COPD risk level. Snacks only appear on the
/// moderate and high tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    pub name: String,
    pub breakfast: Meal,
    pub morning_snack: Option<Meal>,
    pub lunch: Meal,
    pub evening_snack: Option<Meal>,
    pub dinner: Meal,
    pub total_calories: u32,
    pub water_target_glasses: u32,
}

impl DietPlan {
    pub fn has_snacks(&self) -> bool {
        self.morning_snack.is_some() || self.evening_snack.is_some()
    }
}
