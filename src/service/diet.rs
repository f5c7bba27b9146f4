use crate::models::dashboard::RiskLevel;
use crate::models::diet::{DietPlan, Meal};

/// Maps a risk level onto one of the three bundled diet plans. The plans
/// are static; only the selection depends on the latest assessment.
pub struct DietService;

impl DietService {
    pub fn new() -> Self {
        Self
    }

    pub fn plan_for(&self, risk: RiskLevel) -> DietPlan {
        match risk {
            RiskLevel::Low => maintenance_plan(),
            RiskLevel::Moderate => respiratory_support_plan(),
            RiskLevel::High => clinical_recovery_plan(),
        }
    }
}

impl Default for DietService {
    fn default() -> Self {
        Self::new()
    }
}

fn maintenance_plan() -> DietPlan {
    DietPlan {
        name: "Maintenance Diet".to_string(),
        breakfast: Meal::new("Fruit bowl with yogurt", 350, "8:00 AM"),
        morning_snack: None,
        lunch: Meal::new("Quinoa salad with veggies", 450, "1:00 PM"),
        evening_snack: None,
        dinner: Meal::new("Grilled fish with vegetables", 400, "7:00 PM"),
        total_calories: 1200,
        water_target_glasses: 8,
    }
}

fn respiratory_support_plan() -> DietPlan {
    DietPlan {
        name: "Respiratory Support Diet".to_string(),
        breakfast: Meal::new("Oatmeal with berries", 380, "8:00 AM"),
        morning_snack: Some(Meal::new("Green smoothie", 150, "11:00 AM")),
        lunch: Meal::new("Grilled chicken with quinoa", 520, "1:30 PM"),
        evening_snack: Some(Meal::new("Fruit and nuts", 200, "4:30 PM")),
        dinner: Meal::new("Salmon with vegetables", 450, "7:30 PM"),
        total_calories: 1700,
        water_target_glasses: 8,
    }
}

fn clinical_recovery_plan() -> DietPlan {
    DietPlan {
        name: "Clinical Recovery Diet".to_string(),
        breakfast: Meal::new("Protein smoothie", 380, "8:00 AM"),
        morning_snack: Some(Meal::new("Greek yogurt", 200, "11:00 AM")),
        lunch: Meal::new("Therapeutic chicken soup", 550, "1:30 PM"),
        evening_snack: Some(Meal::new("Protein shake", 250, "4:30 PM")),
        dinner: Meal::new("Poached fish with mash", 480, "7:00 PM"),
        total_calories: 1860,
        water_target_glasses: 10,
    }
}
