use crate::config::SupportConfig;
use crate::models::dashboard::Prediction;
use crate::models::diet::DietPlan;
use crate::models::doctor::Appointment;

/// Builds `wa.me` deep links for sharing dashboard content over
/// WhatsApp. Only links are produced; nothing is sent from here.
pub struct ShareService {
    config: SupportConfig,
}

impl ShareService {
    pub fn new(config: SupportConfig) -> Self {
        Self { config }
    }

    /// Deep link to the configured support number with a prefilled,
    /// percent-encoded message.
    pub fn whatsapp_link(&self, message: &str) -> String {
        let number: String = self.config.whatsapp_number.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("https://wa.me/{number}?text={}", urlencoding::encode(message))
    }

    pub fn diet_plan_message(&self, plan: &DietPlan) -> String {
        format!(
            "*My COPD Diet Plan*\n\n\
             *Breakfast:* {}\n\
             *Lunch:* {}\n\
             *Dinner:* {}\n\
             *Calories:* {} kcal\n\n\
             Sent from COPD Care AI",
            plan.breakfast.name, plan.lunch.name, plan.dinner.name, plan.total_calories
        )
    }

    pub fn health_report_message(&self, prediction: &Prediction) -> String {
        let recommendations: Vec<String> = prediction.recommendations.iter().map(|r| format!("\u{2022} {r}")).collect();
        format!(
            "*My COPD Health Report*\n\n\
             *Risk Level:* {} ({}%)\n\
             *Date:* {}\n\
             *Recommendations:*\n{}\n\n\
             Sent from COPD Care AI",
            prediction.risk_level.label(),
            prediction.risk_score,
            prediction.timestamp.format("%B %-d, %Y"),
            recommendations.join("\n")
        )
    }

    pub fn appointment_message(&self, appointment: &Appointment) -> String {
        format!(
            "I have an appointment on {} at {} with {}. Booking ID: {}",
            appointment.date.format("%Y-%m-%d"),
            appointment.time,
            appointment.doctor_name,
            appointment.id
        )
    }
}
