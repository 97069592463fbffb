use super::intake::{ChannelsUsed, Intake};
use serde::Serialize;

/// Tags the CRM uses to route new lead-plan requests.
pub const WEBHOOK_TAGS: [&str; 2] = ["LeadPlan-Requested", "LocalLeadFinder"];

/// Lead record forwarded to the CRM once a plan has been generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub budget: String,
    pub timeline: String,
    pub channels_used: ChannelsUsed,
    pub primary_goal: String,
    pub plan_text: String,
    pub tags: [&'static str; 2],
}

impl WebhookPayload {
    pub fn new(intake: &Intake, plan_text: &str) -> Self {
        Self {
            first_name: intake.first_name.clone(),
            last_name: intake.last_name.clone(),
            email: intake.email.clone(),
            phone: intake.phone.clone(),
            industry: intake.industry.clone(),
            city: intake.city.clone(),
            state: intake.state.clone(),
            zip: intake.zip.clone(),
            budget: intake.budget.clone(),
            timeline: intake.timeline.clone(),
            channels_used: intake.channels_used.clone(),
            primary_goal: intake.primary_goal.clone(),
            plan_text: plan_text.to_string(),
            tags: WEBHOOK_TAGS,
        }
    }
}
