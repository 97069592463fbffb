//! Prompt construction for lead plans.
//!
//! The system prompt is fixed: persona, reading level, the five mandatory
//! plan sections in order, and the closing call to action. The user prompt
//! is rendered from the intake and is deterministic for a given intake.

use crate::models::Intake;

pub const SYSTEM_PROMPT: &str = "\
You are Brent Attaway, a bold, direct business mentor with a little humor.
Speak like a story-teller (light metaphors). Write at a 7th-grade level.
Your ONLY focus is ATTENTION (get more leads) and LEAD CAPTURE (convert visitors).

Every plan MUST include, in this exact order and with these headings:
1) Top 3 Moves This Week — three bullet points with concrete steps.
2) Lead Magnet Idea — one idea tailored to the user's industry and area.
3) Organic Game Plan — 3 posts/week: story, promotion, did-you-know education (give examples).
4) Paid Game Plan — prioritize: Website Chatbot + AI employee (always recommend), Google Local Services Ads, Google Business Profile, simple Referral Incentive, Meta ads. Adjust to inputs.
5) Website + Chatbot Fix — insist on chat widget + instant AI SMS/phone response to new leads.

Drop one short metaphor or story (\"This is like…\") once per plan.
End with:
\"Want this done for you? Book a CRMX demo and we’ll set it up in a couple days.
CRMX has all the tools in one place — including AI bots that act like employees for your business.\"";

/// Headings every generated plan must use, in order.
pub const PLAN_SECTIONS: [&str; 5] = [
    "Top 3 Moves This Week",
    "Lead Magnet Idea",
    "Organic Game Plan",
    "Paid Game Plan",
    "Website + Chatbot Fix",
];

/// The two messages sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: &'static str,
    pub user: String,
}

impl PromptPair {
    pub fn for_intake(intake: &Intake) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            user: render_user_prompt(intake),
        }
    }
}

pub fn render_user_prompt(intake: &Intake) -> String {
    format!(
        "Business type: {industry}\n\
         Location: {location}\n\
         Budget: {budget}\n\
         Timeline: {timeline}\n\
         Current channels: {channels}\n\
         Primary lead goal: {goal}\n\
         \n\
         Create a LOCAL lead plan limited to ATTENTION & LEAD CAPTURE.\n\
         Keep it punchy, specific, and immediately usable THIS WEEK.",
        industry = intake.industry,
        location = format_location(intake),
        budget = intake.budget,
        timeline = intake.timeline,
        channels = intake.channels_used,
        goal = intake.primary_goal,
    )
}

/// `city`, then `, state` and ` zip` only when present.
fn format_location(intake: &Intake) -> String {
    let mut location = intake.city.clone();
    if !intake.state.is_empty() {
        location.push_str(", ");
        location.push_str(&intake.state);
    }
    if !intake.zip.is_empty() {
        location.push(' ');
        location.push_str(&intake.zip);
    }
    location
}
