//! HTTP handlers for the lead-plan service.

pub mod health;
pub mod lead_plan;
