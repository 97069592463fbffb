//! The intake form a business owner submits.
//!
//! Nothing here is validated. Every field is optional, and a field of the
//! wrong JSON type degrades to empty instead of failing the request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intake {
    #[serde(deserialize_with = "lenient_text")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_text")]
    pub industry: String,
    #[serde(deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(deserialize_with = "lenient_text")]
    pub state: String,
    #[serde(deserialize_with = "lenient_text")]
    pub zip: String,
    #[serde(deserialize_with = "lenient_text")]
    pub budget: String,
    #[serde(deserialize_with = "lenient_text")]
    pub timeline: String,
    #[serde(deserialize_with = "lenient_channels")]
    pub channels_used: ChannelsUsed,
    #[serde(deserialize_with = "lenient_text")]
    pub primary_goal: String,
}

impl Intake {
    /// Parse a request body. Empty, invalid or non-object JSON yields the
    /// all-empty intake.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }

        // Structs also deserialize from arrays, so only objects are accepted.
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            Ok(_) => {
                tracing::debug!("Intake body is not a JSON object, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Intake body is not valid JSON, using defaults");
                Self::default()
            }
        }
    }
}

/// Marketing channels already in use, in the shape the caller sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChannelsUsed {
    List(Vec<String>),
    Text(String),
}

impl Default for ChannelsUsed {
    fn default() -> Self {
        ChannelsUsed::List(Vec::new())
    }
}

impl fmt::Display for ChannelsUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelsUsed::List(channels) => f.write_str(&channels.join(", ")),
            ChannelsUsed::Text(raw) => f.write_str(raw),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

fn lenient_channels<'de, D>(deserializer: D) -> Result<ChannelsUsed, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => ChannelsUsed::List(items.iter().filter_map(scalar_text).collect()),
        other => scalar_text(&other)
            .map(ChannelsUsed::Text)
            .unwrap_or_default(),
    })
}
