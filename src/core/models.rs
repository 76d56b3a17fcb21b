use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNKNOWN: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub image: String,
    pub href: String,
}

impl SearchResult {
    /// Placeholder some hosts expect in place of an empty list on failure.
    pub fn error_entry() -> Self {
        Self {
            title: "Error".to_string(),
            image: String::new(),
            href: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub description: String,
    /// Rendered as `Duration: <value>`.
    pub aliases: String,
    /// Rendered as `Aired: <value>`.
    pub airdate: String,
}

impl DetailRecord {
    pub fn new(description: Option<String>, duration: Option<String>, aired: Option<String>) -> Self {
        Self {
            description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            aliases: format!("Duration: {}", duration.as_deref().unwrap_or(UNKNOWN)),
            airdate: format!("Aired: {}", aired.as_deref().unwrap_or(UNKNOWN)),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(None, None, None)
    }
}

/// Episode numbers arrive either as JSON numbers or as strings and are
/// handed back to the host in the same form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodeNumber {
    Number(serde_json::Number),
    Text(String),
}

impl EpisodeNumber {
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(EpisodeNumber::Number(n.clone())),
            serde_json::Value::String(s) if !s.is_empty() => Some(EpisodeNumber::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeNumber::Number(n) => write!(f, "{}", n),
            EpisodeNumber::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub href: String,
    pub number: EpisodeNumber,
}

/// URL of a playable HLS manifest, or nothing.
pub type StreamTarget = Option<String>;
