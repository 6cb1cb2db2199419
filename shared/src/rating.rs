use serde::{Deserialize, Serialize};

pub const UNRATED: &str = "Unrated";
pub const NOT_AVAILABLE: &str = "N/A";

/// A numeric rating, or a label when the platform has none to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Value(i64),
    Label(String),
}

impl Rating {
    pub fn or_label(value: Option<i64>, label: &str) -> Self {
        match value {
            Some(value) => Rating::Value(value),
            None => Rating::Label(label.to_string()),
        }
    }

    /// Platforms without a rating for a user consider them unrated, which is
    /// a state of its own rather than missing data.
    pub fn or_unrated(value: Option<i64>) -> Self {
        Self::or_label(value, UNRATED)
    }
}
