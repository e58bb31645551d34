use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Mood;

/// One day's symptom / medication / mood / sleep entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLog {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    pub severity: u8,
    pub mood: Mood,
    pub sleep: f64,
    pub notes: String,
}
