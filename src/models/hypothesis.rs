use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pattern report produced by the remote model or the local fallback.
/// Field names follow the JSON schema the model is asked to answer in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisAnalysis {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub potential_causes: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_insights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_correlations: Option<Vec<String>>,
}

/// A hypothesis the user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: Uuid,
    pub hypothesis: String,
    pub confidence: f64,
    pub data_points_count: u32,
    pub hypothesis_type: String,
    pub evidence: Option<String>,
    pub created_at: DateTime<Utc>,
}
