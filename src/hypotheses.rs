//! Hypotheses the user chose to keep from an analysis.

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::journal::JournalError;
use crate::models::{Hypothesis, Owner};
use crate::validation::{clean_optional, require_text, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisInput {
    #[serde(default)]
    pub hypothesis: String,
    pub confidence: f64,
    #[serde(default)]
    pub data_points_count: u32,
    #[serde(default = "default_type")]
    pub hypothesis_type: String,
    pub evidence: Option<String>,
}

fn default_type() -> String {
    "standard".to_string()
}

impl HypothesisInput {
    pub fn into_hypothesis(self, id: Uuid) -> Result<Hypothesis, ValidationError> {
        let hypothesis = require_text("hypothesis", &self.hypothesis)?;
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::OutOfRange {
                field: "confidence",
                min: "0".into(),
                max: "1".into(),
            });
        }
        Ok(Hypothesis {
            id,
            hypothesis,
            confidence: self.confidence,
            data_points_count: self.data_points_count,
            hypothesis_type: require_text("hypothesis type", &self.hypothesis_type)?,
            evidence: clean_optional(self.evidence.as_deref()),
            created_at: Utc::now(),
        })
    }
}

pub fn save_hypothesis(
    conn: &Connection,
    owner: Owner,
    input: HypothesisInput,
) -> Result<Hypothesis, JournalError> {
    let hypothesis = input.into_hypothesis(Uuid::new_v4())?;
    db::insert_hypothesis(conn, owner, &hypothesis)?;
    tracing::info!(hypothesis_id = %hypothesis.id, "Hypothesis saved");
    Ok(hypothesis)
}

pub fn list_hypotheses(conn: &Connection, owner: Owner) -> Result<Vec<Hypothesis>, JournalError> {
    Ok(db::list_hypotheses(conn, owner)?)
}

pub fn delete_hypothesis(conn: &Connection, owner: Owner, id: Uuid) -> Result<(), JournalError> {
    db::delete_hypothesis(conn, owner, &id)?;
    Ok(())
}
