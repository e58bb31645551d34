//! Health journal: daily symptom / medication / mood / sleep logs.
//!
//! Input validation and the owner-scoped operations behind the logs
//! endpoints, plus the dashboard statistics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::Mood;
use crate::models::{HealthLog, LogFilter, Owner};
use crate::validation::{clean_labels, ValidationError};

pub const DEFAULT_SEVERITY: u8 = 3;
pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;
pub const SEVERITY_MIN: u8 = 1;
pub const SEVERITY_MAX: u8 = 10;
pub const SLEEP_MAX_HOURS: f64 = 24.0;

/// Errors shared by the journal-style record modules (logs, labs, hypotheses).
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════
// Input / view types
// ═══════════════════════════════════════════

/// Log as submitted by a client. Omitted fields take the form defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLogInput {
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    pub severity: Option<u8>,
    pub mood: Option<Mood>,
    pub sleep: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

/// Dashboard summary over the caller's logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total_logs: usize,
    pub average_severity: Option<f64>,
    pub average_sleep: Option<f64>,
    pub distinct_symptoms: usize,
    pub distinct_medications: usize,
}

impl HealthLogInput {
    /// Validate and normalise into a storable log with the given id.
    pub fn into_log(self, id: Uuid) -> Result<HealthLog, ValidationError> {
        let symptoms = clean_labels(&self.symptoms);
        if symptoms.is_empty() {
            return Err(ValidationError::Required("at least one symptom"));
        }

        let severity = self.severity.unwrap_or(DEFAULT_SEVERITY);
        if !(SEVERITY_MIN..=SEVERITY_MAX).contains(&severity) {
            return Err(ValidationError::OutOfRange {
                field: "severity",
                min: SEVERITY_MIN.to_string(),
                max: SEVERITY_MAX.to_string(),
            });
        }

        let sleep = self.sleep.unwrap_or(DEFAULT_SLEEP_HOURS);
        if !sleep.is_finite() || !(0.0..=SLEEP_MAX_HOURS).contains(&sleep) {
            return Err(ValidationError::OutOfRange {
                field: "sleep",
                min: "0".into(),
                max: SLEEP_MAX_HOURS.to_string(),
            });
        }

        Ok(HealthLog {
            id,
            date: self.date.unwrap_or_else(Utc::now),
            symptoms,
            medications: clean_labels(&self.medications),
            severity,
            mood: self.mood.unwrap_or(Mood::Neutral),
            sleep,
            notes: self.notes.trim().to_string(),
        })
    }
}

// ═══════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════

pub fn record_log(
    conn: &Connection,
    owner: Owner,
    input: HealthLogInput,
) -> Result<HealthLog, JournalError> {
    let log = input.into_log(Uuid::new_v4())?;
    db::insert_health_log(conn, owner, &log)?;
    tracing::info!(log_id = %log.id, symptoms = log.symptoms.len(), "Health log recorded");
    Ok(log)
}

/// Full replacement of an existing log.
pub fn update_log(
    conn: &Connection,
    owner: Owner,
    id: Uuid,
    input: HealthLogInput,
) -> Result<HealthLog, JournalError> {
    let log = input.into_log(id)?;
    db::update_health_log(conn, owner, &log)?;
    tracing::info!(log_id = %id, "Health log updated");
    Ok(log)
}

pub fn delete_log(conn: &Connection, owner: Owner, id: Uuid) -> Result<(), JournalError> {
    db::delete_health_log(conn, owner, &id)?;
    tracing::info!(log_id = %id, "Health log deleted");
    Ok(())
}

pub fn get_log(conn: &Connection, owner: Owner, id: Uuid) -> Result<HealthLog, JournalError> {
    db::get_health_log(conn, owner, &id)?
        .ok_or_else(|| DatabaseError::not_found("HealthLog", id).into())
}

pub fn list_logs(
    conn: &Connection,
    owner: Owner,
    filter: &LogFilter,
) -> Result<Vec<HealthLog>, JournalError> {
    Ok(db::list_health_logs(conn, owner, filter)?)
}

pub fn log_stats(conn: &Connection, owner: Owner) -> Result<LogStats, JournalError> {
    let logs = db::list_health_logs(conn, owner, &LogFilter::default())?;
    Ok(compute_stats(&logs))
}

/// Averages are rounded to one decimal, as shown on the dashboard.
pub fn compute_stats(logs: &[HealthLog]) -> LogStats {
    let symptoms: HashSet<&str> = logs
        .iter()
        .flat_map(|l| l.symptoms.iter().map(String::as_str))
        .collect();
    let medications: HashSet<&str> = logs
        .iter()
        .flat_map(|l| l.medications.iter().map(String::as_str))
        .collect();

    let (average_severity, average_sleep) = if logs.is_empty() {
        (None, None)
    } else {
        let n = logs.len() as f64;
        let severity = logs.iter().map(|l| l.severity as f64).sum::<f64>() / n;
        let sleep = logs.iter().map(|l| l.sleep).sum::<f64>() / n;
        (Some(round1(severity)), Some(round1(sleep)))
    };

    LogStats {
        total_logs: logs.len(),
        average_severity,
        average_sleep,
        distinct_symptoms: symptoms.len(),
        distinct_medications: medications.len(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
