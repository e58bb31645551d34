//! Lab work panels and medical test / imaging reports.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::journal::JournalError;
use crate::models::enums::{LabCategory, LabTestStatus, MedicalTestCategory};
use crate::models::{LabTest, LabWork, LabWorkFilter, MedicalTest, MedicalTestFilter, Owner};
use crate::validation::{clean_optional, require_text, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTestInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: Option<LabTestStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabWorkInput {
    pub date: Option<DateTime<Utc>>,
    #[serde(default = "default_lab_category")]
    pub category: LabCategory,
    #[serde(default)]
    pub lab_name: String,
    pub ordering_physician: Option<String>,
    #[serde(default)]
    pub tests: Vec<LabTestInput>,
    pub overall_notes: Option<String>,
    pub report_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTestInput {
    pub date: Option<DateTime<Utc>>,
    #[serde(default = "default_test_category")]
    pub category: MedicalTestCategory,
    #[serde(default)]
    pub test_name: String,
    pub facility: Option<String>,
    pub ordering_physician: Option<String>,
    #[serde(default)]
    pub results: String,
    pub impression: Option<String>,
    pub recommendations: Option<String>,
    pub follow_up: Option<String>,
    pub report_url: Option<String>,
}

fn default_lab_category() -> LabCategory {
    LabCategory::Blood
}

fn default_test_category() -> MedicalTestCategory {
    MedicalTestCategory::Other
}

impl LabTestInput {
    fn into_test(self, position: usize) -> Result<LabTest, ValidationError> {
        let name = require_text("test name", &self.name).map_err(|_| ValidationError::Invalid {
            field: "tests",
            reason: format!("test #{} needs a name", position + 1),
        })?;
        let value = require_text("test value", &self.value).map_err(|_| ValidationError::Invalid {
            field: "tests",
            reason: format!("test #{} ({name}) needs a value", position + 1),
        })?;
        Ok(LabTest {
            id: Uuid::new_v4(),
            name,
            value,
            unit: clean_optional(self.unit.as_deref()),
            reference_range: clean_optional(self.reference_range.as_deref()),
            status: self.status,
            notes: clean_optional(self.notes.as_deref()),
        })
    }
}

impl LabWorkInput {
    pub fn into_lab_work(self, id: Uuid) -> Result<LabWork, ValidationError> {
        let lab_name = require_text("lab name", &self.lab_name)?;
        if self.tests.is_empty() {
            return Err(ValidationError::Required("at least one test result"));
        }
        let tests = self
            .tests
            .into_iter()
            .enumerate()
            .map(|(i, t)| t.into_test(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LabWork {
            id,
            date: self.date.unwrap_or_else(Utc::now),
            category: self.category,
            lab_name,
            ordering_physician: clean_optional(self.ordering_physician.as_deref()),
            tests,
            overall_notes: clean_optional(self.overall_notes.as_deref()),
            report_url: clean_optional(self.report_url.as_deref()),
        })
    }
}

impl MedicalTestInput {
    pub fn into_medical_test(self, id: Uuid) -> Result<MedicalTest, ValidationError> {
        Ok(MedicalTest {
            id,
            date: self.date.unwrap_or_else(Utc::now),
            category: self.category,
            test_name: require_text("test name", &self.test_name)?,
            facility: clean_optional(self.facility.as_deref()),
            ordering_physician: clean_optional(self.ordering_physician.as_deref()),
            results: require_text("results", &self.results)?,
            impression: clean_optional(self.impression.as_deref()),
            recommendations: clean_optional(self.recommendations.as_deref()),
            follow_up: clean_optional(self.follow_up.as_deref()),
            report_url: clean_optional(self.report_url.as_deref()),
        })
    }
}

// ═══════════════════════════════════════════
// Lab work
// ═══════════════════════════════════════════

pub fn record_lab_work(
    conn: &Connection,
    owner: Owner,
    input: LabWorkInput,
) -> Result<LabWork, JournalError> {
    let lab = input.into_lab_work(Uuid::new_v4())?;
    db::insert_lab_work(conn, owner, &lab)?;
    tracing::info!(
        lab_id = %lab.id,
        tests = lab.tests.len(),
        flagged = lab.out_of_range_tests().count(),
        "Lab work recorded"
    );
    Ok(lab)
}

pub fn get_lab_work(conn: &Connection, owner: Owner, id: Uuid) -> Result<LabWork, JournalError> {
    db::get_lab_work(conn, owner, &id)?
        .ok_or_else(|| DatabaseError::not_found("LabWork", id).into())
}

pub fn list_lab_work(
    conn: &Connection,
    owner: Owner,
    filter: &LabWorkFilter,
) -> Result<Vec<LabWork>, JournalError> {
    Ok(db::list_lab_work(conn, owner, filter)?)
}

pub fn delete_lab_work(conn: &Connection, owner: Owner, id: Uuid) -> Result<(), JournalError> {
    db::delete_lab_work(conn, owner, &id)?;
    tracing::info!(lab_id = %id, "Lab work deleted");
    Ok(())
}

// ═══════════════════════════════════════════
// Medical tests
// ═══════════════════════════════════════════

pub fn record_medical_test(
    conn: &Connection,
    owner: Owner,
    input: MedicalTestInput,
) -> Result<MedicalTest, JournalError> {
    let test = input.into_medical_test(Uuid::new_v4())?;
    db::insert_medical_test(conn, owner, &test)?;
    tracing::info!(test_id = %test.id, category = %test.category, "Medical test recorded");
    Ok(test)
}

pub fn get_medical_test(
    conn: &Connection,
    owner: Owner,
    id: Uuid,
) -> Result<MedicalTest, JournalError> {
    db::get_medical_test(conn, owner, &id)?
        .ok_or_else(|| DatabaseError::not_found("MedicalTest", id).into())
}

pub fn list_medical_tests(
    conn: &Connection,
    owner: Owner,
    filter: &MedicalTestFilter,
) -> Result<Vec<MedicalTest>, JournalError> {
    Ok(db::list_medical_tests(conn, owner, filter)?)
}

pub fn delete_medical_test(conn: &Connection, owner: Owner, id: Uuid) -> Result<(), JournalError> {
    db::delete_medical_test(conn, owner, &id)?;
    tracing::info!(test_id = %id, "Medical test deleted");
    Ok(())
}
