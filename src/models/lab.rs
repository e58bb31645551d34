use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{LabCategory, LabTestStatus};

/// A lab panel: one visit to a facility with one or more test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabWork {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub category: LabCategory,
    pub lab_name: String,
    pub ordering_physician: Option<String>,
    pub tests: Vec<LabTest>,
    pub overall_notes: Option<String>,
    pub report_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: Uuid,
    pub name: String,
    /// Free text: lab values are not always numeric ("positive", "<0.5").
    pub value: String,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: Option<LabTestStatus>,
    pub notes: Option<String>,
}

impl LabWork {
    /// Tests flagged anything other than normal.
    pub fn out_of_range_tests(&self) -> impl Iterator<Item = &LabTest> {
        self.tests
            .iter()
            .filter(|t| t.status.is_some_and(|s| s.is_out_of_range()))
    }
}
