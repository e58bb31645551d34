use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MedicalTestCategory;

/// Imaging or procedure report (x-ray, CT, MRI, endoscopy, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTest {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub category: MedicalTestCategory,
    pub test_name: String,
    pub facility: Option<String>,
    pub ordering_physician: Option<String>,
    pub results: String,
    pub impression: Option<String>,
    pub recommendations: Option<String>,
    pub follow_up: Option<String>,
    pub report_url: Option<String>,
}
