use serde::Deserialize;

use super::enums::{LabCategory, LabTestStatus, MedicalTestCategory, Mood};

/// Health log listing filter. All criteria are ANDed.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Case-insensitive match over symptoms, medications and notes.
    pub search: Option<String>,
    pub severity_min: Option<u8>,
    pub severity_max: Option<u8>,
    pub mood: Option<Mood>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabWorkFilter {
    pub search: Option<String>,
    pub category: Option<LabCategory>,
    /// Keep panels with at least one test in this status.
    pub status: Option<LabTestStatus>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTestFilter {
    pub search: Option<String>,
    pub category: Option<MedicalTestCategory>,
}
