use chrono::{SecondsFormat, Timelike};

use super::types::AnalysisType;
use crate::models::{HealthLog, LabWork, MedicalTest};

/// System prompt for every analysis call.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a helpful medical AI assistant that analyzes health patterns and generates hypotheses. Always emphasize that you are not providing medical diagnosis and that users should consult healthcare professionals.";

pub const STANDARD_DISCLAIMER: &str = "This analysis is for informational purposes only and should not replace professional medical advice. Please consult with your healthcare provider about any concerns.";

/// Prompt flavour actually sent. `focus_on_causes` promotes every type except
/// single-log analysis to the root-cause prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SingleLog,
    RootCause,
    General,
    Standard,
}

impl PromptKind {
    pub fn select(analysis_type: AnalysisType, focus_on_causes: bool) -> Self {
        match analysis_type {
            AnalysisType::SingleLogAnalysis => Self::SingleLog,
            AnalysisType::MedicalHypotheses => Self::RootCause,
            _ if focus_on_causes => Self::RootCause,
            AnalysisType::GeneralAnalysis => Self::General,
            AnalysisType::Standard => Self::Standard,
        }
    }
}

// ═══════════════════════════════════════════
// Record formatting
// ═══════════════════════════════════════════

fn time_of_day(hour: u32) -> &'static str {
    if hour < 12 {
        "morning"
    } else if hour < 17 {
        "afternoon"
    } else {
        "evening"
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn format_log(log: &HealthLog) -> String {
    format!(
        "Date: {} ({}, {})\nSymptoms: {}\nMedications: {}\nSeverity: {}/10\nMood: {}\nSleep: {} hours\nNotes: {}\n---",
        log.date.to_rfc3339_opts(SecondsFormat::Secs, true),
        log.date.format("%A"),
        time_of_day(log.date.hour()),
        join_or_none(&log.symptoms),
        join_or_none(&log.medications),
        log.severity,
        log.mood,
        log.sleep,
        log.notes,
    )
}

fn format_lab_work(out: &mut String, labs: &[LabWork]) {
    out.push_str("\n\nLAB WORK DATA:\n");
    for (i, lab) in labs.iter().enumerate() {
        out.push_str(&format!("\nLab Entry {}:\n", i + 1));
        out.push_str(&format!("Date: {}\n", lab.date.format("%Y-%m-%d")));
        out.push_str(&format!("Lab/Facility: {}\n", lab.lab_name));
        out.push_str(&format!("Test Type: {}\n", lab.category));
        if let Some(ref physician) = lab.ordering_physician {
            out.push_str(&format!("Ordering Physician: {physician}\n"));
        }
        if !lab.tests.is_empty() {
            out.push_str("Test Results:\n");
            for test in &lab.tests {
                out.push_str(&format!("  - {}: {}", test.name, test.value));
                if let Some(ref unit) = test.unit {
                    out.push_str(&format!(" {unit}"));
                }
                if let Some(ref range) = test.reference_range {
                    out.push_str(&format!(" (Reference: {range})"));
                }
                if let Some(status) = test.status {
                    out.push_str(&format!(" [Status: {status}]"));
                }
                if let Some(ref notes) = test.notes {
                    out.push_str(&format!(" - Notes: {notes}"));
                }
                out.push('\n');
            }
        }
        if let Some(ref notes) = lab.overall_notes {
            out.push_str(&format!("Overall Notes: {notes}\n"));
        }
    }
}

fn format_medical_tests(out: &mut String, tests: &[MedicalTest]) {
    out.push_str("\n\nMEDICAL TESTS/IMAGING DATA:\n");
    for (i, test) in tests.iter().enumerate() {
        out.push_str(&format!("\nMedical Test {}:\n", i + 1));
        out.push_str(&format!("Date: {}\n", test.date.format("%Y-%m-%d")));
        out.push_str(&format!("Test Type: {}\n", test.category));
        out.push_str(&format!("Test Name: {}\n", test.test_name));
        if let Some(ref facility) = test.facility {
            out.push_str(&format!("Facility: {facility}\n"));
        }
        if let Some(ref physician) = test.ordering_physician {
            out.push_str(&format!("Ordering Physician: {physician}\n"));
        }
        out.push_str(&format!("Results: {}\n", test.results));
        if let Some(ref impression) = test.impression {
            out.push_str(&format!("Impression: {impression}\n"));
        }
        if let Some(ref recommendations) = test.recommendations {
            out.push_str(&format!("Recommendations: {recommendations}\n"));
        }
        if let Some(ref follow_up) = test.follow_up {
            out.push_str(&format!("Follow-up: {follow_up}\n"));
        }
    }
}

/// Plain-text rendering of every record, logs first.
pub fn format_records(logs: &[HealthLog], labs: &[LabWork], tests: &[MedicalTest]) -> String {
    let mut out = logs.iter().map(format_log).collect::<Vec<_>>().join("\n");
    if !labs.is_empty() {
        format_lab_work(&mut out, labs);
    }
    if !tests.is_empty() {
        format_medical_tests(&mut out, tests);
    }
    out
}

// ═══════════════════════════════════════════
// Prompt templates
// ═══════════════════════════════════════════

const SINGLE_LOG_HEAD: &str = r#"You are a medical AI assistant analyzing a SINGLE health log entry to provide immediate insights and preliminary observations.

CRITICAL: You are analyzing just ONE log entry, so your insights will be limited. This is for immediate feedback, not comprehensive analysis.

IMPORTANT: You are NOT providing medical diagnosis or treatment. You are providing preliminary observations that should be discussed with healthcare professionals.

Analyze the following SINGLE health log and provide preliminary insights in this exact JSON format:

{
  "patterns": ["immediate observation 1", "single log pattern 2", "preliminary insight 3"],
  "potentialCauses": ["possible factor 1", "potential trigger 2", "preliminary cause 3"],
  "recommendations": ["immediate action 1", "preliminary recommendation 2", "next step 3"],
  "riskFactors": ["preliminary risk 1", "concern to monitor 2"],
  "nextSteps": ["immediate next step 1", "monitoring action 2", "preparation step 3"],
  "disclaimer": "SINGLE LOG ANALYSIS: This analysis is based on just one health log entry. For more accurate insights, consider logging 7+ entries over time. This analysis is for informational purposes only and should not replace professional medical advice."
}

Single Health Log Data:
"#;

const SINGLE_LOG_TAIL: &str = r#"
Provide preliminary insights focusing on:
- Immediate observations from this single log entry
- Potential factors that could be contributing to the symptoms
- Preliminary recommendations based on the available data
- Any concerning patterns that warrant attention
- Immediate next steps for the user
- What additional data would be helpful to collect

Provide immediate, preliminary insights while stressing the limits of a single entry. Encourage continued logging. If anything looks concerning, stress the need for professional evaluation."#;

const ROOT_CAUSE_HEAD: &str = r#"You are a medical AI assistant analyzing health data to identify the ROOT CAUSE of symptoms.

CRITICAL: You are NOT diagnosing or providing medical treatment. You are generating educated hypotheses about the UNDERLYING CAUSES that require professional medical evaluation.

Analyze the following health logs and provide root cause hypotheses in this exact JSON format:

{
  "patterns": ["key symptom pattern 1", "key symptom pattern 2", "key symptom pattern 3"],
  "potentialCauses": ["Specific medical condition that could be the root cause (requires doctor evaluation)", "Another potential root cause (needs medical testing)", "Additional root cause possibility (discuss with physician)"],
  "recommendations": ["CRITICAL: These hypotheses require immediate medical evaluation", "Request comprehensive diagnostic workup from your doctor", "Consider specific medical tests to confirm or rule out these causes"],
  "riskFactors": ["Medical risk factor that supports this hypothesis", "Additional risk factor that increases likelihood"],
  "nextSteps": ["URGENT: Schedule appointment with healthcare provider", "Prepare detailed symptom timeline for doctor", "Request specific diagnostic tests based on these hypotheses", "Bring all lab work and test results to appointment"],
  "disclaimer": "MEDICAL DISCLAIMER: These are educated hypotheses about potential ROOT CAUSES only and require immediate professional medical evaluation. This analysis is NOT a diagnosis and should not replace consultation with qualified healthcare providers. These hypotheses are meant to guide your discussion with your doctor, who can order appropriate tests and provide proper medical assessment."
}

Comprehensive Health Data:
"#;

const ROOT_CAUSE_TAIL: &str = r#"
Your task is to identify the ROOT CAUSE. Focus specifically on:
- What underlying medical condition could be causing ALL these symptoms?
- What systematic disease or disorder might explain the symptom patterns?
- What inflammatory, autoimmune, or metabolic condition could be the source?
- What hormonal imbalance or nutritional deficiency might be the root cause?
- What medication side effect or interaction could be causing this?
- What infectious disease or chronic condition might be underlying?
- When is immediate medical attention warranted?

Generate specific, actionable hypotheses that a doctor should investigate. Always emphasize the need for professional medical consultation."#;

const GENERAL_HEAD: &str = r#"You are a comprehensive health AI assistant analyzing health data to provide general health insights and patterns.

IMPORTANT: You are NOT providing medical diagnosis or treatment. You are analyzing patterns and providing general health insights that should be discussed with healthcare professionals.

Analyze the following health logs and provide comprehensive general health analysis in this exact JSON format:

{
  "patterns": ["key health pattern 1", "key health pattern 2", "key health pattern 3"],
  "potentialCauses": ["lifestyle factor 1", "environmental factor 2", "behavioral factor 3"],
  "recommendations": ["lifestyle recommendation 1", "wellness recommendation 2", "monitoring recommendation 3"],
  "riskFactors": ["general health risk 1", "lifestyle risk 2"],
  "nextSteps": ["immediate action 1", "ongoing monitoring 2", "lifestyle adjustment 3"],
  "disclaimer": "This analysis is for informational purposes only and should not replace professional medical advice. Please consult with your healthcare provider about any concerns."
}

Comprehensive Health Data:
"#;

const GENERAL_TAIL: &str = r#"
Provide a comprehensive general health analysis focusing on:
- Overall health patterns and trends over time
- Lifestyle correlations (sleep quality, mood patterns, stress levels, dietary habits)
- Temporal patterns (time of day, day of week, seasonal variations)
- Symptom correlations with daily activities and routines
- Potential lifestyle triggers or aggravating factors
- General wellness insights and observations
- Quality of life impact and daily functioning
- Overall health trajectory and trends

Be encouraging but realistic. If you see concerning patterns, emphasize the need for professional evaluation."#;

const STANDARD_HEAD: &str = r#"You are a medical AI assistant analyzing health logs to identify patterns and generate hypotheses.

IMPORTANT: You are NOT providing medical diagnosis or treatment. You are analyzing patterns and suggesting possible correlations that should be discussed with healthcare professionals.

Analyze the following health logs and provide insights in this exact JSON format:

{
  "patterns": ["pattern1", "pattern2", "pattern3"],
  "potentialCauses": ["possible cause 1", "possible cause 2", "possible cause 3"],
  "recommendations": ["recommendation 1", "recommendation 2", "recommendation 3"],
  "riskFactors": ["risk factor 1", "risk factor 2"],
  "nextSteps": ["next step 1", "next step 2", "next step 3"],
  "disclaimer": "This analysis is for informational purposes only and should not replace professional medical advice. Please consult with your healthcare provider about any concerns."
}

Comprehensive Health Data:
"#;

const STANDARD_TAIL: &str = r#"
Focus on:
- Temporal patterns (time of day, day of week, seasonal)
- Symptom correlations with sleep, mood, medications
- Potential triggers or aggravating factors
- Lifestyle factors that might be relevant
- Patterns that suggest when to seek medical attention

Be specific but cautious. If you see concerning patterns, emphasize the need for professional evaluation."#;

/// Build the user prompt for the given kind around the formatted records.
pub fn build_prompt(kind: PromptKind, data: &str) -> String {
    let (head, tail) = match kind {
        PromptKind::SingleLog => (SINGLE_LOG_HEAD, SINGLE_LOG_TAIL),
        PromptKind::RootCause => (ROOT_CAUSE_HEAD, ROOT_CAUSE_TAIL),
        PromptKind::General => (GENERAL_HEAD, GENERAL_TAIL),
        PromptKind::Standard => (STANDARD_HEAD, STANDARD_TAIL),
    };
    format!("{head}{data}\n{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{LabCategory, LabTestStatus, MedicalTestCategory, Mood};
    use crate::models::LabTest;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn log_at(hour: u32, symptoms: &[&str], medications: &[&str]) -> HealthLog {
        HealthLog {
            id: Uuid::new_v4(),
            // 2025-01-06 is a Monday
            date: Utc.with_ymd_and_hms(2025, 1, 6, hour, 15, 0).unwrap(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            medications: medications.iter().map(|s| s.to_string()).collect(),
            severity: 6,
            mood: Mood::Poor,
            sleep: 5.5,
            notes: "Long day".into(),
        }
    }

    #[test]
    fn log_stanza_has_fixed_field_order() {
        let text = format_records(&[log_at(9, &["Headache", "Nausea"], &[])], &[], &[]);
        let expected = "Date: 2025-01-06T09:15:00Z (Monday, morning)\n\
                        Symptoms: Headache, Nausea\n\
                        Medications: None\n\
                        Severity: 6/10\n\
                        Mood: poor\n\
                        Sleep: 5.5 hours\n\
                        Notes: Long day\n\
                        ---";
        assert_eq!(text, expected);
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(time_of_day(0), "morning");
        assert_eq!(time_of_day(11), "morning");
        assert_eq!(time_of_day(12), "afternoon");
        assert_eq!(time_of_day(16), "afternoon");
        assert_eq!(time_of_day(17), "evening");
        assert_eq!(time_of_day(23), "evening");
    }

    #[test]
    fn logs_are_joined_by_newline() {
        let text = format_records(&[log_at(9, &["A"], &[]), log_at(18, &["B"], &[])], &[], &[]);
        assert!(text.contains("---\nDate: "));
        assert!(text.contains("(Monday, evening)"));
    }

    #[test]
    fn lab_section_lists_optional_parts_only_when_present() {
        let lab = LabWork {
            id: Uuid::new_v4(),
            date: Utc.with_ymd_and_hms(2025, 1, 3, 8, 0, 0).unwrap(),
            category: LabCategory::Blood,
            lab_name: "City Lab".into(),
            ordering_physician: None,
            tests: vec![
                LabTest {
                    id: Uuid::new_v4(),
                    name: "Ferritin".into(),
                    value: "9".into(),
                    unit: Some("ng/mL".into()),
                    reference_range: Some("15-150".into()),
                    status: Some(LabTestStatus::Low),
                    notes: Some("recheck".into()),
                },
                LabTest {
                    id: Uuid::new_v4(),
                    name: "CRP".into(),
                    value: "negative".into(),
                    unit: None,
                    reference_range: None,
                    status: None,
                    notes: None,
                },
            ],
            overall_notes: Some("Fasting".into()),
            report_url: None,
        };
        let text = format_records(&[log_at(9, &["A"], &[])], &[lab], &[]);
        assert!(text.contains("\n\nLAB WORK DATA:\n\nLab Entry 1:\nDate: 2025-01-03\n"));
        assert!(text.contains("Lab/Facility: City Lab\nTest Type: blood\nTest Results:\n"));
        assert!(!text.contains("Ordering Physician"));
        assert!(text.contains(
            "  - Ferritin: 9 ng/mL (Reference: 15-150) [Status: low] - Notes: recheck\n"
        ));
        assert!(text.contains("  - CRP: negative\n"));
        assert!(text.ends_with("Overall Notes: Fasting\n"));
    }

    #[test]
    fn medical_test_section() {
        let test = MedicalTest {
            id: Uuid::new_v4(),
            date: Utc.with_ymd_and_hms(2025, 1, 4, 8, 0, 0).unwrap(),
            category: MedicalTestCategory::Xray,
            test_name: "Chest X-ray".into(),
            facility: Some("General".into()),
            ordering_physician: None,
            results: "Clear lungs".into(),
            impression: None,
            recommendations: None,
            follow_up: Some("None needed".into()),
            report_url: None,
        };
        let text = format_records(&[], &[], &[test]);
        assert!(text.starts_with("\n\nMEDICAL TESTS/IMAGING DATA:\n\nMedical Test 1:\n"));
        assert!(text.contains(concat!(
            "Test Type: xray\nTest Name: Chest X-ray\nFacility: General\n",
            "Results: Clear lungs\nFollow-up: None needed\n"
        )));
        assert!(!text.contains("Impression"));
    }

    #[test]
    fn prompt_kind_selection() {
        use AnalysisType::*;
        assert_eq!(PromptKind::select(Standard, false), PromptKind::Standard);
        assert_eq!(PromptKind::select(Standard, true), PromptKind::RootCause);
        assert_eq!(PromptKind::select(GeneralAnalysis, false), PromptKind::General);
        assert_eq!(PromptKind::select(MedicalHypotheses, false), PromptKind::RootCause);
        assert_eq!(PromptKind::select(SingleLogAnalysis, true), PromptKind::SingleLog);
    }

    #[test]
    fn every_prompt_embeds_data_and_schema() {
        for kind in [
            PromptKind::SingleLog,
            PromptKind::RootCause,
            PromptKind::General,
            PromptKind::Standard,
        ] {
            let prompt = build_prompt(kind, "DATA-MARKER");
            assert!(prompt.contains("DATA-MARKER"));
            assert!(prompt.contains("\"potentialCauses\""));
            assert!(prompt.contains("\"nextSteps\""));
        }
        assert!(build_prompt(PromptKind::RootCause, "").contains("ROOT CAUSE"));
    }
}
