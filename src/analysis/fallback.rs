//! Local, rule-based analysis used whenever the remote model is unavailable.
//!
//! Two templates exist: a general-wellness one and a root-cause one. Which is
//! used is decided by the request, never by the data.

use crate::models::enums::LabTestStatus;
use crate::models::{HealthLog, HypothesisAnalysis, LabWork, MedicalTest};

const MAX_COMMON_SYMPTOMS: usize = 3;
const TREND_THRESHOLD: f64 = 1.0;
const HIGH_SEVERITY: f64 = 7.0;

/// Direction of severity between the earlier and later half of the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTrend {
    InsufficientData,
    Worsening,
    Improving,
    Stable,
}

impl SeverityTrend {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::InsufficientData => "Insufficient data to determine trend",
            Self::Worsening => "Symptoms appear to be worsening over time",
            Self::Improving => "Symptoms appear to be improving over time",
            Self::Stable => "Symptoms appear to be stable over time",
        }
    }
}

/// Summary numbers both templates are built from.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSummary {
    pub average_severity: f64,
    pub average_sleep: f64,
    pub common_symptoms: Vec<String>,
    pub trend: SeverityTrend,
}

impl LogSummary {
    /// `None` for an empty slice.
    pub fn from_logs(logs: &[HealthLog]) -> Option<Self> {
        if logs.is_empty() {
            return None;
        }
        let n = logs.len() as f64;
        Some(Self {
            average_severity: logs.iter().map(|l| l.severity as f64).sum::<f64>() / n,
            average_sleep: logs.iter().map(|l| l.sleep).sum::<f64>() / n,
            common_symptoms: common_symptoms(logs, MAX_COMMON_SYMPTOMS),
            trend: severity_trend(logs),
        })
    }
}

/// Most frequent symptom labels, descending by count. Ties keep the order in
/// which the labels were first seen.
pub fn common_symptoms(logs: &[HealthLog], limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for symptom in logs.iter().flat_map(|l| l.symptoms.iter()) {
        if symptom.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(s, _)| *s == symptom.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((symptom.as_str(), 1)),
        }
    }
    // sort_by is stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(s, _)| s.to_string())
        .collect()
}

/// Compare mean severity of the later half of the logs (by date) against the
/// earlier half. The earlier half takes the extra record when the count is odd.
pub fn severity_trend(logs: &[HealthLog]) -> SeverityTrend {
    if logs.len() < 2 {
        return SeverityTrend::InsufficientData;
    }
    let mut sorted: Vec<&HealthLog> = logs.iter().collect();
    sorted.sort_by_key(|l| l.date);

    let split = logs.len().div_ceil(2);
    let mean = |part: &[&HealthLog]| {
        part.iter().map(|l| l.severity as f64).sum::<f64>() / part.len() as f64
    };
    let first = mean(&sorted[..split]);
    let second = mean(&sorted[split..]);

    if second > first + TREND_THRESHOLD {
        SeverityTrend::Worsening
    } else if second < first - TREND_THRESHOLD {
        SeverityTrend::Improving
    } else {
        SeverityTrend::Stable
    }
}

fn flagged_tests(labs: &[LabWork]) -> Vec<LabTestStatus> {
    labs.iter()
        .flat_map(|lab| lab.out_of_range_tests())
        .filter_map(|t| t.status)
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fallback analysis for whichever template the request selected.
pub fn fallback_analysis(
    logs: &[HealthLog],
    labs: &[LabWork],
    tests: &[MedicalTest],
    root_cause: bool,
) -> HypothesisAnalysis {
    tracing::debug!(logs = logs.len(), root_cause, "Generating local fallback analysis");
    if root_cause {
        root_cause_analysis(logs, labs, tests)
    } else {
        general_analysis(logs, labs, tests)
    }
}

/// Fixed response for an empty log set.
pub fn insufficient_data(root_cause: bool) -> HypothesisAnalysis {
    if root_cause {
        HypothesisAnalysis {
            patterns: strings(&["No health logs available for medical analysis"]),
            potential_causes: strings(&["Insufficient data to generate medical hypotheses"]),
            recommendations: strings(&[
                "Start logging symptoms and consult with healthcare provider",
            ]),
            risk_factors: vec![],
            next_steps: strings(&["Schedule medical consultation for proper evaluation"]),
            disclaimer: "MEDICAL DISCLAIMER: No symptoms to analyze. Please consult with your healthcare provider for proper medical evaluation.".into(),
            lab_insights: None,
            test_correlations: None,
        }
    } else {
        HypothesisAnalysis {
            patterns: strings(&["No health logs available for analysis"]),
            potential_causes: strings(&["Insufficient data to identify causes"]),
            recommendations: strings(&["Start logging your symptoms daily for better insights"]),
            risk_factors: vec![],
            next_steps: strings(&["Begin tracking your health data consistently"]),
            disclaimer: "This analysis is based on limited data. For comprehensive medical evaluation, please consult with your healthcare provider.".into(),
            lab_insights: None,
            test_correlations: None,
        }
    }
}

fn general_analysis(
    logs: &[HealthLog],
    labs: &[LabWork],
    tests: &[MedicalTest],
) -> HypothesisAnalysis {
    let Some(summary) = LogSummary::from_logs(logs) else {
        return insufficient_data(false);
    };

    let common = if summary.common_symptoms.is_empty() {
        "None recorded".to_string()
    } else {
        summary.common_symptoms.join(", ")
    };
    let mut patterns = vec![
        format!("Average symptom severity is {:.1}/10", summary.average_severity),
        format!("Average sleep duration is {:.1} hours", summary.average_sleep),
        format!("Most common symptoms: {common}"),
        summary.trend.describe().to_string(),
    ];

    if !labs.is_empty() {
        patterns.push(format!("{} lab work entries available for analysis", labs.len()));
        let flagged = flagged_tests(labs).len();
        if flagged > 0 {
            patterns.push(format!("{flagged} abnormal lab results require attention"));
        }
    }
    if !tests.is_empty() {
        patterns.push(format!(
            "{} medical test entries available for correlation",
            tests.len()
        ));
    }

    let risk_factors = if summary.average_severity > HIGH_SEVERITY {
        strings(&[
            "High symptom severity - consider medical evaluation",
            "Poor sleep quality may be contributing to symptoms",
        ])
    } else {
        vec![]
    };

    HypothesisAnalysis {
        patterns,
        potential_causes: strings(&[
            "Stress and lifestyle factors",
            "Sleep quality and duration",
            "Diet and nutrition",
            "Environmental factors",
            "Medication interactions",
        ]),
        recommendations: strings(&[
            "Continue tracking symptoms for better pattern recognition",
            "Monitor sleep quality and its impact on symptoms",
            "Note any dietary changes or triggers",
            "Track stress levels and their correlation with symptoms",
            "Consult healthcare provider if symptoms worsen",
        ]),
        risk_factors,
        next_steps: strings(&[
            "Continue daily symptom logging",
            "Share this data with your healthcare provider",
            "Monitor for any new or worsening symptoms",
            "Consider lifestyle modifications based on patterns",
        ]),
        disclaimer: "This is a local analysis based on your logged data. For comprehensive medical evaluation, please consult with your healthcare provider. This analysis is for informational purposes only and should not replace professional medical advice.".into(),
        lab_insights: Some(if labs.is_empty() {
            vec![]
        } else {
            vec![format!("{} lab work entries included in analysis", labs.len())]
        }),
        test_correlations: Some(if tests.is_empty() {
            vec![]
        } else {
            vec![format!(
                "{} medical tests included for correlation analysis",
                tests.len()
            )]
        }),
    }
}

fn root_cause_analysis(
    logs: &[HealthLog],
    labs: &[LabWork],
    tests: &[MedicalTest],
) -> HypothesisAnalysis {
    let Some(summary) = LogSummary::from_logs(logs) else {
        return insufficient_data(true);
    };

    let primary = if summary.common_symptoms.is_empty() {
        "Various symptoms recorded".to_string()
    } else {
        summary.common_symptoms.join(", ")
    };
    let mut patterns = vec![
        format!("Primary symptoms: {primary}"),
        format!("Severity pattern: {:.1}/10 average", summary.average_severity),
        format!("Sleep correlation: {:.1} hours average", summary.average_sleep),
        summary.trend.describe().to_string(),
    ];

    if !labs.is_empty() {
        patterns.push(format!("Lab work data: {} entries analyzed", labs.len()));
        let flagged = flagged_tests(labs);
        if !flagged.is_empty() {
            patterns.push(format!(
                "Key findings: {} abnormal lab values detected",
                flagged.len()
            ));
            let critical = flagged
                .iter()
                .filter(|s| **s == LabTestStatus::Critical)
                .count();
            if critical > 0 {
                patterns.push(format!(
                    "{critical} critical lab values require immediate medical attention"
                ));
            }
        }
    }
    if !tests.is_empty() {
        patterns.push(format!(
            "Medical imaging/tests: {} entries for correlation analysis",
            tests.len()
        ));
    }

    HypothesisAnalysis {
        patterns,
        potential_causes: strings(&[
            "Inflammatory conditions (requires medical evaluation)",
            "Autoimmune disorders (blood work and specialist consultation needed)",
            "Hormonal imbalances (endocrine evaluation recommended)",
            "Chronic stress syndrome (multidisciplinary assessment)",
            "Nutritional deficiencies (laboratory testing suggested)",
            "Sleep disorders (sleep study consideration)",
            "Medication side effects (pharmacological review)",
            "Environmental or infectious triggers (specialist evaluation)",
        ]),
        recommendations: strings(&[
            "IMPORTANT: Discuss these hypotheses with your doctor immediately",
            "Request comprehensive blood work and physical examination",
            "Consider specialist referrals as recommended by physician",
            "Prepare detailed symptom timeline for medical consultation",
            "Bring this analysis to your next medical appointment",
        ]),
        risk_factors: strings(&[
            "Persistent symptoms requiring professional medical evaluation",
            "Multiple symptom patterns suggesting systematic causes",
            "Impact on daily functioning and quality of life",
            "Need for proper diagnostic workup and testing",
        ]),
        next_steps: strings(&[
            "Schedule urgent appointment with healthcare provider",
            "Prepare comprehensive list of symptoms for doctor visit",
            "Request appropriate diagnostic tests as recommended",
            "Continue detailed symptom tracking until medical consultation",
            "Review all medications with doctor for potential interactions",
        ]),
        disclaimer: "MEDICAL DISCLAIMER: These are potential medical hypotheses only and require immediate professional medical evaluation. This analysis is NOT a diagnosis and should not replace urgent consultation with qualified healthcare providers. Please discuss all symptoms and potential causes with your doctor, who can order appropriate tests and provide proper medical assessment.".into(),
        lab_insights: Some(if labs.is_empty() {
            vec![]
        } else {
            vec![format!(
                "{} lab work entries analyzed for medical correlations",
                labs.len()
            )]
        }),
        test_correlations: Some(if tests.is_empty() {
            vec![]
        } else {
            vec![format!(
                "{} medical tests analyzed for symptom correlations",
                tests.len()
            )]
        }),
    }
}
