use std::sync::LazyLock;

use regex::Regex;

use super::prompt::STANDARD_DISCLAIMER;
use super::types::AnalysisType;
use crate::models::HypothesisAnalysis;

/// `- item`, `• item`, `* item`. The marker must be followed by whitespace so
/// that markdown emphasis (`**Patterns:**`) reads as a heading.
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-•*]\s+(.+?)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Patterns,
    Causes,
    Recommendations,
    Risks,
    NextSteps,
}

/// Turn completion text into an analysis. Never fails: JSON first, then the
/// line heuristic, then fixed filler.
pub fn parse_completion(content: &str, analysis_type: AnalysisType) -> HypothesisAnalysis {
    match parse_json(content) {
        Some(analysis) => analysis,
        None => {
            tracing::info!("Completion was not JSON, using line heuristic");
            parse_text(content, analysis_type)
        }
    }
}

/// Strip a ```json (or bare ```) fence if the model wrapped its answer.
fn unwrap_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let start = match trimmed.find("```json") {
        Some(i) => i + 7,
        None => match trimmed.find("```") {
            Some(i) => i + 3,
            None => return trimmed,
        },
    };
    match trimmed[start..].find("```") {
        Some(end) => trimmed[start..start + end].trim(),
        None => trimmed[start..].trim(),
    }
}

fn parse_json(content: &str) -> Option<HypothesisAnalysis> {
    let body = unwrap_fence(content);
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if !value.is_object() {
        return None;
    }
    let mut analysis: HypothesisAnalysis = serde_json::from_value(value).ok()?;
    if analysis.disclaimer.trim().is_empty() {
        analysis.disclaimer = STANDARD_DISCLAIMER.to_string();
    }
    Some(analysis)
}

fn section_for(line: &str) -> Option<Section> {
    let lower = line.to_lowercase();
    if lower.contains("pattern") {
        Some(Section::Patterns)
    } else if lower.contains("cause") || lower.contains("trigger") {
        Some(Section::Causes)
    } else if lower.contains("recommend") {
        Some(Section::Recommendations)
    } else if lower.contains("risk") {
        Some(Section::Risks)
    } else if lower.contains("next step") || lower.contains("action") {
        Some(Section::NextSteps)
    } else {
        None
    }
}

fn or_filler(items: Vec<String>, filler: &str) -> Vec<String> {
    if items.is_empty() {
        vec![filler.to_string()]
    } else {
        items
    }
}

/// Free-text heuristic: heading lines switch section, bullets are items.
pub fn parse_text(content: &str, analysis_type: AnalysisType) -> HypothesisAnalysis {
    let mut analysis = HypothesisAnalysis::default();
    let mut current: Option<Section> = None;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(caps) = BULLET.captures(line) {
            let item = caps[1].to_string();
            match current {
                Some(Section::Patterns) => analysis.patterns.push(item),
                Some(Section::Causes) => analysis.potential_causes.push(item),
                Some(Section::Recommendations) => analysis.recommendations.push(item),
                Some(Section::Risks) => analysis.risk_factors.push(item),
                Some(Section::NextSteps) => analysis.next_steps.push(item),
                None => {}
            }
        } else if let Some(section) = section_for(line) {
            current = Some(section);
        }
    }

    if analysis.patterns.is_empty() {
        return no_clear_patterns(analysis_type);
    }

    HypothesisAnalysis {
        patterns: analysis.patterns,
        potential_causes: or_filler(
            analysis.potential_causes,
            "Continue tracking to identify potential causes",
        ),
        recommendations: or_filler(
            analysis.recommendations,
            "Continue logging for better pattern recognition",
        ),
        risk_factors: or_filler(analysis.risk_factors, "Monitor for any concerning changes"),
        next_steps: or_filler(
            analysis.next_steps,
            "Continue tracking symptoms and consult healthcare provider if concerned",
        ),
        disclaimer: STANDARD_DISCLAIMER.to_string(),
        lab_insights: None,
        test_correlations: None,
    }
}

fn no_clear_patterns(analysis_type: AnalysisType) -> HypothesisAnalysis {
    let next = "Continue tracking symptoms and consult healthcare provider if concerned";
    if analysis_type == AnalysisType::MedicalHypotheses {
        HypothesisAnalysis {
            patterns: vec!["Root Cause Analysis: No clear patterns identified yet".into()],
            potential_causes: vec!["Continue tracking to identify potential root causes".into()],
            recommendations: vec![
                "CRITICAL: Continue logging for better medical pattern recognition".into(),
            ],
            risk_factors: vec!["Monitor for any concerning medical changes".into()],
            next_steps: vec![next.into()],
            disclaimer: format!("MEDICAL DISCLAIMER: {STANDARD_DISCLAIMER}"),
            lab_insights: None,
            test_correlations: None,
        }
    } else {
        HypothesisAnalysis {
            patterns: vec!["General Health Analysis: No clear patterns identified yet".into()],
            potential_causes: vec![
                "Continue tracking to identify potential lifestyle causes".into(),
            ],
            recommendations: vec![
                "Continue logging for better general health pattern recognition".into(),
            ],
            risk_factors: vec!["Monitor for any concerning health changes".into()],
            next_steps: vec![next.into()],
            disclaimer: STANDARD_DISCLAIMER.to_string(),
            lab_insights: None,
            test_correlations: None,
        }
    }
}
