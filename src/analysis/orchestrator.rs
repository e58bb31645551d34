use super::fallback::{fallback_analysis, insufficient_data};
use super::openai::OpenAiClient;
use super::parser::parse_completion;
use super::prompt::{build_prompt, format_records, PromptKind, ANALYSIS_SYSTEM_PROMPT};
use super::types::{AnalysisRequest, CompletionClient, CompletionRequest, DEFAULT_MODEL};
use crate::config::CompletionConfig;
use crate::models::HypothesisAnalysis;

/// Produces a `HypothesisAnalysis` for every request: remote model when one is
/// configured and answers, local fallback otherwise.
pub struct HypothesisGenerator {
    client: Option<Box<dyn CompletionClient + Send + Sync>>,
    model: String,
}

impl HypothesisGenerator {
    pub fn new(client: Box<dyn CompletionClient + Send + Sync>, model: &str) -> Self {
        Self {
            client: Some(client),
            model: model.to_string(),
        }
    }

    /// Local analysis only.
    pub fn offline() -> Self {
        Self {
            client: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Constructs the remote client; blocking, so call from a blocking thread.
    pub fn from_config(config: &CompletionConfig) -> Self {
        match OpenAiClient::from_config(config) {
            Ok(Some(client)) => Self::new(Box::new(client), &config.model),
            Ok(None) => {
                tracing::info!("No completion API key configured, using local analysis");
                Self::offline()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Completion client unavailable, using local analysis");
                Self::offline()
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Never fails. Remote errors of any kind are logged and replaced by the
    /// fallback for the requested template.
    pub fn generate(&self, request: &AnalysisRequest) -> HypothesisAnalysis {
        let root_cause = request.wants_root_cause();
        let _span = tracing::info_span!(
            "generate_analysis",
            analysis_type = request.analysis_type.as_str(),
            logs = request.logs.len(),
            labs = request.lab_work.len(),
            tests = request.medical_tests.len(),
        )
        .entered();

        if request.logs.is_empty() {
            return insufficient_data(root_cause);
        }

        let Some(client) = self.client.as_ref() else {
            return fallback_analysis(
                &request.logs,
                &request.lab_work,
                &request.medical_tests,
                root_cause,
            );
        };

        let data = format_records(&request.logs, &request.lab_work, &request.medical_tests);
        let kind = PromptKind::select(request.analysis_type, request.focus_on_causes);
        let prompt = build_prompt(kind, &data);
        let completion = CompletionRequest::new(&self.model, ANALYSIS_SYSTEM_PROMPT, &prompt);

        match client.complete(&completion) {
            Ok(content) => {
                tracing::info!(chars = content.len(), "Completion received");
                parse_completion(&content, request.analysis_type)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed, using local analysis");
                fallback_analysis(
                    &request.logs,
                    &request.lab_work,
                    &request.medical_tests,
                    root_cause,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::openai::MockCompletionClient;
    use crate::analysis::types::AnalysisType;
    use crate::analysis::AnalysisError;
    use crate::models::enums::Mood;
    use crate::models::HealthLog;
    use chrono::Utc;
    use uuid::Uuid;

    fn logs(n: usize) -> Vec<HealthLog> {
        (0..n)
            .map(|_| HealthLog {
                id: Uuid::new_v4(),
                date: Utc::now(),
                symptoms: vec!["Headache".into()],
                medications: vec![],
                severity: 5,
                mood: Mood::Neutral,
                sleep: 7.0,
                notes: String::new(),
            })
            .collect()
    }

    fn request(analysis_type: AnalysisType, n: usize) -> AnalysisRequest {
        AnalysisRequest {
            logs: logs(n),
            analysis_type,
            ..Default::default()
        }
    }

    #[test]
    fn empty_logs_short_circuit_without_calling_client() {
        let mock = MockCompletionClient::new("{}");
        let generator = HypothesisGenerator::new(Box::new(mock), DEFAULT_MODEL);
        let analysis = generator.generate(&request(AnalysisType::MedicalHypotheses, 0));
        assert_eq!(analysis, insufficient_data(true));
    }

    #[test]
    fn offline_uses_general_fallback() {
        let analysis = HypothesisGenerator::offline().generate(&request(AnalysisType::Standard, 3));
        assert_eq!(analysis.patterns[0], "Average symptom severity is 5.0/10");
    }

    #[test]
    fn focus_on_causes_selects_root_cause_fallback() {
        let mut req = request(AnalysisType::GeneralAnalysis, 2);
        req.focus_on_causes = true;
        let analysis = HypothesisGenerator::offline().generate(&req);
        assert!(analysis.patterns[0].starts_with("Primary symptoms:"));
    }

    #[test]
    fn remote_json_is_used() {
        let mock = MockCompletionClient::new(r#"{"patterns":["Remote pattern"],"disclaimer":"d"}"#);
        let generator = HypothesisGenerator::new(Box::new(mock), DEFAULT_MODEL);
        let analysis = generator.generate(&request(AnalysisType::Standard, 2));
        assert_eq!(analysis.patterns, vec!["Remote pattern"]);
    }

    #[test]
    fn remote_text_goes_through_heuristic() {
        let mock = MockCompletionClient::new("Patterns:\n- Monday headaches");
        let generator = HypothesisGenerator::new(Box::new(mock), DEFAULT_MODEL);
        let analysis = generator.generate(&request(AnalysisType::Standard, 2));
        assert_eq!(analysis.patterns, vec!["Monday headaches"]);
    }

    #[test]
    fn auth_failure_falls_back_to_requested_template() {
        let mock = MockCompletionClient::failing(|| AnalysisError::Unauthorized(401));
        let generator = HypothesisGenerator::new(Box::new(mock), DEFAULT_MODEL);
        let analysis = generator.generate(&request(AnalysisType::MedicalHypotheses, 2));
        assert_eq!(analysis.potential_causes.len(), 8);
    }

    #[test]
    fn transport_failure_falls_back() {
        let mock = MockCompletionClient::failing(|| AnalysisError::Connection("x".into()));
        let generator = HypothesisGenerator::new(Box::new(mock), DEFAULT_MODEL);
        let analysis = generator.generate(&request(AnalysisType::Standard, 2));
        assert_eq!(analysis.potential_causes.len(), 5);
    }

    #[test]
    fn invalid_key_config_is_offline() {
        let config = CompletionConfig {
            api_key: Some("definitely-not-a-key".into()),
            ..Default::default()
        };
        assert!(!HypothesisGenerator::from_config(&config).is_remote());
        assert!(!HypothesisGenerator::from_config(&CompletionConfig::default()).is_remote());
    }
}
