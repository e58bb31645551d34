use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::{HealthLog, LabWork, MedicalTest};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;

/// Which question the user asked. Selects the prompt and, with
/// `focus_on_causes`, the fallback template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    #[default]
    Standard,
    GeneralAnalysis,
    SingleLogAnalysis,
    MedicalHypotheses,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::GeneralAnalysis => "general_analysis",
            Self::SingleLogAnalysis => "single_log_analysis",
            Self::MedicalHypotheses => "medical_hypotheses",
        }
    }
}

/// Records to analyse plus the question asked about them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub logs: Vec<HealthLog>,
    #[serde(default)]
    pub lab_work: Vec<LabWork>,
    #[serde(default)]
    pub medical_tests: Vec<MedicalTest>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub focus_on_causes: bool,
}

impl AnalysisRequest {
    /// Root-cause wording is used iff the caller asked for medical
    /// hypotheses or explicitly focused on causes.
    pub fn wants_root_cause(&self) -> bool {
        self.analysis_type == AnalysisType::MedicalHypotheses || self.focus_on_causes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: &str, system: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Remote text-completion provider. Returns the assistant message content.
pub trait CompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError> {
        (**self).complete(request)
    }
}
