use std::time::Duration;

use serde::Deserialize;

use super::types::{CompletionClient, CompletionRequest};
use super::AnalysisError;
use crate::config::CompletionConfig;

/// Both legacy `sk-...` and project `sk-proj-...` keys share this prefix.
const API_KEY_PREFIX: &str = "sk-";

/// Accept only keys that look like provider secret keys.
pub fn validate_api_key(key: &str) -> Result<(), AnalysisError> {
    if key.starts_with(API_KEY_PREFIX) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidApiKey)
    }
}

/// Blocking chat-completions client. Build and use it on a blocking thread.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        validate_api_key(api_key)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    /// `Ok(None)` when no key is configured.
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>, AnalysisError> {
        match config.api_key.as_deref() {
            None => Ok(None),
            Some(key) => Self::new(&config.base_url, key, config.timeout_secs).map(Some),
        }
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, AnalysisError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout_secs)
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AnalysisError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnalysisError::EmptyContent)
    }
}

/// Mock completion client for testing. Returns a canned response or error.
pub struct MockCompletionClient {
    response: Result<String, fn() -> AnalysisError>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing(make_error: fn() -> AnalysisError) -> Self {
        Self {
            response: Err(make_error),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.response {
            Ok(content) => Ok(content.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::DEFAULT_MODEL;

    #[test]
    fn api_key_prefix_check() {
        assert!(validate_api_key("sk-abc").is_ok());
        assert!(validate_api_key("sk-proj-abc").is_ok());
        assert!(matches!(
            validate_api_key("pk-live-123"),
            Err(AnalysisError::InvalidApiKey)
        ));
    }

    #[test]
    fn constructor_rejects_bad_key() {
        assert!(OpenAiClient::new("https://api.openai.com/v1", "not-a-key", 5).is_err());
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OpenAiClient::new("https://api.openai.com/v1/", "sk-test", 5).unwrap();
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.timeout_secs, 5);
    }

    #[test]
    fn from_config_without_key_is_none() {
        let config = CompletionConfig::default();
        assert!(OpenAiClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn unreachable_endpoint_is_connection_error() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let client = OpenAiClient::new("http://127.0.0.1:9/v1", "sk-test", 2).unwrap();
        let request = CompletionRequest::new(DEFAULT_MODEL, "sys", "prompt");
        let err = client.complete(&request).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Connection(_) | AnalysisError::Timeout(_) | AnalysisError::HttpClient(_)
        ));
    }

    #[test]
    fn mock_returns_configured_response() {
        let mock = MockCompletionClient::new("hello");
        let request = CompletionRequest::new(DEFAULT_MODEL, "sys", "prompt");
        assert_eq!(mock.complete(&request).unwrap(), "hello");
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn mock_failing_returns_error() {
        let mock = MockCompletionClient::failing(|| AnalysisError::Unauthorized(401));
        let request = CompletionRequest::new(DEFAULT_MODEL, "sys", "prompt");
        assert!(matches!(
            mock.complete(&request),
            Err(AnalysisError::Unauthorized(401))
        ));
    }
}
