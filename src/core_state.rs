//! Shared application state behind the HTTP router.
//!
//! Holds the runtime configuration and the outbound service backends.
//! SQLite connections are opened per request from the configured path.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::analysis::{validate_api_key, CompletionClient, HypothesisGenerator};
use crate::community::{self, CommunitySearchResult, PostSource, RedditClient, SearchMode};
use crate::config::AppConfig;
use crate::db;
use crate::models::HealthLog;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    /// Replaces the configured completion provider when set.
    completion_client: Option<Arc<dyn CompletionClient + Send + Sync>>,
    /// Replaces the Reddit client when set.
    post_source: Option<Arc<dyn PostSource + Send + Sync>>,
}

impl CoreState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            completion_client: None,
            post_source: None,
        }
    }

    pub fn with_completion_client(
        mut self,
        client: Arc<dyn CompletionClient + Send + Sync>,
    ) -> Self {
        self.completion_client = Some(client);
        self
    }

    pub fn with_post_source(mut self, source: Arc<dyn PostSource + Send + Sync>) -> Self {
        self.post_source = Some(source);
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }

    /// Open a connection to the journal database (migrations applied).
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        Ok(db::open_database(&self.config.db_path)?)
    }

    /// Whether analysis requests will try a remote model first.
    pub fn ai_configured(&self) -> bool {
        self.completion_client.is_some()
            || self
                .config
                .completion
                .api_key
                .as_deref()
                .is_some_and(|key| validate_api_key(key).is_ok())
    }

    /// Build the analysis generator. Blocking: constructs an HTTP client.
    pub fn hypothesis_generator(&self) -> HypothesisGenerator {
        match &self.completion_client {
            Some(client) => HypothesisGenerator::new(
                Box::new(Arc::clone(client)),
                &self.config.completion.model,
            ),
            None => HypothesisGenerator::from_config(&self.config.completion),
        }
    }

    /// Community search over the given logs. Blocking: performs HTTP requests.
    pub fn search_community(&self, logs: &[HealthLog], mode: SearchMode) -> CommunitySearchResult {
        if let Some(source) = &self.post_source {
            return community::search_similar_cases(source.as_ref(), logs, mode);
        }
        match RedditClient::from_config(&self.config.reddit) {
            Ok(client) => community::search_similar_cases(&client, logs, mode),
            Err(e) => {
                tracing::warn!(error = %e, "Forum client unavailable, returning no results");
                CommunitySearchResult::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockCompletionClient;
    use crate::community::MockPostSource;
    use crate::config::CompletionConfig;

    fn config_in(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            db_path: dir.path().join("journal.db"),
            ..AppConfig::default()
        }
    }

    #[test]
    fn open_db_creates_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(config_in(&dir));
        let conn = state.open_db().unwrap();
        assert!(db::count_tables(&conn).unwrap() > 0);
        assert!(state.db_path().exists());
    }

    #[test]
    fn ai_not_configured_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(config_in(&dir));
        assert!(!state.ai_configured());
        assert!(!state.hypothesis_generator().is_remote());
    }

    #[test]
    fn malformed_key_is_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.completion = CompletionConfig {
            api_key: Some("not-a-key".into()),
            ..CompletionConfig::default()
        };
        assert!(!CoreState::new(config).ai_configured());
    }

    #[test]
    fn injected_client_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(config_in(&dir))
            .with_completion_client(Arc::new(MockCompletionClient::new("{}")));
        assert!(state.ai_configured());
        assert!(state.hypothesis_generator().is_remote());
    }

    #[test]
    fn injected_post_source_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockPostSource::new());
        let state = CoreState::new(config_in(&dir)).with_post_source(source.clone());
        let result = state.search_community(&[], SearchMode::Medical);
        assert!(result.posts.is_empty());
        assert!(source.calls().is_empty());
    }
}
