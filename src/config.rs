use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Application-level constants
pub const APP_NAME: &str = "Health Detective";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REDDIT_URL: &str = "https://www.reddit.com";
const DEFAULT_REDDIT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REDDIT_USER_AGENT: &str = "Health-Detective/0.1 (symptom journal)";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "health_detective_lib=info,tower_http=info"
}

/// Get the application data directory.
/// `HD_DATA_DIR` when set, otherwise ~/HealthDetective/.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = env_string("HD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("HealthDetective")
}

/// Default location of the journal database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("journal.db")
}

/// Settings for the remote chat-completion provider.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// `None` disables the remote call entirely (fallback analysis only).
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            timeout_secs: DEFAULT_COMPLETION_TIMEOUT_SECS,
        }
    }
}

/// Settings for the public community search endpoint.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REDDIT_URL.to_string(),
            timeout_secs: DEFAULT_REDDIT_TIMEOUT_SECS,
            user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
        }
    }
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub completion: CompletionConfig,
    pub reddit: RedditConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            db_path: database_path(),
            completion: CompletionConfig::default(),
            reddit: RedditConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from `HD_*` / `OPENAI_API_KEY` environment variables.
    pub fn from_env() -> Self {
        let completion = CompletionConfig {
            // Keys pasted across lines arrive with embedded newlines.
            api_key: env_string("OPENAI_API_KEY").map(|k| k.replace(['\n', '\r'], "")),
            base_url: env_string("HD_COMPLETION_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            model: env_string("HD_COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            timeout_secs: env_parsed("HD_COMPLETION_TIMEOUT_SECS", DEFAULT_COMPLETION_TIMEOUT_SECS),
        };

        let reddit = RedditConfig {
            base_url: env_string("HD_REDDIT_URL").unwrap_or_else(|| DEFAULT_REDDIT_URL.to_string()),
            timeout_secs: env_parsed("HD_REDDIT_TIMEOUT_SECS", DEFAULT_REDDIT_TIMEOUT_SECS),
            user_agent: env_string("HD_REDDIT_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_REDDIT_USER_AGENT.to_string()),
        };

        Self {
            bind_addr: env_parsed(
                "HD_BIND_ADDR",
                SocketAddr::from_str(DEFAULT_BIND_ADDR)
                    .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787))),
            ),
            db_path: env_string("HD_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(database_path),
            completion,
            reddit,
        }
    }
}

/// Non-empty, trimmed environment variable.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match env_string(key) {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Unparseable config value, using default");
                default
            }
        },
    }
}
