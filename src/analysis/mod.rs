pub mod fallback;
pub mod openai;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use fallback::*;
pub use openai::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Completion endpoint unreachable at {0}")]
    Connection(String),

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion endpoint rejected the API key (status {0})")]
    Unauthorized(u16),

    #[error("Completion endpoint returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion response had no content")]
    EmptyContent,

    #[error("API key is not in the expected format")]
    InvalidApiKey,
}
