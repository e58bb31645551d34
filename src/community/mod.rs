//! Search public health forums for posts describing similar symptoms.

pub mod reddit;
pub mod search;
pub mod types;

pub use reddit::*;
pub use search::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Forum search endpoint unreachable at {0}")]
    Connection(String),

    #[error("Forum search timed out after {0}s")]
    Timeout(u64),

    #[error("Forum search returned status {0}")]
    Status(u16),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}
