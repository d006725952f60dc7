use thiserror::Error;

/// Reasons a single resource could not be fetched. The orchestrator treats
/// every variant the same way: the branch is dropped and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Parse failure: {0}")]
    ParseFailure(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status().map(|s| s.as_u16()) {
            Some(404) => FetchError::NotFound(err.to_string()),
            Some(429) => FetchError::RateLimited(err.to_string()),
            _ if err.is_decode() => FetchError::ParseFailure(err.to_string()),
            _ => FetchError::Network(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Seed identifier must not be empty")]
    EmptySeed,

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
