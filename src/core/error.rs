use thiserror::Error;

/// Everything that can go wrong inside a source. None of these cross the
/// public entry points; they are logged and turned into degraded results.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("url does not match the expected pattern: {0}")]
    InvalidUrl(String),

    #[error("no transport produced a response for {0}")]
    NoResponse(String),

    #[error("empty response body from {0}")]
    EmptyResponse(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("invalid header {0}")]
    InvalidHeader(String),
}

impl SourceError {
    /// Stable label used as the `category` field in log events.
    pub fn category(&self) -> &'static str {
        match self {
            SourceError::InvalidUrl(_) => "invalid_url",
            SourceError::NoResponse(_) => "transport",
            SourceError::EmptyResponse(_) => "empty_response",
            SourceError::Json(_) => "malformed_json",
            SourceError::UnexpectedShape(_) => "unexpected_shape",
            SourceError::Http(_) => "http",
            SourceError::Regex(_) => "regex",
            SourceError::BaseUrl(_) | SourceError::InvalidHeader(_) => "config",
        }
    }
}

/// Failure of a single transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
