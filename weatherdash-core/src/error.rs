use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can terminate a single fetch cycle.
///
/// All variants except [`FetchError::Cancelled`] are user-visible; a
/// cancelled request is discarded silently by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("City not found")]
    CityNotFound,

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// 2xx response whose `data` array was empty.
    #[error("No weather data available for this city")]
    NoData,

    /// Network or parse failure, carrying the underlying message.
    #[error("{0}")]
    Transport(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    pub(crate) fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => FetchError::Unauthorized,
            StatusCode::NOT_FOUND => FetchError::CityNotFound,
            StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
            other => FetchError::Http { status: other.as_u16() },
        }
    }

    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        let msg = err.to_string();
        if msg.is_empty() {
            FetchError::Transport("Failed to fetch weather data".to_owned())
        } else {
            FetchError::Transport(msg)
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::transport(err)
    }
}
