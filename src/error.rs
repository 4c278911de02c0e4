use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the API client.
///
/// HTTP error responses are collapsed into a single [`Error::Api`] variant
/// regardless of status code; callers needing finer classification can match
/// on the embedded status.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error("n8n API error {status} {status_text}: {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Transport-level failure (DNS, connect, TLS, body read), passed
    /// through from reqwest unmodified.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The base URL parsed but cannot take path segments (e.g. `mailto:`).
    #[error("unsupported base URL: {0}")]
    UnsupportedBaseUrl(String),
}
