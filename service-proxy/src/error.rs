use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Assembly
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to encode request body: {0}")]
    BodyEncoding(#[source] serde_json::Error),

    // Execution
    #[error("failed to request ({url}): {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid status code of response from {url}: {code}")]
    UnexpectedStatus { url: String, code: u16 },
    #[error("failed to read response body from {url}: {source}")]
    ReadFailure {
        url: String,
        #[source]
        source: std::io::Error,
    },

    // Decoding
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Status code of a non-2xx response, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
