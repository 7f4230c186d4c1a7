use crate::types::Method;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A parent collection could not be created.
    #[error("creation of directory {uri} failed, the server response was {status} {response}")]
    Provisioning {
        uri: String,
        status: u16,
        response: String,
    },

    /// The PUT for the object itself was rejected.
    #[error("uploading of {uri} failed, the server response was {status} {response}")]
    Upload {
        uri: String,
        status: u16,
        response: String,
    },

    #[error("object not found: {uri}")]
    NotFound { uri: String },

    /// The request never produced an HTTP status (connect, timeout, body I/O).
    #[error("transport error for {uri}: {source}")]
    Transport {
        uri: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unexpected response to {method} {uri}: {status} {response}")]
    UnexpectedStatus {
        method: Method,
        uri: String,
        status: u16,
        response: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured timeout is negative, NaN, or too large to represent.
    #[error("Invalid timeout: {seconds} seconds")]
    InvalidTimeout { seconds: f64 },

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn transport(
        uri: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Transport {
            uri: uri.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True when the underlying transport gave up because a timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport { source, .. } => source
                .downcast_ref::<reqwest::Error>()
                .map(reqwest::Error::is_timeout)
                .unwrap_or(false),
            Error::Client(e) => e.is_timeout(),
            _ => false,
        }
    }
}
