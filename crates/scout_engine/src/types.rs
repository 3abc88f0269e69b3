use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub kind: SourceFailure,
    pub message: String,
}

impl SourceError {
    pub(crate) fn new(kind: SourceFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SourceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    /// The scrape service answered with `success: false`.
    Unsuccessful,
    MalformedPayload,
    /// The payload was well formed but held no listings.
    Empty,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFailure::InvalidUrl => write!(f, "invalid url"),
            SourceFailure::HttpStatus(code) => write!(f, "http status {code}"),
            SourceFailure::Timeout => write!(f, "timeout"),
            SourceFailure::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            SourceFailure::Network => write!(f, "network error"),
            SourceFailure::Unsuccessful => write!(f, "scrape unsuccessful"),
            SourceFailure::MalformedPayload => write!(f, "malformed payload"),
            SourceFailure::Empty => write!(f, "no listings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("no webhook configured")]
    NotConfigured,
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("webhook rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
