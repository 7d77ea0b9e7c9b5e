use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The upstream page answered with a non-success status.
    #[error("Failed to fetch {url}: upstream returned {status}")]
    Fetch { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for failures of the outbound request itself, as opposed to
    /// misconfiguration.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
