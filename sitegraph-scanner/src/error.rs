use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    StatusError { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid link selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
