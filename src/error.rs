// src/error.rs
//! Error types for the GPS uplink

use std::fmt;

pub type Result<T> = std::result::Result<T, UplinkError>;

#[derive(Debug)]
pub enum UplinkError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Connection(String),
    Parse(String),
    /// The feature store answered the request with a non-success status.
    Rejected { status: u16, body: String },
    Other(String),
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplinkError::Io(e) => write!(f, "IO error: {}", e),
            UplinkError::Serial(e) => write!(f, "Serial error: {}", e),
            UplinkError::Json(e) => write!(f, "JSON error: {}", e),
            UplinkError::Http(e) => write!(f, "HTTP error: {}", e),
            UplinkError::Connection(msg) => write!(f, "Connection error: {}", msg),
            UplinkError::Parse(msg) => write!(f, "Parse error: {}", msg),
            UplinkError::Rejected { status, body } => {
                write!(f, "Upload rejected (HTTP {}): {}", status, body)
            }
            UplinkError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for UplinkError {}

impl UplinkError {
    /// Whether the pipeline may keep running after this error.
    ///
    /// Parse failures and upload failures (transport or rejected) affect a
    /// single sentence; losing the serial source does not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            UplinkError::Http(_)
                | UplinkError::Connection(_)
                | UplinkError::Parse(_)
                | UplinkError::Rejected { .. }
        )
    }
}

impl From<std::io::Error> for UplinkError {
    fn from(error: std::io::Error) -> Self {
        UplinkError::Io(error)
    }
}

impl From<tokio_serial::Error> for UplinkError {
    fn from(error: tokio_serial::Error) -> Self {
        UplinkError::Serial(error)
    }
}

impl From<serde_json::Error> for UplinkError {
    fn from(error: serde_json::Error) -> Self {
        UplinkError::Json(error)
    }
}

impl From<reqwest::Error> for UplinkError {
    fn from(error: reqwest::Error) -> Self {
        UplinkError::Http(error)
    }
}
