use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BillError {
    Database(String),
    Serialization(String),
    Io(String),
    Configuration(String),
    NotFound(String),
    InvalidTimestamp(String),
    InvalidInput(String),
    Notification(String),
}

impl std::fmt::Display for BillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillError::Database(msg) => write!(f, "Database error: {}", msg),
            BillError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            BillError::Io(msg) => write!(f, "File system error: {}", msg),
            BillError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            BillError::NotFound(msg) => write!(f, "Not found: {}", msg),
            BillError::InvalidTimestamp(msg) => write!(f, "Invalid timestamp: {}", msg),
            BillError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            BillError::Notification(msg) => write!(f, "Notification error: {}", msg),
        }
    }
}

impl std::error::Error for BillError {}

impl From<rusqlite::Error> for BillError {
    fn from(err: rusqlite::Error) -> Self {
        BillError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for BillError {
    fn from(err: serde_json::Error) -> Self {
        BillError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BillError {
    fn from(err: std::io::Error) -> Self {
        BillError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BillError>;
