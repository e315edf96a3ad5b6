//! Error handling for the quill wallet console

use thiserror::Error;

pub type QuillResult<T> = Result<T, QuillError>;

#[derive(Error, Debug, Clone)]
pub enum QuillError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Address error: {0}")]
    Address(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A contract the UI boundary should have enforced was violated.
    /// Unrecoverable, unlike every user-input error above.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for QuillError {
    fn from(err: std::io::Error) -> Self {
        QuillError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        QuillError::Storage(format!("JSON error: {}", err))
    }
}
