use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session not found")]
    NotFound,

    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
