//! Error types for iocsync.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IocsyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected feed format: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid indicator: {0}")]
    InvalidIndicator(String),
}
