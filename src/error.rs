//! Error types for ringcell.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RingCellError>;

#[derive(Error, Debug)]
pub enum RingCellError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl RingCellError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
