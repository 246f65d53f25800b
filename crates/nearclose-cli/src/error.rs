use nearclose_core::{CoreError, LookupError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Export(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Lookup(LookupError::InvalidInput(_)) => 2,
            Self::Lookup(LookupError::DataUnavailable { .. }) => 3,
            Self::Lookup(LookupError::QuoteUnavailable { .. }) => 4,
            Self::Lookup(LookupError::Upstream(_)) => 5,
            Self::Serialization(_) => 6,
            Self::Export(_) | Self::Io(_) => 10,
        }
    }
}
