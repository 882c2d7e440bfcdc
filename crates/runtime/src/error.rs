//! Unified error type surfaced by the runtime.
//!
//! Wraps engine rejections, setup failures and repository failures so callers
//! can route any of them by [`ErrorSeverity`].
use battle_core::{ActionError, BattleError, ErrorSeverity, PartyId, SetupError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0} not found")]
    PartyNotFound(PartyId),

    #[error(transparent)]
    Content(#[from] anyhow::Error),

    #[error("battle service requires a store before building")]
    MissingStore,
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(error) => error.severity(),
            Self::Setup(error) => error.severity(),
            Self::Repository(RepositoryError::BattleNotFound(_)) | Self::PartyNotFound(_) => {
                ErrorSeverity::Validation
            }
            Self::Repository(_) | Self::Content(_) | Self::MissingStore => {
                ErrorSeverity::Internal
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Action(error) => error.error_code(),
            Self::Setup(error) => error.error_code(),
            Self::Repository(RepositoryError::BattleNotFound(_)) => "BATTLE_NOT_FOUND",
            Self::Repository(_) => "STORAGE",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::Content(_) => "CONTENT",
            Self::MissingStore => "MISSING_STORE",
        }
    }

    /// True when the battle may accept the same request later.
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}
