//! Error types raised by repository implementations.

use battle_core::{BattleId, PartyId};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    BattleNotFound(BattleId),

    #[error("{0} is already stored")]
    DuplicateBattle(BattleId),

    #[error("rewards target unknown {0}")]
    UnknownParty(PartyId),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
