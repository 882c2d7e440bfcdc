//! Errors surfaced while validating or resolving a player action.
use crate::class::{CharacterClass, ResourceKind};
use crate::error::{BattleError, ErrorSeverity};
use crate::ids::{CharacterId, EnemyId};

/// Why an action was rejected. No battle state changes when one is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("battle is already finished")]
    BattleFinished,

    #[error("character {0} is not part of this battle")]
    CharacterNotInBattle(CharacterId),

    #[error("character {0} is defeated and cannot act")]
    CharacterDefeated(CharacterId),

    #[error("ability '{ability}' is not available at level {level}")]
    AbilityUnavailable { ability: String, level: u32 },

    #[error("character {0} cannot use abilities this round")]
    AbilityLockedOut(CharacterId),

    #[error("not enough {resource} (need {needed}, have {available})")]
    InsufficientResource {
        resource: ResourceKind,
        needed: u32,
        available: u32,
    },

    #[error("ability '{0}' needs an enemy target")]
    TargetRequired(String),

    #[error("enemy {0} not found")]
    EnemyNotFound(EnemyId),

    #[error("enemy {0} is already defeated")]
    EnemyDefeated(EnemyId),

    #[error("ally {0} not found")]
    AllyNotFound(CharacterId),

    #[error("ally {0} is already defeated")]
    AllyDefeated(CharacterId),

    #[error("{class} cannot recover {resource}")]
    RecoveryUnavailable {
        class: CharacterClass,
        resource: ResourceKind,
    },

    #[error("class {0} is missing from the class catalog")]
    UnknownClass(CharacterClass),
}

impl BattleError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AbilityLockedOut(_) => ErrorSeverity::Recoverable,
            Self::UnknownClass(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleFinished => "BATTLE_FINISHED",
            Self::CharacterNotInBattle(_) => "CHARACTER_NOT_IN_BATTLE",
            Self::CharacterDefeated(_) => "CHARACTER_DEFEATED",
            Self::AbilityUnavailable { .. } => "ABILITY_UNAVAILABLE",
            Self::AbilityLockedOut(_) => "ABILITY_LOCKED_OUT",
            Self::InsufficientResource { .. } => "INSUFFICIENT_RESOURCE",
            Self::TargetRequired(_) => "TARGET_REQUIRED",
            Self::EnemyNotFound(_) => "ENEMY_NOT_FOUND",
            Self::EnemyDefeated(_) => "ENEMY_DEFEATED",
            Self::AllyNotFound(_) => "ALLY_NOT_FOUND",
            Self::AllyDefeated(_) => "ALLY_DEFEATED",
            Self::RecoveryUnavailable { .. } => "RECOVERY_UNAVAILABLE",
            Self::UnknownClass(_) => "UNKNOWN_CLASS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_reads_naturally() {
        let err = ActionError::InsufficientResource {
            resource: ResourceKind::Mana,
            needed: 25,
            available: 10,
        };
        assert_eq!(err.to_string(), "not enough mana (need 25, have 10)");
        assert_eq!(err.error_code(), "INSUFFICIENT_RESOURCE");
    }

    #[test]
    fn missing_class_is_internal() {
        assert!(
            ActionError::UnknownClass(CharacterClass::Bard)
                .severity()
                .is_internal()
        );
        assert!(ActionError::AbilityLockedOut(CharacterId(1)).is_recoverable());
    }
}
