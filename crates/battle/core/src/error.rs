//! Common error infrastructure for battle-core.
//!
//! Domain errors ([`ActionError`](crate::engine::ActionError),
//! [`SetupError`](crate::state::SetupError)) live next to the code that
//! raises them and implement [`BattleError`] so callers can route them by
//! severity without matching every variant.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed once the battle moves on
/// - **Validation**: bad input, reject without retry
/// - **Internal**: inconsistent content or state that needs investigation
/// - **Fatal**: battle state is corrupted and must not be persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: ability locked out this round.
    Recoverable,
    /// Examples: unknown ability, defeated target, not enough mana.
    Validation,
    /// Examples: character class missing from the catalog.
    Internal,
    /// Examples: two enemies sharing one id.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common behaviour of every battle error.
pub trait BattleError: core::error::Error {
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, e.g. `"INSUFFICIENT_RESOURCE"`.
    fn error_code(&self) -> &'static str;

    fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}
