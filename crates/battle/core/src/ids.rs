//! Identifier newtypes shared by the engine and its collaborators.
use core::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a persisted battle.
    BattleId,
    "battle"
);
numeric_id!(
    /// Identifier of a player character.
    CharacterId,
    "char"
);
numeric_id!(
    /// Identifier of an enemy instance. Unique per spawn within a battle.
    EnemyId,
    "enemy"
);
numeric_id!(
    /// Identifier of a party.
    PartyId,
    "party"
);
numeric_id!(
    /// Identifier of a dungeon run the battle belongs to.
    RunId,
    "run"
);
numeric_id!(
    /// Identifier of a status effect. Allocated by the battle's effect list.
    EffectId,
    "effect"
);

/// A single combatant on either side of the battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combatant {
    Character(CharacterId),
    Enemy(EnemyId),
}

impl Combatant {
    pub const fn is_enemy(self) -> bool {
        matches!(self, Self::Enemy(_))
    }

    pub const fn as_character(self) -> Option<CharacterId> {
        match self {
            Self::Character(id) => Some(id),
            Self::Enemy(_) => None,
        }
    }

    pub const fn as_enemy(self) -> Option<EnemyId> {
        match self {
            Self::Enemy(id) => Some(id),
            Self::Character(_) => None,
        }
    }
}

impl From<CharacterId> for Combatant {
    fn from(id: CharacterId) -> Self {
        Self::Character(id)
    }
}

impl From<EnemyId> for Combatant {
    fn from(id: EnemyId) -> Self {
        Self::Enemy(id)
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(id) => id.fmt(f),
            Self::Enemy(id) => id.fmt(f),
        }
    }
}

/// Who a status effect is attached to.
///
/// `Party` effects apply to every participant at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTarget {
    Character(CharacterId),
    Enemy(EnemyId),
    Party,
}

impl From<Combatant> for EffectTarget {
    fn from(combatant: Combatant) -> Self {
        match combatant {
            Combatant::Character(id) => Self::Character(id),
            Combatant::Enemy(id) => Self::Enemy(id),
        }
    }
}

impl From<CharacterId> for EffectTarget {
    fn from(id: CharacterId) -> Self {
        Self::Character(id)
    }
}

impl From<EnemyId> for EffectTarget {
    fn from(id: EnemyId) -> Self {
        Self::Enemy(id)
    }
}

/// Who created a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSource {
    Character(CharacterId),
    Enemy(EnemyId),
    /// Pre-battle blessing bought outside of combat.
    Blessing,
}

impl From<Combatant> for EffectSource {
    fn from(combatant: Combatant) -> Self {
        match combatant {
            Combatant::Character(id) => Self::Character(id),
            Combatant::Enemy(id) => Self::Enemy(id),
        }
    }
}

impl From<CharacterId> for EffectSource {
    fn from(id: CharacterId) -> Self {
        Self::Character(id)
    }
}

impl From<EnemyId> for EffectSource {
    fn from(id: EnemyId) -> Self {
        Self::Enemy(id)
    }
}
