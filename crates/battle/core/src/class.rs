//! Character classes, their resource pools and passive hooks.
//!
//! The engine only sees classes through [`ClassOracle`]. Concrete numbers
//! (base stats, abilities, passives) live in `battle-content`.
use crate::ability::AbilityDef;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterClass {
    // Martial
    Warrior,
    Berserker,
    Rogue,
    Marksman,
    // Caster
    Mage,
    Cleric,
    Warlock,
    Druid,
    // Gish
    Paladin,
    Spellblade,
    DarkKnight,
    Bard,
}

impl CharacterClass {
    pub const ALL: [Self; 12] = [
        Self::Warrior,
        Self::Berserker,
        Self::Rogue,
        Self::Marksman,
        Self::Mage,
        Self::Cleric,
        Self::Warlock,
        Self::Druid,
        Self::Paladin,
        Self::Spellblade,
        Self::DarkKnight,
        Self::Bard,
    ];

    pub const fn archetype(self) -> Archetype {
        match self {
            Self::Warrior | Self::Berserker | Self::Rogue | Self::Marksman => Archetype::Martial,
            Self::Mage | Self::Cleric | Self::Warlock | Self::Druid => Archetype::Caster,
            Self::Paladin | Self::Spellblade | Self::DarkKnight | Self::Bard => Archetype::Gish,
        }
    }

    pub const fn uses(self, resource: ResourceKind) -> bool {
        match resource {
            ResourceKind::Stamina => self.archetype().uses_stamina(),
            ResourceKind::Mana => self.archetype().uses_mana(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Archetype {
    /// Stamina only.
    Martial,
    /// Mana only.
    Caster,
    /// Stamina and mana.
    Gish,
}

impl Archetype {
    pub const fn uses_stamina(self) -> bool {
        matches!(self, Self::Martial | Self::Gish)
    }

    pub const fn uses_mana(self) -> bool {
        matches!(self, Self::Caster | Self::Gish)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResourceKind {
    Stamina,
    Mana,
}

/// HP, stamina and mana maximums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    pub hp: u32,
    pub stamina: u32,
    pub mana: u32,
}

impl ResourcePool {
    pub const fn new(hp: u32, stamina: u32, mana: u32) -> Self {
        Self { hp, stamina, mana }
    }
}

/// Where in the resolution pipeline a passive hook fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HookPoint {
    StatDerivation,
    DamageDealt,
    DebuffApplied,
    Heal,
    DamageTaken,
    Recovery,
    Victory,
}

/// A class passive expressed as data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PassiveHook {
    MaxHpBonus { percent: u32 },
    CritChanceBonus { percent: u32 },
    /// `percent` more damage per full 10% of HP missing.
    MissingHpDamageBonus { percent: u32 },
    MarkedTargetDamageBonus { percent: u32 },
    LifestealBonus { percent: u32 },
    /// Share of damage dealt returned as mana, rounded up.
    ManaFromDamage { percent: u32 },
    /// Curses also poison the target.
    PoisonOnCurse { sides: u32, turns: u32 },
    HealingBonus { percent: u32 },
    /// Less damage taken while below `below_percent` of max HP.
    LowHealthMitigation { percent: u32, below_percent: u32 },
    /// Attackers take `per_level` x level damage.
    Thorns { per_level: u32 },
    RecoveryMultiplier { resource: ResourceKind, factor: u32 },
    GoldBonus { percent: u32 },
}

impl PassiveHook {
    pub const fn point(&self) -> HookPoint {
        match self {
            Self::MaxHpBonus { .. } => HookPoint::StatDerivation,
            Self::CritChanceBonus { .. }
            | Self::MissingHpDamageBonus { .. }
            | Self::MarkedTargetDamageBonus { .. }
            | Self::LifestealBonus { .. }
            | Self::ManaFromDamage { .. } => HookPoint::DamageDealt,
            Self::PoisonOnCurse { .. } => HookPoint::DebuffApplied,
            Self::HealingBonus { .. } => HookPoint::Heal,
            Self::LowHealthMitigation { .. } | Self::Thorns { .. } => HookPoint::DamageTaken,
            Self::RecoveryMultiplier { .. } => HookPoint::Recovery,
            Self::GoldBonus { .. } => HookPoint::Victory,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassPassive {
    pub name: String,
    pub description: String,
    pub hooks: Vec<PassiveHook>,
}

/// Everything the engine needs to know about one class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassProfile {
    pub class: CharacterClass,
    pub base: ResourcePool,
    pub per_level: ResourcePool,
    pub passive: ClassPassive,
    pub abilities: Vec<AbilityDef>,
}

impl ClassProfile {
    /// Maximums at `level`, including stat-derivation passives.
    pub fn stats_at_level(&self, level: u32) -> ResourcePool {
        let gained = level.saturating_sub(1);
        let mut hp = self.base.hp + self.per_level.hp * gained;
        for hook in &self.passive.hooks {
            if let PassiveHook::MaxHpBonus { percent } = hook {
                hp = hp * (100 + percent) / 100;
            }
        }
        ResourcePool {
            hp,
            stamina: self.base.stamina + self.per_level.stamina * gained,
            mana: self.base.mana + self.per_level.mana * gained,
        }
    }

    pub fn abilities_at_level(&self, level: u32) -> impl Iterator<Item = &AbilityDef> {
        self.abilities
            .iter()
            .filter(move |ability| ability.unlock_level <= level)
    }

    /// Looks up an ability by name, only if unlocked at `level`.
    pub fn unlocked_ability(&self, name: &str, level: u32) -> Option<&AbilityDef> {
        self.abilities_at_level(level)
            .find(|ability| ability.name.eq_ignore_ascii_case(name))
    }

    pub fn hooks_at(&self, point: HookPoint) -> impl Iterator<Item = &PassiveHook> {
        self.passive
            .hooks
            .iter()
            .filter(move |hook| hook.point() == point)
    }
}

/// Read-only class catalog consulted by the engine.
pub trait ClassOracle: Send + Sync {
    fn profile(&self, class: CharacterClass) -> Option<&ClassProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> ClassProfile {
        ClassProfile {
            class: CharacterClass::Warrior,
            base: ResourcePool::new(60, 40, 0),
            per_level: ResourcePool::new(8, 3, 0),
            passive: ClassPassive {
                name: "Resilient".into(),
                description: "+10% max HP".into(),
                hooks: vec![PassiveHook::MaxHpBonus { percent: 10 }],
            },
            abilities: vec![
                AbilityDef::new("Slash", 1, 10, ResourceKind::Stamina),
                AbilityDef::new("Bladestorm", 10, 35, ResourceKind::Stamina),
            ],
        }
    }

    #[test]
    fn stats_apply_level_gains_and_hp_bonus() {
        let stats = warrior().stats_at_level(3);
        // (60 + 16) * 1.1 = 83.6
        assert_eq!(stats.hp, 83);
        assert_eq!(stats.stamina, 46);
        assert_eq!(stats.mana, 0);
    }

    #[test]
    fn abilities_unlock_by_level() {
        let profile = warrior();
        assert_eq!(profile.abilities_at_level(9).count(), 1);
        assert!(profile.unlocked_ability("bladestorm", 9).is_none());
        assert!(profile.unlocked_ability("Bladestorm", 10).is_some());
    }

    #[test]
    fn archetypes_decide_resources() {
        assert!(CharacterClass::Warrior.uses(ResourceKind::Stamina));
        assert!(!CharacterClass::Mage.uses(ResourceKind::Stamina));
        assert!(CharacterClass::Bard.uses(ResourceKind::Mana));
        assert!(CharacterClass::Bard.uses(ResourceKind::Stamina));
    }

    #[test]
    fn hooks_are_grouped_by_point() {
        assert_eq!(PassiveHook::Thorns { per_level: 2 }.point(), HookPoint::DamageTaken);
        assert_eq!(
            warrior().hooks_at(HookPoint::StatDerivation).count(),
            1
        );
    }
}
