//! Player ability definitions.
//!
//! An ability is a name, a cost and an ordered list of [`AbilityEffect`]s.
//! The resolver walks the list in a fixed order (see
//! [`engine::ability`](crate::engine)), so the order effects are declared in
//! does not matter.
use crate::class::ResourceKind;
use crate::dice::DiceSpec;
use crate::status::StatusEffectKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityCost {
    pub amount: u32,
    pub resource: ResourceKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDef {
    pub name: String,
    pub unlock_level: u32,
    pub cost: AbilityCost,
    pub description: String,
    pub effects: Vec<AbilityEffect>,
}

/// One thing an ability does.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityEffect {
    Strike(StrikeSpec),
    /// Heals the chosen ally, or the caster when no ally is given.
    Heal(DiceSpec),
    /// Damage the caster takes after resolving the ability.
    Recoil(DiceSpec),
    Debuff(DebuffSpec),
    SelfBuff(SelfBuffSpec),
    PartyBuff(PartyBuffSpec),
    /// Switches a persistent effect on the caster on or off. Skips every
    /// other effect of the ability.
    Toggle { kind: StatusEffectKind, value: u32 },
    /// The caster cannot use abilities again until the round closes.
    LockoutThisRound,
    /// Refund part of the cost when the strike defeats its target.
    RefundOnKill { percent: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeSpec {
    pub dice: DiceSpec,
    /// Hits every living enemy with a single roll.
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: bool,
    /// Critical hit chance in percent. Single target only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_chance: u32,
    /// Double damage against a target at full HP. Single target only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_crit_if_full_hp: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repeat: Repeat,
    /// Bonus dice rolled once per living ally (caster excluded).
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_per_ally: Option<DiceSpec>,
    /// Share of damage dealt healed back.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lifesteal_percent: u32,
}

impl StrikeSpec {
    pub const fn new(dice: DiceSpec) -> Self {
        Self {
            dice,
            area: false,
            crit_chance: 0,
            auto_crit_if_full_hp: false,
            repeat: Repeat::Once,
            extra_per_ally: None,
            lifesteal_percent: 0,
        }
    }

    #[must_use]
    pub const fn area(mut self) -> Self {
        self.area = true;
        self
    }

    #[must_use]
    pub const fn crit(mut self, chance: u32) -> Self {
        self.crit_chance = chance;
        self
    }

    #[must_use]
    pub const fn auto_crit_if_full_hp(mut self) -> Self {
        self.auto_crit_if_full_hp = true;
        self
    }

    #[must_use]
    pub const fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    #[must_use]
    pub const fn extra_per_ally(mut self, dice: DiceSpec) -> Self {
        self.extra_per_ally = Some(dice);
        self
    }

    #[must_use]
    pub const fn lifesteal(mut self, percent: u32) -> Self {
        self.lifesteal_percent = percent;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Repeat {
    #[default]
    Once,
    /// A second independent roll, single target only.
    Twice,
    /// Double damage against targets carrying a hunter's mark.
    TwiceIfMarked,
}

/// Harmful effect placed on enemies (or, from enemy abilities, on characters).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DebuffSpec {
    Burn { dice: DiceSpec, turns: u32 },
    /// Dice count scales with the caster's level.
    Poison { sides: u32, turns: u32 },
    Slow { turns: u32 },
    Blind { chance: u32, turns: u32 },
    /// Reduces the target's outgoing damage.
    Weaken { percent: u32, turns: u32 },
    HuntersMark { percent: u32, turns: u32 },
    Vulnerability { percent: u32, turns: u32 },
}

impl DebuffSpec {
    pub const fn kind(&self) -> StatusEffectKind {
        match self {
            Self::Burn { .. } => StatusEffectKind::Burn,
            Self::Poison { .. } => StatusEffectKind::Poison,
            Self::Slow { .. } => StatusEffectKind::Slow,
            Self::Blind { .. } => StatusEffectKind::Blind,
            Self::Weaken { .. } => StatusEffectKind::BossDamageReduction,
            Self::HuntersMark { .. } => StatusEffectKind::HuntersMark,
            Self::Vulnerability { .. } => StatusEffectKind::Vulnerability,
        }
    }

    pub const fn turns(&self) -> u32 {
        match *self {
            Self::Burn { turns, .. }
            | Self::Poison { turns, .. }
            | Self::Slow { turns }
            | Self::Blind { turns, .. }
            | Self::Weaken { turns, .. }
            | Self::HuntersMark { turns, .. }
            | Self::Vulnerability { turns, .. } => turns,
        }
    }

    /// Curses hinder the target rather than damage it over time.
    pub const fn is_curse(&self) -> bool {
        matches!(
            self,
            Self::Slow { .. } | Self::Blind { .. } | Self::Weaken { .. } | Self::Vulnerability { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelfBuffSpec {
    DamageBuff { percent: u32, turns: u32 },
    /// Reduces the next hit taken by `reduction`%.
    ShieldUntilHit { reduction: u32 },
    /// Caps the next hit at `max_per_level` x level; `reflect_percent` of
    /// the blocked excess hits the attacker.
    Parry { max_per_level: u32, reflect_percent: u32 },
    Haste,
    /// Damage over time on the caster.
    Weakness { dice: DiceSpec, turns: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PartyBuffSpec {
    DamageBuff { percent: u32, turns: u32 },
    Evasion { percent: u32, turns: u32 },
}

impl AbilityDef {
    pub fn new(
        name: impl Into<String>,
        unlock_level: u32,
        amount: u32,
        resource: ResourceKind,
    ) -> Self {
        Self {
            name: name.into(),
            unlock_level,
            cost: AbilityCost { amount, resource },
            description: String::new(),
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with(mut self, effect: AbilityEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn strike(&self) -> Option<&StrikeSpec> {
        self.effects.iter().find_map(|effect| match effect {
            AbilityEffect::Strike(strike) => Some(strike),
            _ => None,
        })
    }

    pub fn heal(&self) -> Option<DiceSpec> {
        self.effects.iter().find_map(|effect| match effect {
            AbilityEffect::Heal(dice) => Some(*dice),
            _ => None,
        })
    }

    pub fn toggle(&self) -> Option<(StatusEffectKind, u32)> {
        self.effects.iter().find_map(|effect| match effect {
            AbilityEffect::Toggle { kind, value } => Some((*kind, *value)),
            _ => None,
        })
    }

    pub fn debuffs(&self) -> impl Iterator<Item = &DebuffSpec> {
        self.effects.iter().filter_map(|effect| match effect {
            AbilityEffect::Debuff(debuff) => Some(debuff),
            _ => None,
        })
    }

    pub fn is_area(&self) -> bool {
        self.strike().is_some_and(|strike| strike.area)
    }

    /// Strikes and debuffs need an enemy to aim at.
    pub fn needs_enemy_target(&self) -> bool {
        self.toggle().is_none() && (self.strike().is_some() || self.debuffs().next().is_some())
    }

    pub fn has(&self, wanted: &AbilityEffect) -> bool {
        self.effects.iter().any(|effect| effect == wanted)
    }
}
