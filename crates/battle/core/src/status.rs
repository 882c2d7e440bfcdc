//! Status effects and the combat modifiers derived from them.
//!
//! Effects live in one flat list per battle. Nothing in here mutates an
//! effect in place: modifier queries are pure folds over the list and
//! [`tick`] returns a fresh list.
use crate::dice::DiceSpec;
use crate::ids::{Combatant, EffectId, EffectSource, EffectTarget};

/// Duration used for effects that stay until something removes them.
pub const UNTIL_REMOVED: u32 = 999;

/// Outgoing damage factor of a slowed combatant.
pub const SLOW_DAMAGE_FACTOR: f64 = 0.75;

/// Incoming damage factor while frenzied.
pub const FRENZY_DAMAGE_TAKEN: f64 = 1.25;

/// Types of status effects.
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
pub enum StatusEffectKind {
    // ========================================================================
    // Damage over time
    // ========================================================================
    Burn,
    Poison,
    /// Self-inflicted damage over time (berserker rage drawback).
    SelfWeakness,

    // ========================================================================
    // Debuffs
    // ========================================================================
    /// Outgoing damage x0.75.
    Slow,
    /// `value`% chance to miss the next attack.
    Blind,
    /// Outgoing damage reduced by `value`%.
    BossDamageReduction,
    /// Incoming damage increased by `value`%.
    HuntersMark,
    /// Incoming damage increased by `value`%.
    Vulnerability,

    // ========================================================================
    // Buffs
    // ========================================================================
    /// Outgoing damage increased by `value`%. Toggled on and off.
    Frenzy,
    SelfDamageBuff,
    PartyDamageBuff,
    /// Next hit reduced by `value`%, then consumed.
    ShieldUntilHit,
    /// Caps the next hit at `value` x level and reflects part of the excess.
    Parry,
    Haste,
    /// `value`% chance for any party member to dodge.
    PartyEvasion,
    /// Incoming damage reduced by `value`% for the whole party.
    PartyDamageReduction,
}

impl StatusEffectKind {
    /// Effects that roll their dice at round close.
    pub const fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Burn | Self::Poison | Self::SelfWeakness)
    }

    /// Label used in damage-over-time log lines.
    pub const fn dot_label(self) -> &'static str {
        match self {
            Self::Burn => "burn",
            Self::Poison => "poison",
            _ => "dark energy",
        }
    }
}

/// A timed modifier attached to a combatant or the whole party.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub id: EffectId,
    pub kind: StatusEffectKind,
    pub source: EffectSource,
    pub target: EffectTarget,
    pub turns_remaining: u32,
    /// Percentage magnitude (damage bonus, miss chance, reduction...).
    pub value: Option<u32>,
    /// Damage-over-time dice.
    pub dice: Option<DiceSpec>,
    /// Share of blocked damage reflected back (parry only).
    pub reflect_percent: Option<u32>,
}

impl StatusEffect {
    pub fn value_or(&self, default: u32) -> u32 {
        self.value.unwrap_or(default)
    }

    pub fn is_on(&self, target: EffectTarget, kind: StatusEffectKind) -> bool {
        self.target == target && self.kind == kind
    }
}

/// Everything needed to create an effect except its id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub kind: StatusEffectKind,
    pub source: EffectSource,
    pub target: EffectTarget,
    pub turns: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dice: Option<DiceSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reflect_percent: Option<u32>,
}

impl EffectSpec {
    pub fn new(
        kind: StatusEffectKind,
        source: impl Into<EffectSource>,
        target: impl Into<EffectTarget>,
        turns: u32,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            turns,
            value: None,
            dice: None,
            reflect_percent: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_dice(mut self, dice: DiceSpec) -> Self {
        self.dice = Some(dice);
        self
    }

    #[must_use]
    pub fn with_reflect(mut self, percent: u32) -> Self {
        self.reflect_percent = Some(percent);
        self
    }
}

/// Hands out effect ids.
pub trait EffectIdSource {
    fn next_effect_id(&mut self) -> EffectId;
}

/// Creates a new effect with a fresh id from `ids`.
pub fn create_effect(ids: &mut impl EffectIdSource, spec: EffectSpec) -> StatusEffect {
    StatusEffect {
        id: ids.next_effect_id(),
        kind: spec.kind,
        source: spec.source,
        target: spec.target,
        turns_remaining: spec.turns,
        value: spec.value,
        dice: spec.dice,
        reflect_percent: spec.reflect_percent,
    }
}

/// Decrements every duration and drops the effects that reach zero.
pub fn tick(effects: &[StatusEffect]) -> Vec<StatusEffect> {
    effects
        .iter()
        .filter(|effect| effect.turns_remaining > 1)
        .map(|effect| StatusEffect {
            turns_remaining: effect.turns_remaining - 1,
            ..effect.clone()
        })
        .collect()
}

fn percent_up(value: u32) -> f64 {
    1.0 + f64::from(value) / 100.0
}

fn percent_down(value: u32) -> f64 {
    1.0 - f64::from(value) / 100.0
}

/// Outgoing damage multiplier from buffs on `actor`.
///
/// Self buffs and frenzy count when they target the actor. Party buffs only
/// count for characters.
pub fn damage_modifier(effects: &[StatusEffect], actor: Combatant) -> f64 {
    let own = EffectTarget::from(actor);
    effects.iter().fold(1.0, |factor, effect| {
        let Some(value) = effect.value else {
            return factor;
        };
        match effect.kind {
            StatusEffectKind::SelfDamageBuff | StatusEffectKind::Frenzy if effect.target == own => {
                factor * percent_up(value)
            }
            StatusEffectKind::PartyDamageBuff
                if effect.target == EffectTarget::Party && !actor.is_enemy() =>
            {
                factor * percent_up(value)
            }
            _ => factor,
        }
    })
}

/// Outgoing damage multiplier from debuffs on `actor`.
pub fn damage_reduction(effects: &[StatusEffect], actor: Combatant) -> f64 {
    let own = EffectTarget::from(actor);
    effects
        .iter()
        .filter(|effect| effect.target == own)
        .fold(1.0, |factor, effect| match (effect.kind, effect.value) {
            (StatusEffectKind::BossDamageReduction, Some(value)) => factor * percent_down(value),
            (StatusEffectKind::Slow, _) => factor * SLOW_DAMAGE_FACTOR,
            _ => factor,
        })
}

/// Incoming damage multiplier from marks on `target`.
pub fn vulnerability_modifier(effects: &[StatusEffect], target: Combatant) -> f64 {
    let own = EffectTarget::from(target);
    effects
        .iter()
        .filter(|effect| effect.target == own)
        .fold(1.0, |factor, effect| match (effect.kind, effect.value) {
            (StatusEffectKind::Vulnerability | StatusEffectKind::HuntersMark, Some(value)) => {
                factor * percent_up(value)
            }
            _ => factor,
        })
}

/// Incoming damage multiplier paid by a frenzied `target`.
pub fn frenzy_damage_taken(effects: &[StatusEffect], target: Combatant) -> f64 {
    if has_effect(effects, target.into(), StatusEffectKind::Frenzy) {
        FRENZY_DAMAGE_TAKEN
    } else {
        1.0
    }
}

pub fn has_effect(effects: &[StatusEffect], target: EffectTarget, kind: StatusEffectKind) -> bool {
    effects.iter().any(|effect| effect.is_on(target, kind))
}

/// The effect list of one battle together with its id counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
    next_id: u64,
}

impl EffectIdSource for StatusEffects {
    fn next_effect_id(&mut self) -> EffectId {
        self.next_id += 1;
        EffectId(self.next_id)
    }
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Creates and stores an effect, returning its id.
    pub fn apply(&mut self, spec: EffectSpec) -> EffectId {
        let effect = create_effect(self, spec);
        let id = effect.id;
        self.effects.push(effect);
        id
    }

    pub fn remove(&mut self, id: EffectId) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|effect| effect.id == id)?;
        Some(self.effects.remove(index))
    }

    /// First effect of `kind` on `target`.
    pub fn find(&self, target: EffectTarget, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.is_on(target, kind))
    }

    pub fn has(&self, target: EffectTarget, kind: StatusEffectKind) -> bool {
        has_effect(&self.effects, target, kind)
    }

    /// Ends a round: every duration ticks down once.
    pub fn tick(&mut self) {
        self.effects = tick(&self.effects);
    }

    /// Damage-over-time effects on `target` that have dice to roll.
    pub fn damage_over_time_on(&self, target: EffectTarget) -> Vec<StatusEffect> {
        self.effects
            .iter()
            .filter(|effect| {
                effect.target == target
                    && effect.kind.is_damage_over_time()
                    && effect.dice.is_some_and(|dice| dice.sides > 0)
            })
            .cloned()
            .collect()
    }

    pub fn damage_modifier(&self, actor: Combatant) -> f64 {
        damage_modifier(&self.effects, actor)
    }

    pub fn damage_reduction(&self, actor: Combatant) -> f64 {
        damage_reduction(&self.effects, actor)
    }

    pub fn vulnerability_modifier(&self, target: Combatant) -> f64 {
        vulnerability_modifier(&self.effects, target)
    }

    pub fn frenzy_damage_taken(&self, target: Combatant) -> f64 {
        frenzy_damage_taken(&self.effects, target)
    }
}
