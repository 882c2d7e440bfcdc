//! Battle events: the externally visible narrative of each action.
use crate::ids::Combatant;
use crate::status::StatusEffectKind;

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
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    Ability,
    Attack,
    Heal,
    Lifesteal,
    ManaGain,
    Recoil,
    Recovery,
    Toggle,
    Effect,
    Dot,
    EnemyAttack,
    EnemyAbility,
    Miss,
    Dodge,
    Parry,
    Shield,
    Thorns,
    Phase,
    Reward,
}

/// One immutable entry of the battle log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEvent {
    pub kind: EventKind,
    pub actor: Combatant,
    pub target: Option<Combatant>,
    pub ability: Option<String>,
    pub damage: Option<u32>,
    pub healing: Option<u32>,
    pub resource_restored: Option<u32>,
    pub effect_applied: Option<StatusEffectKind>,
    pub message: String,
}

impl BattleEvent {
    pub fn new(kind: EventKind, actor: impl Into<Combatant>, message: impl Into<String>) -> Self {
        Self {
            kind,
            actor: actor.into(),
            target: None,
            ability: None,
            damage: None,
            healing: None,
            resource_restored: None,
            effect_applied: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<Combatant>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn ability(mut self, name: impl Into<String>) -> Self {
        self.ability = Some(name.into());
        self
    }

    #[must_use]
    pub fn damage(mut self, amount: u32) -> Self {
        self.damage = Some(amount);
        self
    }

    #[must_use]
    pub fn healing(mut self, amount: u32) -> Self {
        self.healing = Some(amount);
        self
    }

    #[must_use]
    pub fn restored(mut self, amount: u32) -> Self {
        self.resource_restored = Some(amount);
        self
    }

    #[must_use]
    pub fn effect(mut self, kind: StatusEffectKind) -> Self {
        self.effect_applied = Some(kind);
        self
    }
}
