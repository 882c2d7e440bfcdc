//! Deterministic combat rules for party-vs-enemies battles.
//!
//! `battle-core` owns the battle aggregate, status effects, dice and the
//! action pipeline. It performs no I/O and never logs; randomness comes in
//! through [`RngOracle`] and class data through [`ClassOracle`]. Every
//! mutation of a [`Battle`] flows through [`engine::BattleEngine`].
pub mod ability;
pub mod class;
pub mod config;
pub mod dice;
pub mod enemy;
pub mod engine;
pub mod error;
pub mod event;
pub mod ids;
pub mod state;
pub mod status;

pub use ability::{
    AbilityCost, AbilityDef, AbilityEffect, DebuffSpec, PartyBuffSpec, Repeat, SelfBuffSpec,
    StrikeSpec,
};
pub use class::{
    Archetype, CharacterClass, ClassOracle, ClassPassive, ClassProfile, HookPoint, PassiveHook,
    ResourceKind, ResourcePool,
};
pub use config::{BasicAttackDice, BattleConfig, RewardRules};
pub use dice::{DiceSpec, PcgRng, RngOracle, ScriptedRng, weighted_choice};
pub use enemy::{BossPhase, Enemy, EnemyAbility, EnemyDefinition, PhaseShift, TimedPercent};
pub use engine::{
    ActionError, ActionOutcome, BattleEngine, BattleEnv, MitigationStage, PlayerAction,
    RecoveryKind, Rewards, calculate_rewards,
};
pub use error::{BattleError, ErrorSeverity};
pub use event::{BattleEvent, EventKind};
pub use ids::{
    BattleId, CharacterId, Combatant, EffectId, EffectSource, EffectTarget, EnemyId, PartyId,
    RunId,
};
pub use state::{
    Battle, BattleSetup, CharacterSheet, Participant, ParticipantOverride, SetupError, Toggles,
};
pub use status::{
    EffectIdSource, EffectSpec, StatusEffect, StatusEffectKind, StatusEffects, UNTIL_REMOVED,
};
