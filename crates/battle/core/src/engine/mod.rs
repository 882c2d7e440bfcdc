//! Action execution pipeline.
//!
//! The [`BattleEngine`] is the only way to mutate a [`Battle`]. Each call to
//! [`BattleEngine::execute`] runs one player action through:
//!
//! validate → resolve → mark acted → close round (if ready) → settle → reward
//!
//! Everything runs against a working copy that replaces the battle only when
//! the whole pipeline succeeds, so a rejected action leaves no trace.
mod ability;
mod attack;
mod context;
mod errors;
mod mitigation;
mod retaliation;
mod reward;
mod round;

pub use errors::ActionError;
pub use mitigation::MitigationStage;
pub use reward::{Rewards, calculate_rewards};

use crate::class::{ClassOracle, ResourceKind};
use crate::config::BattleConfig;
use crate::dice::RngOracle;
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, EnemyId};
use crate::state::Battle;

use context::Resolution;

/// Read-only collaborators of one action.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub classes: &'a dyn ClassOracle,
    pub config: &'a BattleConfig,
    /// Area index of the run the battle belongs to, for reward scaling.
    pub area: Option<usize>,
}

impl<'a> BattleEnv<'a> {
    pub fn new(classes: &'a dyn ClassOracle, config: &'a BattleConfig) -> Self {
        Self {
            classes,
            config,
            area: None,
        }
    }

    #[must_use]
    pub fn in_area(mut self, area: Option<usize>) -> Self {
        self.area = area;
        self
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
pub enum RecoveryKind {
    /// Recovers stamina.
    Rest,
    /// Recovers mana.
    Meditate,
}

impl RecoveryKind {
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Rest => ResourceKind::Stamina,
            Self::Meditate => ResourceKind::Mana,
        }
    }
}

/// A player command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerAction {
    UseAbility {
        actor: CharacterId,
        ability: String,
        target_enemy: Option<EnemyId>,
        target_ally: Option<CharacterId>,
    },
    BasicAttack {
        actor: CharacterId,
        target: EnemyId,
    },
    Recover {
        actor: CharacterId,
        kind: RecoveryKind,
    },
}

impl PlayerAction {
    pub fn actor(&self) -> CharacterId {
        match self {
            Self::UseAbility { actor, .. }
            | Self::BasicAttack { actor, .. }
            | Self::Recover { actor, .. } => *actor,
        }
    }
}

/// Result of a committed action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    /// Events appended to the battle log by this action, in order.
    pub events: Vec<BattleEvent>,
    pub round_closed: bool,
    pub finished: bool,
    pub won: bool,
    pub rewards: Option<Rewards>,
}

/// Reducer for [`Battle`].
pub struct BattleEngine<'a> {
    battle: &'a mut Battle,
}

impl<'a> BattleEngine<'a> {
    pub fn new(battle: &'a mut Battle) -> Self {
        Self { battle }
    }

    pub fn execute(
        &mut self,
        env: BattleEnv<'_>,
        rng: &mut dyn RngOracle,
        action: &PlayerAction,
    ) -> Result<ActionOutcome, ActionError> {
        if self.battle.finished {
            return Err(ActionError::BattleFinished);
        }

        let mut working = self.battle.clone();
        let mut ctx = Resolution::new(&mut working, env, rng);
        let actor = action.actor();
        ctx.acting_participant(actor)?;

        match action {
            PlayerAction::UseAbility {
                ability,
                target_enemy,
                target_ally,
                ..
            } => ability::use_ability(&mut ctx, actor, ability, *target_enemy, *target_ally)?,
            PlayerAction::BasicAttack { target, .. } => {
                attack::basic_attack(&mut ctx, actor, *target)?;
            }
            PlayerAction::Recover { kind, .. } => attack::recover(&mut ctx, actor, *kind)?,
        }

        if let Some(participant) = ctx.battle.participant_mut(actor) {
            participant.has_acted = true;
        }
        let round_closed = round::close_round_if_ready(&mut ctx)?;
        round::settle(&mut *ctx.battle);

        let rewards = if ctx.battle.won {
            let rewards = calculate_rewards(&*ctx.battle, &ctx.env, &mut *ctx.rng)?;
            ctx.emit(BattleEvent::new(
                EventKind::Reward,
                actor,
                format!(
                    "Victory! Earned {} XP and {} gold",
                    rewards.xp, rewards.gold
                ),
            ));
            Some(rewards)
        } else {
            None
        };

        let events = ctx.finish();
        working.append_log(events.iter().cloned());
        let outcome = ActionOutcome {
            events,
            round_closed,
            finished: working.finished,
            won: working.won,
            rewards,
        };
        *self.battle = working;
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
