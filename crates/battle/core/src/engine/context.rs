//! Shared state and helpers for one action's resolution.
use crate::ability::DebuffSpec;
use crate::class::{ClassProfile, PassiveHook};
use crate::dice::{DiceSpec, RngOracle};
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, Combatant, EnemyId};
use crate::state::{Battle, Participant};
use crate::status::EffectSpec;

use super::{ActionError, BattleEnv};

/// `floor(amount * factor)`.
pub(super) fn scale(amount: u32, factor: f64) -> u32 {
    // `as` saturates: negative factors floor to 0.
    (f64::from(amount) * factor).floor() as u32
}

/// `ceil(amount * percent / 100)`.
pub(super) fn percent_ceil(amount: u32, percent: u32) -> u32 {
    let value = (u64::from(amount) * u64::from(percent)).div_ceil(100);
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `floor(amount * percent / 100)`.
pub(super) fn percent_floor(amount: u32, percent: u32) -> u32 {
    let value = u64::from(amount) * u64::from(percent) / 100;
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub(super) struct Resolution<'a, 'r> {
    pub battle: &'a mut Battle,
    pub env: BattleEnv<'a>,
    pub rng: &'r mut dyn RngOracle,
    events: Vec<BattleEvent>,
    /// Enemies that crossed a phase threshold since the last drain.
    phased: Vec<EnemyId>,
}

impl<'a, 'r> Resolution<'a, 'r> {
    pub fn new(battle: &'a mut Battle, env: BattleEnv<'a>, rng: &'r mut dyn RngOracle) -> Self {
        Self {
            battle,
            env,
            rng,
            events: Vec::new(),
            phased: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn finish(self) -> Vec<BattleEvent> {
        self.events
    }

    pub fn profile(&self, class: crate::class::CharacterClass) -> Result<&'a ClassProfile, ActionError> {
        let classes = self.env.classes;
        classes
            .profile(class)
            .ok_or(ActionError::UnknownClass(class))
    }

    /// Passive hooks of a participant's class.
    pub fn hooks_of(&self, id: CharacterId) -> Result<&'a [PassiveHook], ActionError> {
        let participant = self
            .battle
            .participant(id)
            .ok_or(ActionError::CharacterNotInBattle(id))?;
        let profile = self.profile(participant.character.class)?;
        Ok(&profile.passive.hooks)
    }

    /// The participant behind an action, who must be alive.
    pub fn acting_participant(&self, id: CharacterId) -> Result<&Participant, ActionError> {
        let participant = self
            .battle
            .participant(id)
            .ok_or(ActionError::CharacterNotInBattle(id))?;
        if !participant.is_alive() {
            return Err(ActionError::CharacterDefeated(id));
        }
        Ok(participant)
    }

    /// A living enemy to aim at.
    pub fn living_enemy(&self, id: EnemyId) -> Result<(), ActionError> {
        let enemy = self
            .battle
            .enemy(id)
            .ok_or(ActionError::EnemyNotFound(id))?;
        if !enemy.is_alive() {
            return Err(ActionError::EnemyDefeated(id));
        }
        Ok(())
    }

    /// Damages an enemy, emitting phase messages for every threshold crossed.
    /// Returns true if this hit defeated it.
    pub fn damage_enemy(&mut self, id: EnemyId, amount: u32) -> bool {
        let Some(enemy) = self.battle.enemy_mut(id) else {
            return false;
        };
        let was_alive = enemy.is_alive();
        let shifts = enemy.take_damage(amount);
        let defeated = was_alive && !enemy.is_alive();
        if !shifts.is_empty() && !self.phased.contains(&id) {
            self.phased.push(id);
        }
        for shift in shifts {
            self.emit(BattleEvent::new(EventKind::Phase, id, shift.message));
        }
        defeated
    }

    /// Enemies that changed phase since the last call.
    pub fn drain_phased(&mut self) -> Vec<EnemyId> {
        std::mem::take(&mut self.phased)
    }

    /// Attaches a harmful effect and logs it.
    pub fn apply_debuff(
        &mut self,
        source: Combatant,
        target: Combatant,
        debuff: &DebuffSpec,
        poison_dice: u32,
    ) {
        let spec = EffectSpec::new(debuff.kind(), source, target, debuff.turns());
        let name = self.battle.name_of(target).to_owned();
        let (spec, message) = match *debuff {
            DebuffSpec::Burn { dice, turns } => (
                spec.with_dice(dice),
                format!("{name} is burning for {turns} turns"),
            ),
            DebuffSpec::Poison { sides, turns } => (
                spec.with_dice(DiceSpec::new(poison_dice, sides)),
                format!("{name} is poisoned for {turns} turns"),
            ),
            DebuffSpec::Slow { turns } => (spec, format!("{name} is slowed for {turns} turns")),
            DebuffSpec::Blind { chance, turns } => (
                spec.with_value(chance),
                format!("{name} is blinded for {turns} turns"),
            ),
            DebuffSpec::Weaken { percent, turns } => (
                spec.with_value(percent),
                format!("{name} deals {percent}% less damage for {turns} turns"),
            ),
            DebuffSpec::HuntersMark { percent, turns } => (
                spec.with_value(percent),
                format!("{name} is marked! The party deals {percent}% more damage to it for {turns} turns"),
            ),
            DebuffSpec::Vulnerability { percent, turns } => (
                spec.with_value(percent),
                format!("{name} takes {percent}% more damage for {turns} turns"),
            ),
        };
        let kind = spec.kind;
        self.battle.effects.apply(spec);
        self.emit(
            BattleEvent::new(EventKind::Effect, source, message)
                .target(target)
                .effect(kind),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_floors() {
        assert_eq!(scale(10, 1.25), 12);
        assert_eq!(scale(7, 0.75), 5);
        assert_eq!(scale(9, -1.0), 0);
    }

    #[test]
    fn percent_rounding() {
        assert_eq!(percent_ceil(7, 20), 2);
        assert_eq!(percent_ceil(10, 20), 2);
        assert_eq!(percent_ceil(0, 50), 0);
        assert_eq!(percent_floor(7, 50), 3);
    }
}
