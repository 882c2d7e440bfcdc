//! Incoming damage pipeline for hits on party members.
//!
//! Every enemy hit walks [`MitigationStage::PIPELINE`] in order. Reordering
//! the stages changes game balance, so the order is data and is tested.
use crate::class::PassiveHook;
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, EffectTarget, EnemyId};
use crate::status::StatusEffectKind;

use super::ActionError;
use super::context::{Resolution, percent_floor, scale};

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
pub enum MitigationStage {
    /// Party-wide dodge chance. A dodge ends the pipeline.
    Evasion,
    /// Caps the hit and reflects part of the excess. Consumed.
    Parry,
    /// One-shot percentage reduction. Consumed.
    Shield,
    /// Party-wide blessing reduction.
    PartyReduction,
    /// Extra damage taken while frenzied.
    FrenzyPenalty,
    /// Low-health class mitigation.
    ClassMitigation,
    /// Flat damage back to the attacker.
    Thorns,
}

impl MitigationStage {
    pub const PIPELINE: [Self; 7] = [
        Self::Evasion,
        Self::Parry,
        Self::Shield,
        Self::PartyReduction,
        Self::FrenzyPenalty,
        Self::ClassMitigation,
        Self::Thorns,
    ];
}

/// An enemy hit about to land on a party member.
pub(super) struct IncomingHit<'n> {
    pub attacker: EnemyId,
    pub target: CharacterId,
    pub ability: &'n str,
    pub damage: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum HitOutcome {
    Dodged,
    Landed(u32),
}

/// Runs the full pipeline. Damage is not applied to the target here.
pub(super) fn mitigate(
    ctx: &mut Resolution<'_, '_>,
    hit: &IncomingHit<'_>,
) -> Result<HitOutcome, ActionError> {
    let mut damage = hit.damage;
    for stage in MitigationStage::PIPELINE {
        match run_stage(ctx, stage, hit, damage)? {
            Some(next) => damage = next,
            None => return Ok(HitOutcome::Dodged),
        }
    }
    Ok(HitOutcome::Landed(damage))
}

/// Returns `None` when the hit is negated entirely.
fn run_stage(
    ctx: &mut Resolution<'_, '_>,
    stage: MitigationStage,
    hit: &IncomingHit<'_>,
    damage: u32,
) -> Result<Option<u32>, ActionError> {
    let own = EffectTarget::Character(hit.target);
    let damage = match stage {
        MitigationStage::Evasion => {
            let chance = ctx
                .battle
                .effects
                .find(EffectTarget::Party, StatusEffectKind::PartyEvasion)
                .and_then(|effect| effect.value)
                .unwrap_or(0);
            if chance > 0 && ctx.rng.chance(chance) {
                let message = format!(
                    "{} dodges {}'s {}!",
                    ctx.battle.name_of(hit.target.into()),
                    ctx.battle.name_of(hit.attacker.into()),
                    hit.ability
                );
                ctx.emit(
                    BattleEvent::new(EventKind::Dodge, hit.target, message)
                        .target(hit.attacker)
                        .ability(hit.ability),
                );
                return Ok(None);
            }
            damage
        }
        MitigationStage::Parry => {
            let Some(parry) = ctx.battle.effects.find(own, StatusEffectKind::Parry).cloned() else {
                return Ok(Some(damage));
            };
            ctx.battle.effects.remove(parry.id);
            let level = ctx
                .battle
                .participant(hit.target)
                .map_or(1, |p| p.character.level);
            let cap = parry.value_or(0).saturating_mul(level);
            let blocked = damage.saturating_sub(cap);
            let reflected = percent_floor(blocked, parry.reflect_percent.unwrap_or(0));
            if reflected > 0 {
                let message = format!(
                    "{} parries {}'s {}! Takes max {cap} damage, reflects {reflected} back",
                    ctx.battle.name_of(hit.target.into()),
                    ctx.battle.name_of(hit.attacker.into()),
                    hit.ability
                );
                ctx.emit(
                    BattleEvent::new(EventKind::Parry, hit.target, message)
                        .target(hit.attacker)
                        .damage(reflected),
                );
                ctx.damage_enemy(hit.attacker, reflected);
            }
            damage.min(cap)
        }
        MitigationStage::Shield => {
            let Some(shield) = ctx
                .battle
                .effects
                .find(own, StatusEffectKind::ShieldUntilHit)
                .cloned()
            else {
                return Ok(Some(damage));
            };
            ctx.battle.effects.remove(shield.id);
            let absorbed = shield.value_or(0).min(100);
            let message = format!(
                "{}'s shield absorbs {absorbed}% of the damage",
                ctx.battle.name_of(hit.target.into())
            );
            ctx.emit(
                BattleEvent::new(EventKind::Shield, hit.target, message)
                    .effect(StatusEffectKind::ShieldUntilHit),
            );
            percent_floor(damage, 100 - absorbed)
        }
        MitigationStage::PartyReduction => ctx
            .battle
            .effects
            .iter()
            .filter(|effect| effect.is_on(EffectTarget::Party, StatusEffectKind::PartyDamageReduction))
            .filter_map(|effect| effect.value)
            .fold(damage, |acc, value| {
                percent_floor(acc, 100u32.saturating_sub(value))
            }),
        MitigationStage::FrenzyPenalty => {
            scale(damage, ctx.battle.effects.frenzy_damage_taken(hit.target.into()))
        }
        MitigationStage::ClassMitigation => {
            let mut damage = damage;
            for hook in ctx.hooks_of(hit.target)? {
                if let PassiveHook::LowHealthMitigation {
                    percent,
                    below_percent,
                } = *hook
                {
                    let hurt = ctx
                        .battle
                        .participant(hit.target)
                        .is_some_and(|p| p.is_below_percent(below_percent));
                    if hurt {
                        damage = percent_floor(damage, 100u32.saturating_sub(percent));
                    }
                }
            }
            damage
        }
        MitigationStage::Thorns => {
            let level = ctx
                .battle
                .participant(hit.target)
                .map_or(1, |p| p.character.level);
            let thorns: u32 = ctx
                .hooks_of(hit.target)?
                .iter()
                .filter_map(|hook| match *hook {
                    PassiveHook::Thorns { per_level } => Some(per_level.saturating_mul(level)),
                    _ => None,
                })
                .sum();
            let attacker_alive = ctx.battle.enemy(hit.attacker).is_some_and(|e| e.is_alive());
            if thorns > 0 && attacker_alive {
                let message = format!(
                    "{} takes {thorns} thorns damage from {}",
                    ctx.battle.name_of(hit.attacker.into()),
                    ctx.battle.name_of(hit.target.into())
                );
                ctx.emit(
                    BattleEvent::new(EventKind::Thorns, hit.target, message)
                        .target(hit.attacker)
                        .damage(thorns),
                );
                ctx.damage_enemy(hit.attacker, thorns);
            }
            damage
        }
    };
    Ok(Some(damage))
}
