//! Round bookkeeping: closing a round and detecting the end of the battle.
use crate::event::{BattleEvent, EventKind};
use crate::ids::{Combatant, EffectTarget};
use crate::state::Battle;

use super::ActionError;
use super::context::Resolution;
use super::retaliation::{self, Selection};

/// Closes the round once every living participant has acted.
///
/// Enemy turns, then damage over time, then effect expiry. The counter and
/// per-round flags reset even when no enemy is left to act.
pub(super) fn close_round_if_ready(ctx: &mut Resolution<'_, '_>) -> Result<bool, ActionError> {
    if !ctx.battle.all_living_acted() {
        return Ok(false);
    }

    if !ctx.battle.enemies_defeated() {
        for id in ctx.battle.living_enemy_ids() {
            if ctx.battle.party_wiped() {
                break;
            }
            // Reflected damage may have finished it earlier in the pass.
            if ctx.battle.enemy(id).is_some_and(|enemy| enemy.is_alive()) {
                retaliation::enemy_turn(ctx, id, Selection::Weighted)?;
            }
        }
        damage_over_time(ctx);
        ctx.battle.effects.tick();
    }

    ctx.battle.turn += 1;
    for participant in &mut ctx.battle.participants {
        participant.has_acted = false;
        participant.toggles = participant.toggles.roll_over();
    }
    Ok(true)
}

/// Rolls every damage-over-time effect on living combatants, enemies first.
fn damage_over_time(ctx: &mut Resolution<'_, '_>) {
    let mut victims: Vec<Combatant> = ctx
        .battle
        .living_enemy_ids()
        .into_iter()
        .map(Combatant::from)
        .collect();
    victims.extend(
        ctx.battle
            .living_participant_ids()
            .into_iter()
            .map(Combatant::from),
    );

    for victim in victims {
        for effect in ctx.battle.effects.damage_over_time_on(EffectTarget::from(victim)) {
            let Some(dice) = effect.dice else {
                continue;
            };
            let damage = dice.roll(&mut *ctx.rng);
            let message = format!(
                "{} takes {damage} {} damage",
                ctx.battle.name_of(victim),
                effect.kind.dot_label()
            );
            ctx.emit(
                BattleEvent::new(EventKind::Dot, victim, message)
                    .damage(damage)
                    .effect(effect.kind),
            );
            match victim {
                Combatant::Enemy(id) => {
                    ctx.damage_enemy(id, damage);
                }
                Combatant::Character(id) => {
                    if let Some(participant) = ctx.battle.participant_mut(id) {
                        participant.take_damage(damage);
                    }
                }
            }
        }
    }
}

/// Terminal check, run after every action. A wipe beats a win.
pub(super) fn settle(battle: &mut Battle) {
    if battle.party_wiped() {
        battle.finished = true;
        battle.won = false;
    } else if battle.enemies_defeated() {
        battle.finished = true;
        battle.won = true;
    }
}
