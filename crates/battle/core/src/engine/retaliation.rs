//! Enemy turns: the round-close AI pass and out-of-turn phase actions.
use crate::ability::DebuffSpec;
use crate::enemy::EnemyAbility;
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, Combatant, EnemyId};
use crate::status::{EffectSpec, StatusEffectKind};

use super::ActionError;
use super::context::{Resolution, percent_floor, scale};
use super::mitigation::{HitOutcome, IncomingHit, mitigate};

/// How an enemy chooses what to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Selection {
    /// Weighted roll with the heal-priority override.
    Weighted,
    /// Strongest area attack after a phase change.
    PhaseAction,
}

/// Payloads enemies can place on party members.
fn lands_on_party(debuff: &DebuffSpec) -> bool {
    matches!(
        debuff,
        DebuffSpec::Burn { .. }
            | DebuffSpec::Poison { .. }
            | DebuffSpec::Slow { .. }
            | DebuffSpec::Blind { .. }
    )
}

/// One out-of-turn action for every enemy that changed phase during the
/// player's action.
pub(super) fn spotlight(ctx: &mut Resolution<'_, '_>) -> Result<(), ActionError> {
    for id in ctx.drain_phased() {
        if ctx.battle.party_wiped() {
            break;
        }
        if ctx.battle.enemy(id).is_some_and(|enemy| enemy.is_alive()) {
            enemy_turn(ctx, id, Selection::PhaseAction)?;
        }
    }
    // Phases crossed by reflected damage here, or by thorns and damage over
    // time at round close, only log their message. They never chain.
    ctx.drain_phased();
    Ok(())
}

/// Resolves one enemy's action against the party.
pub(super) fn enemy_turn(
    ctx: &mut Resolution<'_, '_>,
    id: EnemyId,
    selection: Selection,
) -> Result<(), ActionError> {
    let Some(enemy) = ctx.battle.enemy(id) else {
        return Ok(());
    };
    let enemy_name = enemy.name.clone();

    if selection == Selection::Weighted {
        let blind = ctx
            .battle
            .effects
            .find(id.into(), StatusEffectKind::Blind)
            .and_then(|effect| effect.value)
            .unwrap_or(0);
        if blind > 0 && ctx.rng.chance(blind) {
            ctx.emit(BattleEvent::new(
                EventKind::Miss,
                id,
                format!("{enemy_name} is blinded and misses!"),
            ));
            return Ok(());
        }
    }

    let living = ctx.battle.living_participant_ids();
    if living.is_empty() {
        return Ok(());
    }

    let Some(enemy) = ctx.battle.enemy(id) else {
        return Ok(());
    };
    let threshold = ctx.env.config.enemy_heal_threshold_percent;
    let picked = match selection {
        Selection::Weighted => enemy.pick_ability(&mut *ctx.rng, threshold),
        Selection::PhaseAction => enemy.pick_phase_action(),
    };
    let Some(ability) = picked.cloned() else {
        return Ok(());
    };
    let phase_multiplier = enemy.phase_damage_multiplier();

    if ability.is_self_only() {
        apply_self_effects(ctx, id, &ability, true);
        if let Some(dice) = ability.heal {
            let amount = dice.roll(&mut *ctx.rng);
            heal_allies(ctx, id, &ability, amount);
        }
        return Ok(());
    }

    let targets: Vec<CharacterId> = if ability.area {
        living
    } else {
        let index = ctx.rng.pick_index(living.len());
        living.get(index).copied().into_iter().collect()
    };

    let rolled = ability
        .damage
        .unwrap_or(ctx.env.config.enemy_fallback_damage)
        .roll(&mut *ctx.rng);
    let actor = Combatant::Enemy(id);
    let mut base = scale(rolled, phase_multiplier);
    base = scale(base, ctx.battle.effects.damage_modifier(actor));
    base = scale(base, ctx.battle.effects.damage_reduction(actor));

    apply_self_effects(ctx, id, &ability, false);

    let mut dealt = 0u32;
    for target in targets {
        let hit = IncomingHit {
            attacker: id,
            target,
            ability: &ability.name,
            damage: base,
        };
        let HitOutcome::Landed(damage) = mitigate(ctx, &hit)? else {
            continue;
        };
        let Some(participant) = ctx.battle.participant_mut(target) else {
            continue;
        };
        participant.take_damage(damage);
        let level = participant.character.level;
        dealt = dealt.saturating_add(damage);

        let message = format!(
            "{enemy_name} uses {} on {} for {damage} damage",
            ability.name,
            ctx.battle.name_of(target.into())
        );
        ctx.emit(
            BattleEvent::new(EventKind::EnemyAttack, id, message)
                .target(target)
                .ability(ability.name.as_str())
                .damage(damage),
        );

        let poison_dice = ctx.env.config.poison_dice(level);
        for debuff in ability.effects.iter().filter(|d| lands_on_party(d)) {
            ctx.apply_debuff(actor, target.into(), debuff, poison_dice);
        }
    }

    if !ctx.battle.enemy(id).is_some_and(|enemy| enemy.is_alive()) {
        return Ok(());
    }
    if let Some(dice) = ability.heal {
        let amount = dice.roll(&mut *ctx.rng);
        heal_allies(ctx, id, &ability, amount);
    }
    if ability.lifesteal_percent > 0 && dealt > 0 {
        let amount = percent_floor(dealt, ability.lifesteal_percent);
        let healed = ctx.battle.enemy_mut(id).map_or(0, |enemy| enemy.heal(amount));
        if healed > 0 {
            ctx.emit(
                BattleEvent::new(
                    EventKind::EnemyAbility,
                    id,
                    format!("{enemy_name} drains life and heals for {healed} HP"),
                )
                .ability(ability.name.as_str())
                .healing(healed),
            );
        }
    }
    Ok(())
}

/// Self buffs and self shields. Logged only when they are the whole move.
fn apply_self_effects(
    ctx: &mut Resolution<'_, '_>,
    id: EnemyId,
    ability: &EnemyAbility,
    announce: bool,
) {
    let name = ctx.battle.name_of(id.into()).to_owned();
    if let Some(buff) = ability.self_buff {
        ctx.battle.effects.apply(
            EffectSpec::new(StatusEffectKind::SelfDamageBuff, id, id, buff.turns)
                .with_value(buff.percent),
        );
        if announce {
            ctx.emit(
                BattleEvent::new(
                    EventKind::EnemyAbility,
                    id,
                    format!(
                        "{name} uses {}! (+{}% damage for {} turns)",
                        ability.name, buff.percent, buff.turns
                    ),
                )
                .ability(ability.name.as_str())
                .effect(StatusEffectKind::SelfDamageBuff),
            );
        }
    }
    if let Some(shield) = ability.self_shield {
        ctx.battle.effects.apply(
            EffectSpec::new(StatusEffectKind::BossDamageReduction, id, id, shield.turns)
                .with_value(shield.percent),
        );
        if announce {
            ctx.emit(
                BattleEvent::new(
                    EventKind::EnemyAbility,
                    id,
                    format!(
                        "{name} uses {}! (braces itself for {} turns)",
                        ability.name, shield.turns
                    ),
                )
                .ability(ability.name.as_str())
                .effect(StatusEffectKind::BossDamageReduction),
            );
        }
    }
}

/// Heals the caster, or every living enemy for an area heal.
fn heal_allies(ctx: &mut Resolution<'_, '_>, caster: EnemyId, ability: &EnemyAbility, amount: u32) {
    let recipients = if ability.area {
        ctx.battle.living_enemy_ids()
    } else {
        vec![caster]
    };
    let caster_name = ctx.battle.name_of(caster.into()).to_owned();
    for recipient in recipients {
        let Some(enemy) = ctx.battle.enemy_mut(recipient) else {
            continue;
        };
        let healed = enemy.heal(amount);
        let message = if recipient == caster {
            format!("{caster_name} uses {} and heals for {healed} HP", ability.name)
        } else {
            format!(
                "{caster_name} uses {} on {} and heals for {healed} HP",
                ability.name, enemy.name
            )
        };
        ctx.emit(
            BattleEvent::new(EventKind::EnemyAbility, caster, message)
                .target(recipient)
                .ability(ability.name.as_str())
                .healing(healed),
        );
    }
}
