//! Actions every class has: the free basic attack and resource recovery.
use crate::class::{Archetype, PassiveHook};
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, Combatant, EnemyId};

use super::context::{Resolution, percent_floor};
use super::{ActionError, RecoveryKind, retaliation};

pub(super) fn basic_attack(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    target: EnemyId,
) -> Result<(), ActionError> {
    ctx.living_enemy(target)?;
    let participant = ctx.acting_participant(actor)?;
    let level = participant.character.level;
    let name = participant.name().to_owned();
    let archetype = participant.character.class.archetype();

    let config = ctx.env.config;
    let sides = match archetype {
        Archetype::Martial => config.basic_attack.martial_sides,
        Archetype::Caster => config.basic_attack.caster_sides,
        Archetype::Gish => config.basic_attack.gish_sides,
    };
    let count = if ctx.battle.easy_mode {
        config.easy_mode_basic_attack_dice
    } else {
        1
    };
    let roll = ctx.rng.roll_dice(count, sides) + level.div_ceil(2);

    let attacker = Combatant::Character(actor);
    let effects = &ctx.battle.effects;
    let factor = effects.damage_modifier(attacker)
        * effects.damage_reduction(attacker)
        * effects.vulnerability_modifier(target.into());
    // Single floor over the combined factor.
    let damage = (f64::from(roll) * factor).floor() as u32;

    let message = format!(
        "{name} attacks {} for {damage} damage",
        ctx.battle.name_of(target.into())
    );
    ctx.emit(
        BattleEvent::new(EventKind::Attack, actor, message)
            .target(target)
            .damage(damage),
    );
    ctx.damage_enemy(target, damage);
    retaliation::spotlight(ctx)
}

pub(super) fn recover(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    kind: RecoveryKind,
) -> Result<(), ActionError> {
    let resource = kind.resource();
    let participant = ctx.acting_participant(actor)?;
    let class = participant.character.class;
    if !class.uses(resource) {
        return Err(ActionError::RecoveryUnavailable { class, resource });
    }

    let config = ctx.env.config;
    let percent = match kind {
        RecoveryKind::Rest => config.rest_percent,
        RecoveryKind::Meditate => config.meditate_percent,
    };
    let mut amount = percent_floor(participant.max_resource(resource), percent);
    for hook in ctx.hooks_of(actor)? {
        if let PassiveHook::RecoveryMultiplier {
            resource: boosted,
            factor,
        } = *hook
        {
            if boosted == resource {
                amount = amount.saturating_mul(factor);
            }
        }
    }

    let Some(participant) = ctx.battle.participant_mut(actor) else {
        return Err(ActionError::CharacterNotInBattle(actor));
    };
    let restored = participant.restore(resource, amount);
    let verb = match kind {
        RecoveryKind::Rest => "rests",
        RecoveryKind::Meditate => "meditates",
    };
    let message = format!(
        "{} {verb} and recovers {restored} {resource}",
        participant.name()
    );
    ctx.emit(BattleEvent::new(EventKind::Recovery, actor, message).restored(restored));
    Ok(())
}
