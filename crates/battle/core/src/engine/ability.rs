//! Ability resolution.
//!
//! Effects of an ability resolve in a fixed order regardless of how they are
//! declared:
//!
//! 1. cost
//! 2. toggle (ends resolution)
//! 3. strike, with lifesteal and mana conversion
//! 4. direct heal
//! 5. recoil
//! 6. debuffs on the struck targets
//! 7. self and party buffs, lockout
//! 8. phase actions of enemies that changed phase
use crate::ability::{
    AbilityDef, AbilityEffect, DebuffSpec, PartyBuffSpec, Repeat, SelfBuffSpec, StrikeSpec,
};
use crate::class::{HookPoint, PassiveHook, ResourceKind};
use crate::dice::DiceSpec;
use crate::event::{BattleEvent, EventKind};
use crate::ids::{CharacterId, Combatant, EffectTarget, EnemyId};
use crate::state::Toggles;
use crate::status::{EffectSpec, FRENZY_DAMAGE_TAKEN, StatusEffectKind, UNTIL_REMOVED};

use super::context::{Resolution, percent_ceil, percent_floor, scale};
use super::{ActionError, retaliation};

pub(super) fn use_ability(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    name: &str,
    target_enemy: Option<EnemyId>,
    target_ally: Option<CharacterId>,
) -> Result<(), ActionError> {
    let participant = ctx.acting_participant(actor)?;
    let class = participant.character.class;
    let level = participant.character.level;
    let locked_out = participant.toggles.contains(Toggles::ABILITY_LOCKOUT);
    let profile = ctx.profile(class)?;
    let ability = profile
        .unlocked_ability(name, level)
        .ok_or_else(|| ActionError::AbilityUnavailable {
            ability: name.to_owned(),
            level,
        })?;

    if locked_out {
        return Err(ActionError::AbilityLockedOut(actor));
    }
    let cost = ability.cost;
    let available = participant.resource(cost.resource);
    if available < cost.amount {
        return Err(ActionError::InsufficientResource {
            resource: cost.resource,
            needed: cost.amount,
            available,
        });
    }

    let targets = enemy_targets(ctx, ability, target_enemy)?;
    let heal_target = match (ability.heal(), target_ally) {
        (Some(_), Some(ally)) => {
            let ally_state = ctx
                .battle
                .participant(ally)
                .ok_or(ActionError::AllyNotFound(ally))?;
            if !ally_state.is_alive() {
                return Err(ActionError::AllyDefeated(ally));
            }
            ally
        }
        _ => actor,
    };

    if let Some(caster) = ctx.battle.participant_mut(actor) {
        caster.spend(cost.resource, cost.amount);
    }

    if let Some((kind, value)) = ability.toggle() {
        flip_toggle(ctx, actor, &ability.name, kind, value);
        return Ok(());
    }

    if let Some(strike) = ability.strike() {
        resolve_strike(ctx, actor, ability, strike, &targets)?;
    }
    if let Some(dice) = ability.heal() {
        let rolled = dice.roll(&mut *ctx.rng);
        heal(ctx, actor, heal_target, ability, rolled)?;
    }
    for effect in &ability.effects {
        if let AbilityEffect::Recoil(dice) = effect {
            let recoil = dice.roll(&mut *ctx.rng);
            recoil_damage(ctx, actor, ability, recoil);
        }
    }
    apply_debuffs(ctx, actor, ability, &targets)?;
    apply_buffs(ctx, actor, ability);

    retaliation::spotlight(ctx)
}

/// Enemies the ability lands on: every living enemy for area strikes,
/// otherwise the validated primary target.
fn enemy_targets(
    ctx: &Resolution<'_, '_>,
    ability: &AbilityDef,
    target: Option<EnemyId>,
) -> Result<Vec<EnemyId>, ActionError> {
    if !ability.needs_enemy_target() {
        return Ok(Vec::new());
    }
    if let Some(id) = target {
        ctx.living_enemy(id)?;
    }
    if ability.is_area() {
        return Ok(ctx.battle.living_enemy_ids());
    }
    let id = target.ok_or_else(|| ActionError::TargetRequired(ability.name.clone()))?;
    Ok(vec![id])
}

fn flip_toggle(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    label: &str,
    kind: StatusEffectKind,
    value: u32,
) {
    let name = ctx.battle.name_of(actor.into()).to_owned();
    let own = EffectTarget::Character(actor);
    let existing = ctx.battle.effects.find(own, kind).map(|effect| effect.id);
    let message = match existing {
        Some(id) => {
            ctx.battle.effects.remove(id);
            format!("{name} deactivates {label}")
        }
        None => {
            ctx.battle
                .effects
                .apply(EffectSpec::new(kind, actor, actor, UNTIL_REMOVED).with_value(value));
            let taken = ((FRENZY_DAMAGE_TAKEN - 1.0) * 100.0).round() as u32;
            format!("{name} enters a {label}! (+{value}% damage, +{taken}% damage taken)")
        }
    };
    ctx.emit(BattleEvent::new(EventKind::Toggle, actor, message).effect(kind));
}

/// Outgoing damage factor of `actor` before per-target modifiers.
fn outgoing_factor(ctx: &Resolution<'_, '_>, actor: CharacterId, hooks: &[PassiveHook]) -> f64 {
    let attacker = Combatant::Character(actor);
    let mut factor = ctx.battle.effects.damage_modifier(attacker)
        * ctx.battle.effects.damage_reduction(attacker);
    let tenths = ctx
        .battle
        .participant(actor)
        .map_or(0, |p| p.missing_hp_tenths());
    for hook in hooks {
        if let PassiveHook::MissingHpDamageBonus { percent } = *hook {
            factor *= 1.0 + f64::from(percent * tenths) / 100.0;
        }
    }
    factor
}

fn resolve_strike(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    ability: &AbilityDef,
    strike: &StrikeSpec,
    targets: &[EnemyId],
) -> Result<(), ActionError> {
    let class = ctx
        .battle
        .participant(actor)
        .map(|p| p.character.class)
        .ok_or(ActionError::CharacterNotInBattle(actor))?;
    let passive = &ctx.profile(class)?.passive;
    let hooks = passive.hooks.as_slice();
    let actor_name = ctx.battle.name_of(actor.into()).to_owned();
    let single = !strike.area;

    // One base roll shared by every target.
    let base = strike.dice.roll(&mut *ctx.rng);
    let outgoing = outgoing_factor(ctx, actor, hooks);

    let crit_chance = strike.crit_chance
        + hooks
            .iter()
            .filter_map(|hook| match *hook {
                PassiveHook::CritChanceBonus { percent } => Some(percent),
                _ => None,
            })
            .sum::<u32>();
    let crit = single && crit_chance > 0 && ctx.rng.chance(crit_chance);
    let second = (single && strike.repeat == Repeat::Twice).then(|| strike.dice.roll(&mut *ctx.rng));
    let extra = match strike.extra_per_ally {
        Some(dice) => {
            let allies = ctx
                .battle
                .living_participant_ids()
                .into_iter()
                .filter(|id| *id != actor)
                .count() as u32;
            if allies > 0 {
                ctx.rng.roll_dice(dice.count * allies, dice.sides)
            } else {
                0
            }
        }
        None => 0,
    };

    let lifesteal_percent = strike.lifesteal_percent
        + hooks
            .iter()
            .filter_map(|hook| match *hook {
                PassiveHook::LifestealBonus { percent } => Some(percent),
                _ => None,
            })
            .sum::<u32>();
    let mut lifesteal = 0u32;
    let mut refund = 0u32;

    for &target in targets {
        let Some(enemy) = ctx.battle.enemy(target) else {
            continue;
        };
        if !enemy.is_alive() {
            continue;
        }
        let enemy_name = enemy.name.clone();
        let full_hp = enemy.is_full_hp();
        let marked = ctx
            .battle
            .effects
            .has(target.into(), StatusEffectKind::HuntersMark);

        let mut factor = outgoing;
        if marked {
            for hook in hooks {
                if let PassiveHook::MarkedTargetDamageBonus { percent } = *hook {
                    factor *= 1.0 + f64::from(percent) / 100.0;
                }
            }
        }
        let vulnerability = ctx.battle.effects.vulnerability_modifier(target.into());
        let hit = |roll: u32| scale(scale(roll, factor), vulnerability);

        let mut damage = hit(base);
        if crit {
            damage = damage.saturating_mul(2);
        }
        if single && strike.auto_crit_if_full_hp && full_hp {
            damage = damage.saturating_mul(2);
        }
        if let Some(second) = second {
            damage = damage.saturating_add(hit(second));
        }
        if strike.repeat == Repeat::TwiceIfMarked && marked {
            damage = damage.saturating_mul(2);
        }
        damage = damage.saturating_add(extra);

        let crit_text = if crit { " (CRIT!)" } else { "" };
        ctx.emit(
            BattleEvent::new(
                EventKind::Ability,
                actor,
                format!(
                    "{actor_name} uses {} on {enemy_name} for {damage} damage{crit_text}",
                    ability.name
                ),
            )
            .target(target)
            .ability(ability.name.as_str())
            .damage(damage),
        );
        let defeated = ctx.damage_enemy(target, damage);

        if defeated {
            for effect in &ability.effects {
                if let AbilityEffect::RefundOnKill { percent } = effect {
                    refund = refund.max(percent_floor(ability.cost.amount, *percent));
                }
            }
        }
        lifesteal = lifesteal.saturating_add(percent_ceil(damage, lifesteal_percent));

        for hook in hooks {
            if let PassiveHook::ManaFromDamage { percent } = *hook {
                let gain = percent_ceil(damage, percent);
                if gain == 0 {
                    continue;
                }
                let restored = ctx
                    .battle
                    .participant_mut(actor)
                    .map_or(0, |p| p.restore(ResourceKind::Mana, gain));
                if restored > 0 {
                    ctx.emit(
                        BattleEvent::new(
                            EventKind::ManaGain,
                            actor,
                            format!(
                                "{actor_name} recovers {restored} mana from {}",
                                passive.name
                            ),
                        )
                        .restored(restored),
                    );
                }
            }
        }
    }

    if lifesteal > 0 {
        let healed = ctx
            .battle
            .participant_mut(actor)
            .map_or(0, |p| p.heal(lifesteal));
        if healed > 0 {
            ctx.emit(
                BattleEvent::new(
                    EventKind::Lifesteal,
                    actor,
                    format!("{actor_name} heals for {healed} HP from {}", ability.name),
                )
                .ability(ability.name.as_str())
                .healing(healed),
            );
        }
    }
    if refund > 0 {
        let resource = ability.cost.resource;
        let restored = ctx
            .battle
            .participant_mut(actor)
            .map_or(0, |p| p.restore(resource, refund));
        if restored > 0 {
            ctx.emit(
                BattleEvent::new(
                    EventKind::ManaGain,
                    actor,
                    format!(
                        "{actor_name} recovers {restored} {resource} from {}",
                        ability.name
                    ),
                )
                .ability(ability.name.as_str())
                .restored(restored),
            );
        }
    }
    Ok(())
}

fn heal(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    target: CharacterId,
    ability: &AbilityDef,
    rolled: u32,
) -> Result<(), ActionError> {
    let mut amount = rolled;
    for hook in ctx.hooks_of(actor)? {
        if let PassiveHook::HealingBonus { percent } = *hook {
            amount = percent_floor(amount, 100 + percent);
        }
    }
    let actor_name = ctx.battle.name_of(actor.into()).to_owned();
    let Some(patient) = ctx.battle.participant_mut(target) else {
        return Err(ActionError::AllyNotFound(target));
    };
    let healed = patient.heal(amount);
    let message = if target == actor {
        format!("{actor_name} uses {} and heals for {healed} HP", ability.name)
    } else {
        format!(
            "{actor_name} uses {} on {} and heals for {healed} HP",
            ability.name,
            patient.name()
        )
    };
    ctx.emit(
        BattleEvent::new(EventKind::Heal, actor, message)
            .target(target)
            .ability(ability.name.as_str())
            .healing(healed),
    );
    Ok(())
}

fn recoil_damage(ctx: &mut Resolution<'_, '_>, actor: CharacterId, ability: &AbilityDef, amount: u32) {
    let Some(caster) = ctx.battle.participant_mut(actor) else {
        return;
    };
    caster.take_damage(amount);
    let message = format!(
        "{} takes {amount} self-damage from {}",
        caster.name(),
        ability.name
    );
    ctx.emit(
        BattleEvent::new(EventKind::Recoil, actor, message)
            .ability(ability.name.as_str())
            .damage(amount),
    );
}

fn apply_debuffs(
    ctx: &mut Resolution<'_, '_>,
    actor: CharacterId,
    ability: &AbilityDef,
    targets: &[EnemyId],
) -> Result<(), ActionError> {
    let debuffs: Vec<DebuffSpec> = ability.debuffs().copied().collect();
    if debuffs.is_empty() {
        return Ok(());
    }
    let level = ctx
        .battle
        .participant(actor)
        .map_or(1, |p| p.character.level);
    let poison_dice = ctx.env.config.poison_dice(level);
    let curse = debuffs.iter().any(DebuffSpec::is_curse);
    let class = ctx
        .battle
        .participant(actor)
        .map(|p| p.character.class)
        .ok_or(ActionError::CharacterNotInBattle(actor))?;
    let profile = ctx.profile(class)?;
    let source = Combatant::Character(actor);

    for &target in targets {
        if !ctx.battle.enemy(target).is_some_and(|enemy| enemy.is_alive()) {
            continue;
        }
        for debuff in &debuffs {
            ctx.apply_debuff(source, target.into(), debuff, poison_dice);
        }
        if !curse {
            continue;
        }
        for hook in profile.hooks_at(HookPoint::DebuffApplied) {
            if let PassiveHook::PoisonOnCurse { sides, turns } = *hook {
                let spec = EffectSpec::new(StatusEffectKind::Poison, source, target, turns)
                    .with_dice(DiceSpec::new(poison_dice, sides));
                ctx.battle.effects.apply(spec);
                let message = format!(
                    "{} is cursed with poison for {turns} turns ({})",
                    ctx.battle.name_of(target.into()),
                    profile.passive.name
                );
                ctx.emit(
                    BattleEvent::new(EventKind::Effect, actor, message)
                        .target(target)
                        .effect(StatusEffectKind::Poison),
                );
            }
        }
    }
    Ok(())
}

fn apply_buffs(ctx: &mut Resolution<'_, '_>, actor: CharacterId, ability: &AbilityDef) {
    let name = ctx.battle.name_of(actor.into()).to_owned();
    for effect in &ability.effects {
        let (spec, message) = match *effect {
            AbilityEffect::SelfBuff(buff) => self_buff(actor, &name, buff),
            AbilityEffect::PartyBuff(PartyBuffSpec::DamageBuff { percent, turns }) => (
                EffectSpec::new(
                    StatusEffectKind::PartyDamageBuff,
                    actor,
                    EffectTarget::Party,
                    turns,
                )
                .with_value(percent),
                format!("Party deals {percent}% more damage for {turns} turns"),
            ),
            AbilityEffect::PartyBuff(PartyBuffSpec::Evasion { percent, turns }) => (
                EffectSpec::new(StatusEffectKind::PartyEvasion, actor, EffectTarget::Party, turns)
                    .with_value(percent),
                format!("Party gains {percent}% evasion for {turns} turns"),
            ),
            AbilityEffect::LockoutThisRound => {
                if let Some(caster) = ctx.battle.participant_mut(actor) {
                    caster.toggles |= Toggles::ABILITY_LOCKOUT;
                }
                continue;
            }
            _ => continue,
        };
        let kind = spec.kind;
        let target = match spec.target {
            EffectTarget::Party => None,
            _ => Some(actor),
        };
        ctx.battle.effects.apply(spec);
        let mut event = BattleEvent::new(EventKind::Effect, actor, message).effect(kind);
        if let Some(target) = target {
            event = event.target(target);
        }
        ctx.emit(event);
    }
}

fn self_buff(actor: CharacterId, name: &str, buff: SelfBuffSpec) -> (EffectSpec, String) {
    let spec = |kind, turns| EffectSpec::new(kind, actor, actor, turns);
    match buff {
        SelfBuffSpec::DamageBuff { percent, turns } => (
            spec(StatusEffectKind::SelfDamageBuff, turns).with_value(percent),
            format!("{name} deals {percent}% more damage for {turns} turns"),
        ),
        SelfBuffSpec::ShieldUntilHit { reduction } => (
            spec(StatusEffectKind::ShieldUntilHit, UNTIL_REMOVED).with_value(reduction),
            format!("{name} is shielded, next hit reduced by {reduction}%"),
        ),
        SelfBuffSpec::Parry {
            max_per_level,
            reflect_percent,
        } => (
            spec(StatusEffectKind::Parry, 1)
                .with_value(max_per_level)
                .with_reflect(reflect_percent),
            format!("{name} readies a parry"),
        ),
        SelfBuffSpec::Haste => (
            spec(StatusEffectKind::Haste, 1),
            format!("{name} gains haste and will act twice next turn"),
        ),
        SelfBuffSpec::Weakness { dice, turns } => (
            spec(StatusEffectKind::SelfWeakness, turns).with_dice(dice),
            format!("{name} suffers dark energy backlash for {turns} turns"),
        ),
    }
}
