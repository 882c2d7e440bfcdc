//! Enemy definitions, spawned instances and their AI queries.
use crate::ability::DebuffSpec;
use crate::dice::{DiceSpec, RngOracle, weighted_choice};
use crate::ids::EnemyId;

/// Percentage and duration pair used by enemy self-buffs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedPercent {
    pub percent: u32,
    pub turns: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyAbility {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<DiceSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: Option<DiceSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: bool,
    /// Share of the damage dealt healed back.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lifesteal_percent: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub self_buff: Option<TimedPercent>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub self_shield: Option<TimedPercent>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<DebuffSpec>,
    pub weight: f64,
}

impl EnemyAbility {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            damage: None,
            heal: None,
            area: false,
            lifesteal_percent: 0,
            self_buff: None,
            self_shield: None,
            effects: Vec::new(),
            weight,
        }
    }

    #[must_use]
    pub fn damage(mut self, dice: DiceSpec) -> Self {
        self.damage = Some(dice);
        self
    }

    #[must_use]
    pub fn heal(mut self, dice: DiceSpec) -> Self {
        self.heal = Some(dice);
        self
    }

    #[must_use]
    pub fn area(mut self) -> Self {
        self.area = true;
        self
    }

    #[must_use]
    pub fn effect(mut self, debuff: DebuffSpec) -> Self {
        self.effects.push(debuff);
        self
    }

    #[must_use]
    pub fn self_buff(mut self, percent: u32, turns: u32) -> Self {
        self.self_buff = Some(TimedPercent { percent, turns });
        self
    }

    #[must_use]
    pub fn self_shield(mut self, percent: u32, turns: u32) -> Self {
        self.self_shield = Some(TimedPercent { percent, turns });
        self
    }

    /// Heals without dealing damage. Preferred when the enemy is hurt.
    pub fn is_heal_only(&self) -> bool {
        self.heal.is_some() && self.damage.is_none()
    }

    /// Never touches the party: no damage and no payload.
    pub fn is_self_only(&self) -> bool {
        self.damage.is_none() && self.effects.is_empty()
    }

    pub fn average_damage(&self) -> f64 {
        self.damage.map_or(0.0, |dice| dice.average())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossPhase {
    /// Fires when HP drops to or below this share of max HP.
    pub hp_percent: u32,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_multiplier: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra_abilities: Vec<EnemyAbility>,
}

/// Catalog entry an enemy is spawned from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyDefinition {
    pub name: String,
    pub hp: u32,
    pub abilities: Vec<EnemyAbility>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub phases: Vec<BossPhase>,
}

/// A phase that fired while applying damage.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseShift {
    pub index: usize,
    pub message: String,
}

/// A spawned enemy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enemy {
    pub id: EnemyId,
    pub definition_name: String,
    /// Display name, suffixed when the encounter has duplicates.
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub abilities: Vec<EnemyAbility>,
    pub phases: Vec<BossPhase>,
    pub is_boss: bool,
    /// Indexes into `phases` that already fired.
    #[cfg_attr(feature = "serde", serde(default))]
    pub triggered_phases: Vec<usize>,
}

impl Enemy {
    pub fn spawn(id: EnemyId, definition: &EnemyDefinition, is_boss: bool) -> Self {
        Self {
            id,
            definition_name: definition.name.clone(),
            name: definition.name.clone(),
            hp: definition.hp,
            max_hp: definition.hp,
            abilities: definition.abilities.clone(),
            phases: definition.phases.clone(),
            is_boss,
            triggered_phases: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp >= self.max_hp
    }

    /// `hp / max_hp < percent / 100`, without floating point.
    pub fn is_below_percent(&self, percent: u32) -> bool {
        u64::from(self.hp) * 100 < u64::from(percent) * u64::from(self.max_hp)
    }

    fn phase_reached(&self, phase: &BossPhase) -> bool {
        u64::from(self.hp) * 100 <= u64::from(phase.hp_percent) * u64::from(self.max_hp)
    }

    /// Subtracts `amount` (clamped at 0) and returns the phases this crossed.
    ///
    /// A phase fires once per battle; its unlocks stay active afterwards.
    pub fn take_damage(&mut self, amount: u32) -> Vec<PhaseShift> {
        self.hp = self.hp.saturating_sub(amount);
        let mut shifts = Vec::new();
        for (index, phase) in self.phases.iter().enumerate() {
            if !self.triggered_phases.contains(&index) && self.phase_reached(phase) {
                shifts.push(PhaseShift {
                    index,
                    message: phase.message.clone(),
                });
            }
        }
        self.triggered_phases.extend(shifts.iter().map(|shift| shift.index));
        shifts
    }

    /// Restores up to `amount` HP and returns what was actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    pub fn active_phases(&self) -> impl Iterator<Item = &BossPhase> {
        self.triggered_phases
            .iter()
            .filter_map(|index| self.phases.get(*index))
    }

    /// Base abilities plus everything unlocked by fired phases.
    pub fn available_abilities(&self) -> Vec<&EnemyAbility> {
        self.abilities
            .iter()
            .chain(
                self.active_phases()
                    .flat_map(|phase| phase.extra_abilities.iter()),
            )
            .collect()
    }

    /// Strongest multiplier among fired phases.
    pub fn phase_damage_multiplier(&self) -> f64 {
        self.active_phases()
            .filter_map(|phase| phase.damage_multiplier)
            .fold(1.0, f64::max)
    }

    /// Weighted pick, overridden by a heal-only move while hurt.
    pub fn pick_ability<R: RngOracle + ?Sized>(
        &self,
        rng: &mut R,
        heal_threshold_percent: u32,
    ) -> Option<&EnemyAbility> {
        let available = self.available_abilities();
        if self.is_below_percent(heal_threshold_percent) {
            if let Some(heal) = available.iter().find(|ability| ability.is_heal_only()) {
                return Some(*heal);
            }
        }
        weighted_choice(rng, &available, |ability| ability.weight).copied()
    }

    /// Move used for the out-of-turn action after a phase change: the
    /// hardest-hitting area attack, else the hardest-hitting attack, else
    /// the first ability.
    pub fn pick_phase_action(&self) -> Option<&EnemyAbility> {
        let available = self.available_abilities();
        let area = strongest(
            available
                .iter()
                .copied()
                .filter(|ability| ability.area && ability.damage.is_some()),
        );
        area.or_else(|| {
            strongest(
                available
                    .iter()
                    .copied()
                    .filter(|ability| ability.damage.is_some()),
            )
        })
        .or_else(|| available.first().copied())
    }
}

fn strongest<'a>(pool: impl Iterator<Item = &'a EnemyAbility>) -> Option<&'a EnemyAbility> {
    pool.reduce(|best, candidate| {
        if candidate.average_damage() > best.average_damage() {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRng;

    fn drake() -> EnemyDefinition {
        EnemyDefinition {
            name: "Magma Drake".into(),
            hp: 100,
            abilities: vec![
                EnemyAbility::new("Bite", 3.0).damage(DiceSpec::new(2, 6)),
                EnemyAbility::new("Fire Breath", 1.0)
                    .damage(DiceSpec::new(2, 8))
                    .area(),
            ],
            phases: vec![BossPhase {
                hp_percent: 30,
                message: "The drake's scales glow white-hot!".into(),
                damage_multiplier: Some(1.5),
                extra_abilities: vec![
                    EnemyAbility::new("Eruption", 1.0)
                        .damage(DiceSpec::new(3, 8))
                        .area(),
                ],
            }],
        }
    }

    #[test]
    fn phase_fires_once_when_crossed() {
        let mut enemy = Enemy::spawn(EnemyId(1), &drake(), true);
        enemy.hp = 31;
        let shifts = enemy.take_damage(3);
        assert_eq!(enemy.hp, 28);
        assert_eq!(shifts.len(), 1);
        assert!(enemy.take_damage(5).is_empty());
        assert_eq!(enemy.phase_damage_multiplier(), 1.5);
    }

    #[test]
    fn phase_unlocks_stay_after_healing() {
        let mut enemy = Enemy::spawn(EnemyId(1), &drake(), true);
        enemy.take_damage(75);
        enemy.heal(60);
        assert_eq!(enemy.hp, 85);
        assert_eq!(enemy.available_abilities().len(), 3);
        assert!(enemy.take_damage(60).is_empty());
    }

    #[test]
    fn exact_threshold_counts_as_crossed() {
        let mut enemy = Enemy::spawn(EnemyId(1), &drake(), true);
        assert_eq!(enemy.take_damage(70).len(), 1);
    }

    #[test]
    fn hurt_enemy_prefers_heal() {
        let mut definition = drake();
        definition
            .abilities
            .push(EnemyAbility::new("Cauterize", 0.1).heal(DiceSpec::new(2, 6)));
        let mut enemy = Enemy::spawn(EnemyId(1), &definition, true);
        let mut rng = ScriptedRng::new();
        assert_eq!(enemy.pick_ability(&mut rng, 50).map(|a| a.name.as_str()), Some("Bite"));
        enemy.hp = 49;
        assert_eq!(
            enemy.pick_ability(&mut rng, 50).map(|a| a.name.as_str()),
            Some("Cauterize")
        );
    }

    #[test]
    fn phase_action_prefers_strongest_area_attack() {
        let mut enemy = Enemy::spawn(EnemyId(1), &drake(), true);
        assert_eq!(enemy.pick_phase_action().map(|a| a.name.as_str()), Some("Fire Breath"));
        enemy.take_damage(80);
        assert_eq!(enemy.pick_phase_action().map(|a| a.name.as_str()), Some("Eruption"));
    }

    #[test]
    fn heal_is_clamped_to_max() {
        let mut enemy = Enemy::spawn(EnemyId(1), &drake(), false);
        enemy.hp = 95;
        assert_eq!(enemy.heal(20), 5);
        assert_eq!(enemy.hp, 100);
    }
}
