//! Encounter builder: turns stage definitions into spawned, scaled enemies.
//!
//! Area scaling multiplies HP (floored) and grows every damage modifier by
//! `floor((modifier or 1) x (multiplier - 1))`. Easy-mode parties get a
//! second multiplier on top, applied to HP and damage modifiers (ceiled).
//! Boss phase abilities are spawned as defined.
use std::collections::HashMap;

use battle_core::{BattleConfig, Enemy, EnemyDefinition, EnemyId, RngOracle};

use crate::areas::StageDefinition;

/// Size range of a mob encounter, inclusive.
pub const MOB_ENCOUNTER_SIZE: (usize, usize) = (3, 5);

/// Battles per area: two mob fights, then the boss.
pub const BATTLES_PER_AREA: u32 = 3;

const SUFFIXES: &[u8] = b"ABCDEFGHIJKLMNOP";

/// Spawns encounters for one area.
///
/// Enemy ids are serials handed out by the builder, so every enemy spawned
/// through one builder is unique within its battle.
pub struct EncounterBuilder<'a> {
    config: &'a BattleConfig,
    area_index: usize,
    easy_mode: bool,
    next_serial: u64,
}

impl<'a> EncounterBuilder<'a> {
    pub fn new(config: &'a BattleConfig, area_index: usize) -> Self {
        Self {
            config,
            area_index,
            easy_mode: false,
            next_serial: 1,
        }
    }

    #[must_use]
    pub fn easy_mode(mut self, easy_mode: bool) -> Self {
        self.easy_mode = easy_mode;
        self
    }

    /// Boss fight for `battle_index` (0-based) within the area?
    pub fn is_boss_battle(battle_index: u32) -> bool {
        battle_index + 1 >= BATTLES_PER_AREA
    }

    /// Mob encounter: 3 to 5 picks from the stage pool, repeats allowed.
    pub fn mob(&mut self, stage: &StageDefinition, rng: &mut dyn RngOracle) -> Vec<Enemy> {
        if stage.pool.is_empty() {
            return Vec::new();
        }
        let (min, max) = MOB_ENCOUNTER_SIZE;
        let count = min + rng.pick_index(max - min + 1);
        let picked: Vec<&EnemyDefinition> = (0..count)
            .filter_map(|_| stage.pool.get(rng.pick_index(stage.pool.len())))
            .collect();
        self.spawn(&picked, None)
    }

    /// Boss encounter: the boss followed by every add.
    pub fn boss(&mut self, stage: &StageDefinition) -> Vec<Enemy> {
        let mut lineup = vec![&stage.boss];
        lineup.extend(stage.adds.iter());
        self.spawn(&lineup, Some(0))
    }

    /// Picks the fight for `battle_index` within the area.
    pub fn for_battle(
        &mut self,
        stage: &StageDefinition,
        battle_index: u32,
        rng: &mut dyn RngOracle,
    ) -> Vec<Enemy> {
        if Self::is_boss_battle(battle_index) {
            self.boss(stage)
        } else {
            self.mob(stage, rng)
        }
    }

    fn spawn(&mut self, lineup: &[&EnemyDefinition], boss: Option<usize>) -> Vec<Enemy> {
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for definition in lineup {
            *totals.entry(definition.name.as_str()).or_default() += 1;
        }

        let area_percent = multiplier_percent(self.config.area_scaling(self.area_index));
        let easy_percent = self
            .easy_mode
            .then(|| multiplier_percent(self.config.easy_mode_scaling(self.area_index)));

        let mut seen: HashMap<&str, usize> = HashMap::new();
        lineup
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                let scaled = scale_definition(definition, area_percent, easy_percent);
                let id = EnemyId(self.next_serial);
                self.next_serial += 1;
                let mut enemy = Enemy::spawn(id, &scaled, boss == Some(index));

                let nth = seen.entry(definition.name.as_str()).or_default();
                *nth += 1;
                if totals.get(definition.name.as_str()).copied().unwrap_or(0) > 1 {
                    if let Some(letter) = SUFFIXES.get(*nth - 1) {
                        enemy.name = format!("{} {}", definition.name, char::from(*letter));
                    }
                }
                enemy
            })
            .collect()
    }
}

/// Multiplier as whole percent, so 1.2 scales by exactly 120/100.
fn multiplier_percent(multiplier: f64) -> u32 {
    (multiplier * 100.0).round().max(0.0) as u32
}

fn scale_definition(
    definition: &EnemyDefinition,
    area_percent: u32,
    easy_percent: Option<u32>,
) -> EnemyDefinition {
    let mut scaled = definition.clone();

    if area_percent != 100 {
        scaled.hp = floor_percent(scaled.hp, area_percent);
        for ability in &mut scaled.abilities {
            if let Some(dice) = ability.damage.as_mut() {
                let base = if dice.modifier == 0 { 1 } else { dice.modifier };
                let growth = (i64::from(base) * (i64::from(area_percent) - 100)).div_euclid(100);
                dice.modifier += i32::try_from(growth).unwrap_or(0);
            }
        }
    }

    if let Some(percent) = easy_percent {
        scaled.hp = ceil_percent(scaled.hp, percent);
        for ability in &mut scaled.abilities {
            if let Some(dice) = ability.damage.as_mut() {
                let modifier = u32::try_from(dice.modifier.max(0)).unwrap_or(0);
                dice.modifier = i32::try_from(ceil_percent(modifier, percent)).unwrap_or(i32::MAX);
            }
        }
    }

    scaled
}

fn floor_percent(value: u32, percent: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

fn ceil_percent(value: u32, percent: u32) -> u32 {
    let scaled = (u64::from(value) * u64::from(percent)).div_ceil(100);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use battle_core::{DiceSpec, EnemyAbility, ScriptedRng};

    use super::*;

    fn guard() -> EnemyDefinition {
        EnemyDefinition {
            name: "Goblin Guard".into(),
            hp: 28,
            abilities: vec![EnemyAbility::new("Stab", 1.0).damage(DiceSpec::new(1, 6).plus(1))],
            phases: Vec::new(),
        }
    }

    fn stage() -> StageDefinition {
        StageDefinition {
            name: "Goblin Camp".into(),
            description: String::new(),
            pool: vec![
                guard(),
                EnemyDefinition {
                    name: "Goblin Archer".into(),
                    hp: 22,
                    abilities: vec![EnemyAbility::new("Arrow Shot", 1.0).damage(DiceSpec::new(1, 8))],
                    phases: Vec::new(),
                },
            ],
            boss: EnemyDefinition {
                name: "Goblin Chieftain".into(),
                hp: 72,
                abilities: vec![
                    EnemyAbility::new("Cleave", 3.0).damage(DiceSpec::new(1, 8).plus(2)),
                ],
                phases: Vec::new(),
            },
            adds: vec![guard(), guard()],
        }
    }

    #[test]
    fn duplicates_get_letter_suffixes() {
        let config = BattleConfig::default();
        let enemies = EncounterBuilder::new(&config, 0).boss(&stage());

        let names: Vec<&str> = enemies.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Goblin Chieftain", "Goblin Guard A", "Goblin Guard B"]);
        assert!(enemies[0].is_boss);
        assert!(!enemies[1].is_boss);
        assert_eq!(enemies[1].definition_name, "Goblin Guard");
        let ids: Vec<u64> = enemies.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn mob_size_and_picks_follow_the_rng() {
        let config = BattleConfig::default();
        // size pick 2 -> five enemies, then pool picks
        let mut rng = ScriptedRng::new().with_picks([2, 1, 0, 1, 1, 1]);
        let enemies = EncounterBuilder::new(&config, 0).mob(&stage(), &mut rng);

        let names: Vec<&str> = enemies.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Goblin Archer A",
                "Goblin Guard",
                "Goblin Archer B",
                "Goblin Archer C",
                "Goblin Archer D"
            ]
        );
    }

    #[test]
    fn area_scaling_floors_hp_and_grows_modifiers() {
        let config = BattleConfig::default();
        // Mountain: x1.2
        let enemies = EncounterBuilder::new(&config, 1).boss(&stage());
        let chieftain = &enemies[0];
        // 72 * 1.2 = 86.4
        assert_eq!(chieftain.max_hp, 86);
        assert_eq!(chieftain.hp, 86);
        // 2 + floor(2 * 0.2)
        assert_eq!(chieftain.abilities[0].damage.map(|d| d.modifier), Some(2));

        // Abyss: x1.7, modifier-less dice grow from a base of 1
        let mut rng = ScriptedRng::new().with_picks([0, 1, 1, 1]);
        let archers = EncounterBuilder::new(&config, 3).mob(&stage(), &mut rng);
        // 22 * 1.7 = 37.4
        assert_eq!(archers[0].max_hp, 37);
        assert_eq!(archers[0].abilities[0].damage.map(|d| d.modifier), Some(0));
        assert_eq!(chieftain_modifier(&config, 3), Some(3));
    }

    fn chieftain_modifier(config: &BattleConfig, area: usize) -> Option<i32> {
        EncounterBuilder::new(config, area).boss(&stage())[0].abilities[0]
            .damage
            .map(|d| d.modifier)
    }

    #[test]
    fn easy_mode_ceils_on_top_of_area_scaling() {
        let config = BattleConfig::default();
        let enemies = EncounterBuilder::new(&config, 0)
            .easy_mode(true)
            .boss(&stage());
        // 72 * 0.7 = 50.4
        assert_eq!(enemies[0].max_hp, 51);
        // ceil(2 * 0.7)
        assert_eq!(enemies[0].abilities[0].damage.map(|d| d.modifier), Some(2));
        // 28 * 0.7 = 19.6
        assert_eq!(enemies[1].max_hp, 20);
        // ceil(1 * 0.7)
        assert_eq!(enemies[1].abilities[0].damage.map(|d| d.modifier), Some(1));
    }

    #[test]
    fn third_battle_is_the_boss() {
        assert!(!EncounterBuilder::is_boss_battle(0));
        assert!(!EncounterBuilder::is_boss_battle(1));
        assert!(EncounterBuilder::is_boss_battle(2));

        let config = BattleConfig::default();
        let mut rng = ScriptedRng::new();
        let enemies = EncounterBuilder::new(&config, 0).for_battle(&stage(), 2, &mut rng);
        assert_eq!(enemies.len(), 3);
    }
}
