use crate::dice::DiceSpec;

/// Battle rules tunables.
///
/// Compile-time capacities are associated constants; everything else can be
/// overridden from a TOML file (see `battle-content`'s `ConfigLoader`).
/// Missing fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Share of max stamina restored by resting.
    pub rest_percent: u32,
    /// Share of max mana restored by meditating.
    pub meditate_percent: u32,

    /// Enemies below this HP percentage prefer a healing move if they have one.
    pub enemy_heal_threshold_percent: u32,
    /// Damage used when an enemy ability reaches the attack branch without dice.
    pub enemy_fallback_damage: DiceSpec,

    pub basic_attack: BasicAttackDice,
    /// Number of basic attack dice in easy mode.
    pub easy_mode_basic_attack_dice: u32,

    pub reward: RewardRules,

    /// Poison dice count by character level: `(min_level, dice)`, ascending.
    pub poison_scaling: Vec<(u32, u32)>,

    /// Enemy HP/damage multiplier per area.
    pub area_enemy_scaling: Vec<f64>,
    /// Extra enemy multiplier per area for easy-mode parties, applied on top
    /// of `area_enemy_scaling`.
    pub easy_mode_enemy_scaling: Vec<f64>,
}

/// Basic attack die size by archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BasicAttackDice {
    pub martial_sides: u32,
    pub caster_sides: u32,
    pub gish_sides: u32,
}

impl Default for BasicAttackDice {
    fn default() -> Self {
        Self {
            martial_sides: 4,
            caster_sides: 2,
            gish_sides: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RewardRules {
    pub base_xp: u32,
    /// XP adds total enemy max HP divided by this.
    pub xp_hp_divisor: u32,
    pub gold: DiceSpec,
    /// Reward multiplier per area, indexed by the run's area.
    pub area_multipliers: Vec<f64>,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            base_xp: BattleConfig::DEFAULT_BASE_XP,
            xp_hp_divisor: 2,
            gold: DiceSpec::new(2, 10).plus(10),
            area_multipliers: vec![1.0, 1.5, 2.0, 3.0],
        }
    }
}

impl RewardRules {
    pub fn area_multiplier(&self, area: usize) -> f64 {
        self.area_multipliers.get(area).copied().unwrap_or(1.0)
    }
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_PARTY_SIZE: usize = 4;
    pub const MAX_LEVEL: u32 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RECOVERY_PERCENT: u32 = 50;
    pub const DEFAULT_HEAL_THRESHOLD_PERCENT: u32 = 50;
    pub const DEFAULT_BASE_XP: u32 = 20;

    pub fn new() -> Self {
        Self {
            rest_percent: Self::DEFAULT_RECOVERY_PERCENT,
            meditate_percent: Self::DEFAULT_RECOVERY_PERCENT,
            enemy_heal_threshold_percent: Self::DEFAULT_HEAL_THRESHOLD_PERCENT,
            enemy_fallback_damage: DiceSpec::new(1, 4).plus(1),
            basic_attack: BasicAttackDice::default(),
            easy_mode_basic_attack_dice: 2,
            reward: RewardRules::default(),
            poison_scaling: vec![(1, 1), (5, 2), (9, 3)],
            area_enemy_scaling: vec![1.0, 1.2, 1.4, 1.7],
            easy_mode_enemy_scaling: vec![0.7, 0.9, 1.0, 1.2],
        }
    }

    /// Poison dice count for a character of `level`.
    pub fn poison_dice(&self, level: u32) -> u32 {
        self.poison_scaling
            .iter()
            .take_while(|(min_level, _)| level >= *min_level)
            .last()
            .map_or(1, |(_, dice)| *dice)
    }

    pub fn area_scaling(&self, area: usize) -> f64 {
        self.area_enemy_scaling.get(area).copied().unwrap_or(1.0)
    }

    pub fn easy_mode_scaling(&self, area: usize) -> f64 {
        self.easy_mode_enemy_scaling.get(area).copied().unwrap_or(1.0)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
