//! Victory rewards.
use crate::class::PassiveHook;
use crate::dice::RngOracle;
use crate::ids::CharacterId;
use crate::state::Battle;

use super::context::{percent_floor, scale};
use super::{ActionError, BattleEnv};

/// XP for every recipient plus party gold.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rewards {
    /// Granted to each recipient.
    pub xp: u32,
    /// Granted once to the party.
    pub gold: u32,
    /// Every participant, alive or not.
    pub recipients: Vec<CharacterId>,
}

/// Computes the rewards for a won battle.
///
/// `xp = base + total enemy max HP / divisor` and `gold = roll`, both scaled
/// by the run area's multiplier, then gold bonuses from living participants.
/// Bonuses from several living carriers do not stack; the largest applies.
pub fn calculate_rewards(
    battle: &Battle,
    env: &BattleEnv<'_>,
    rng: &mut dyn RngOracle,
) -> Result<Rewards, ActionError> {
    let rules = &env.config.reward;
    let total_hp: u32 = battle.enemies.iter().map(|enemy| enemy.max_hp).sum();
    let base_xp = rules.base_xp + total_hp.checked_div(rules.xp_hp_divisor).unwrap_or(0);
    let base_gold = rules.gold.roll(rng);

    let multiplier = env.area.map_or(1.0, |area| rules.area_multiplier(area));
    let xp = scale(base_xp, multiplier);
    let mut gold = scale(base_gold, multiplier);

    let mut bonus = 0;
    for participant in battle.participants.iter().filter(|p| p.is_alive()) {
        let profile = env
            .classes
            .profile(participant.character.class)
            .ok_or(ActionError::UnknownClass(participant.character.class))?;
        for hook in &profile.passive.hooks {
            if let PassiveHook::GoldBonus { percent } = *hook {
                bonus = bonus.max(percent);
            }
        }
    }
    if bonus > 0 {
        gold = percent_floor(gold, 100 + bonus);
    }

    Ok(Rewards {
        xp,
        gold,
        recipients: battle.participants.iter().map(|p| p.id()).collect(),
    })
}
