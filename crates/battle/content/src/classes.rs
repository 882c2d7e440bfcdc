//! The twelve playable classes.
//!
//! Numbers here are balance data. The engine never matches on a class or an
//! ability name; everything class specific is expressed as [`PassiveHook`]s
//! and [`AbilityEffect`]s.
use battle_core::{
    AbilityDef, AbilityEffect, CharacterClass, ClassOracle, ClassPassive, ClassProfile, DebuffSpec,
    DiceSpec, PartyBuffSpec, PassiveHook, Repeat, ResourceKind, ResourcePool, SelfBuffSpec,
    StatusEffectKind, StrikeSpec,
};

use ResourceKind::{Mana, Stamina};

/// Class catalog backing [`ClassOracle`].
#[derive(Clone, Debug)]
pub struct ClassCatalog {
    profiles: Vec<ClassProfile>,
}

impl ClassCatalog {
    /// The shipped class roster.
    pub fn standard() -> Self {
        Self {
            profiles: CharacterClass::ALL.into_iter().map(profile).collect(),
        }
    }

    pub fn from_profiles(profiles: Vec<ClassProfile>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[ClassProfile] {
        &self.profiles
    }

    /// Maximum HP, stamina and mana for a character of `class` at `level`.
    pub fn stats_at_level(&self, class: CharacterClass, level: u32) -> Option<ResourcePool> {
        self.profile(class)
            .map(|profile| profile.stats_at_level(level))
    }

    pub fn abilities_at_level(&self, class: CharacterClass, level: u32) -> Vec<&AbilityDef> {
        self.profile(class)
            .map(|profile| profile.abilities_at_level(level).collect())
            .unwrap_or_default()
    }
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassOracle for ClassCatalog {
    fn profile(&self, class: CharacterClass) -> Option<&ClassProfile> {
        self.profiles.iter().find(|profile| profile.class == class)
    }
}

fn d(count: u32, sides: u32) -> DiceSpec {
    DiceSpec::new(count, sides)
}

fn strike(dice: DiceSpec) -> AbilityEffect {
    AbilityEffect::Strike(StrikeSpec::new(dice))
}

fn area(dice: DiceSpec) -> AbilityEffect {
    AbilityEffect::Strike(StrikeSpec::new(dice).area())
}

fn weaken(percent: u32, turns: u32) -> AbilityEffect {
    AbilityEffect::Debuff(DebuffSpec::Weaken { percent, turns })
}

fn passive(name: &str, description: &str, hook: PassiveHook) -> ClassPassive {
    ClassPassive {
        name: name.into(),
        description: description.into(),
        hooks: vec![hook],
    }
}

fn profile(class: CharacterClass) -> ClassProfile {
    let (base, per_level) = stats(class);
    ClassProfile {
        class,
        base,
        per_level,
        passive: class_passive(class),
        abilities: abilities(class),
    }
}

/// Base pool and per-level gains.
fn stats(class: CharacterClass) -> (ResourcePool, ResourcePool) {
    use CharacterClass::*;
    let (base, gain) = match class {
        Warrior => ((60, 40, 0), (8, 3, 0)),
        Berserker => ((55, 45, 0), (7, 4, 0)),
        Rogue => ((50, 45, 0), (6, 4, 0)),
        Marksman => ((55, 40, 0), (7, 3, 0)),
        Mage => ((40, 0, 60), (5, 0, 5)),
        Cleric => ((45, 0, 60), (6, 0, 5)),
        Warlock => ((45, 0, 65), (5, 0, 6)),
        Druid => ((50, 0, 60), (6, 0, 5)),
        Paladin => ((55, 35, 45), (7, 2, 3)),
        Spellblade => ((50, 35, 40), (6, 2, 3)),
        DarkKnight => ((55, 40, 30), (7, 3, 2)),
        Bard => ((45, 38, 50), (5, 2, 3)),
    };
    (
        ResourcePool::new(base.0, base.1, base.2),
        ResourcePool::new(gain.0, gain.1, gain.2),
    )
}

fn class_passive(class: CharacterClass) -> ClassPassive {
    use CharacterClass::*;
    match class {
        Warrior => passive(
            "Resilient",
            "+10% max HP",
            PassiveHook::MaxHpBonus { percent: 10 },
        ),
        Berserker => passive(
            "Bloodletter",
            "+2% damage per 10% missing HP",
            PassiveHook::MissingHpDamageBonus { percent: 2 },
        ),
        Rogue => passive(
            "Surgical Precision",
            "+15% crit chance",
            PassiveHook::CritChanceBonus { percent: 15 },
        ),
        Marksman => passive(
            "Sharpshooter",
            "+10% damage when Hunter's Mark active",
            PassiveHook::MarkedTargetDamageBonus { percent: 10 },
        ),
        Mage => passive(
            "Disciplined",
            "Meditate gives double mana back",
            PassiveHook::RecoveryMultiplier {
                resource: Mana,
                factor: 2,
            },
        ),
        Cleric => passive(
            "Benediction",
            "+20% healing done",
            PassiveHook::HealingBonus { percent: 20 },
        ),
        Warlock => passive(
            "Power in Misery",
            "Debuffed enemies also get poisoned for 3 turns",
            PassiveHook::PoisonOnCurse { sides: 4, turns: 3 },
        ),
        Druid => passive(
            "Thorns",
            "Enemies that hit the Druid take 2x level damage",
            PassiveHook::Thorns { per_level: 2 },
        ),
        Paladin => passive(
            "Shield of Faith",
            "10% less damage taken when below 50% HP",
            PassiveHook::LowHealthMitigation {
                percent: 10,
                below_percent: 50,
            },
        ),
        Spellblade => passive(
            "Spellvamp",
            "Grants 20% of damage dealt as mana",
            PassiveHook::ManaFromDamage { percent: 20 },
        ),
        DarkKnight => passive(
            "Goredrinker",
            "Abilities heal for 20% of damage dealt",
            PassiveHook::LifestealBonus { percent: 20 },
        ),
        Bard => passive(
            "Treasure Hunter",
            "+25% gold gained from battles",
            PassiveHook::GoldBonus { percent: 25 },
        ),
    }
}

fn abilities(class: CharacterClass) -> Vec<AbilityDef> {
    use CharacterClass::*;
    match class {
        // ===== martial =====
        Warrior => vec![
            AbilityDef::new("Slash", 1, 10, Stamina)
                .describe("A powerful sword slash")
                .with(strike(d(2, 6).plus(3))),
            AbilityDef::new("Shield Bash", 3, 15, Stamina)
                .describe("Bash with shield, dazing the target and reducing their damage")
                .with(strike(d(1, 8).plus(2)))
                .with(weaken(50, 1)),
            AbilityDef::new("Rallying Cry", 6, 20, Stamina)
                .describe("Rally yourself or a target ally, healing them and boosting your damage")
                .with(AbilityEffect::Heal(d(2, 6).plus(5)))
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::DamageBuff {
                    percent: 25,
                    turns: 2,
                })),
            AbilityDef::new("Bladestorm", 10, 35, Stamina)
                .describe("A devastating whirlwind of blades")
                .with(area(d(4, 8).plus(5))),
        ],
        Berserker => vec![
            AbilityDef::new("Cleave", 1, 10, Stamina)
                .describe("A wild axe swing")
                .with(area(d(2, 6).plus(2))),
            AbilityDef::new("Frenzy", 3, 0, Stamina)
                .describe("Toggle: +50% damage dealt, +25% damage taken")
                .with(AbilityEffect::Toggle {
                    kind: StatusEffectKind::Frenzy,
                    value: 50,
                }),
            AbilityDef::new("Blood Fury", 6, 25, Stamina)
                .describe("Furious strike that heals from bloodlust")
                .with(AbilityEffect::Strike(
                    StrikeSpec::new(d(2, 8).plus(3)).lifesteal(25),
                )),
            AbilityDef::new("Reckless Abandon", 10, 40, Stamina)
                .describe("Massive blow that damages self")
                .with(strike(d(4, 10)))
                .with(AbilityEffect::Recoil(d(2, 6))),
        ],
        Rogue => vec![
            AbilityDef::new("Backstab", 1, 10, Stamina)
                .describe("Strike from the shadows with high crit chance")
                .with(AbilityEffect::Strike(StrikeSpec::new(d(1, 6).plus(2)).crit(30))),
            AbilityDef::new("Parry & Riposte", 3, 15, Stamina)
                .describe("Parry next attack, reflect half of blocked damage")
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::Parry {
                    max_per_level: 3,
                    reflect_percent: 50,
                })),
            AbilityDef::new("Poisoned Blade", 6, 20, Stamina)
                .describe("Envenomed strike that poisons the target")
                .with(strike(d(1, 8).plus(2)))
                .with(AbilityEffect::Debuff(DebuffSpec::Poison { sides: 4, turns: 3 })),
            AbilityDef::new("Assassinate", 10, 35, Stamina)
                .describe(
                    "Lethal strike, auto-crits if target is at full HP. \
                     Can't use abilities next turn.",
                )
                .with(AbilityEffect::Strike(
                    StrikeSpec::new(d(3, 8)).auto_crit_if_full_hp(),
                ))
                .with(AbilityEffect::LockoutThisRound),
        ],
        Marksman => vec![
            AbilityDef::new("Precise Shot", 1, 10, Stamina)
                .describe("A carefully aimed shot")
                .with(strike(d(2, 6))),
            AbilityDef::new("Hunter's Mark", 3, 15, Stamina)
                .describe("Mark the target, boosting all party damage")
                .with(AbilityEffect::Debuff(DebuffSpec::HuntersMark {
                    percent: 25,
                    turns: 3,
                })),
            AbilityDef::new("Pinning Shot", 6, 20, Stamina)
                .describe("Pin the target, reducing their damage")
                .with(strike(d(1, 8).plus(2)))
                .with(weaken(25, 2)),
            AbilityDef::new("Rain of Arrows", 10, 35, Stamina)
                .describe("Volley of arrows, hits marked targets twice")
                .with(AbilityEffect::Strike(
                    StrikeSpec::new(d(4, 6)).area().repeat(Repeat::TwiceIfMarked),
                )),
        ],

        // ===== caster =====
        Mage => vec![
            AbilityDef::new("Firebolt", 1, 10, Mana)
                .describe("Hurl a bolt of fire that sets the target ablaze")
                .with(strike(d(2, 6).plus(2)))
                .with(AbilityEffect::Debuff(DebuffSpec::Burn {
                    dice: d(1, 4),
                    turns: 2,
                })),
            AbilityDef::new("Frost Nova", 3, 15, Mana)
                .describe("Chill the target, slowing it")
                .with(strike(d(1, 8)))
                .with(AbilityEffect::Debuff(DebuffSpec::Slow { turns: 2 })),
            AbilityDef::new("Lightning Bolt", 6, 25, Mana)
                .describe("A crackling bolt. Refunds half its mana if it kills")
                .with(strike(d(3, 8)))
                .with(AbilityEffect::RefundOnKill { percent: 50 }),
            AbilityDef::new("Meteor", 10, 40, Mana)
                .describe("Call down a meteor on every enemy")
                .with(area(d(5, 8).plus(5))),
        ],
        Cleric => vec![
            AbilityDef::new("Prayer", 1, 15, Mana)
                .describe("Heal yourself or an ally")
                .with(AbilityEffect::Heal(d(2, 6).plus(3))),
            AbilityDef::new("Divine Shield", 3, 20, Mana)
                .describe("Halve the next hit you take")
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::ShieldUntilHit {
                    reduction: 50,
                })),
            AbilityDef::new("Heavenstrike", 6, 25, Mana)
                .describe("Holy strike, stronger for every ally standing")
                .with(AbilityEffect::Strike(
                    StrikeSpec::new(d(2, 8)).extra_per_ally(d(1, 6)),
                )),
            AbilityDef::new("Consecration", 10, 45, Mana)
                .describe("Heal and sap the target's strength")
                .with(AbilityEffect::Heal(d(3, 8).plus(5)))
                .with(weaken(50, 3)),
        ],
        Warlock => vec![
            AbilityDef::new("Hex", 1, 12, Mana)
                .describe("Blind the target")
                .with(AbilityEffect::Debuff(DebuffSpec::Blind {
                    chance: 50,
                    turns: 3,
                })),
            AbilityDef::new("Life Drain", 3, 18, Mana)
                .describe("Drain the target's life")
                .with(AbilityEffect::Strike(StrikeSpec::new(d(2, 6)).lifesteal(50))),
            AbilityDef::new("Curse of Misery", 6, 28, Mana)
                .describe("Curse every enemy, weakening their attacks")
                .with(area(d(1, 8)))
                .with(weaken(50, 2)),
            AbilityDef::new("Drain Soul", 10, 40, Mana)
                .describe("Tear out the target's soul at a cost to your own")
                .with(AbilityEffect::Strike(StrikeSpec::new(d(4, 8)).lifesteal(75)))
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::Weakness {
                    dice: d(1, 4).plus(2),
                    turns: 3,
                })),
        ],
        Druid => vec![
            AbilityDef::new("Beast Claw", 1, 12, Mana)
                .describe("Rake the target with bestial claws")
                .with(strike(d(1, 8).plus(1))),
            AbilityDef::new("Regrowth", 3, 16, Mana)
                .describe("Heal yourself or an ally")
                .with(AbilityEffect::Heal(d(1, 8).plus(2))),
            AbilityDef::new("Entangle", 6, 24, Mana)
                .describe("Roots hold the target, reducing its damage")
                .with(strike(d(1, 8)))
                .with(weaken(40, 2)),
            AbilityDef::new("Spore Cloud", 10, 38, Mana)
                .describe("Poisonous spores engulf every enemy")
                .with(area(d(2, 6)))
                .with(AbilityEffect::Debuff(DebuffSpec::Poison { sides: 4, turns: 3 })),
        ],

        // ===== gish =====
        Paladin => vec![
            AbilityDef::new("Blinding Smite", 1, 10, Stamina)
                .describe("A radiant strike that may blind")
                .with(strike(d(2, 6).plus(2)))
                .with(AbilityEffect::Debuff(DebuffSpec::Blind {
                    chance: 50,
                    turns: 2,
                })),
            AbilityDef::new("Healing Hands", 3, 15, Mana)
                .describe("Heal yourself or an ally")
                .with(AbilityEffect::Heal(d(1, 8).plus(3))),
            AbilityDef::new("Crusader Strike", 6, 20, Stamina)
                .describe("A heavy righteous blow")
                .with(strike(d(2, 8).plus(2))),
            AbilityDef::new("Divine Judgment", 10, 40, Mana)
                .describe("Judge the target, healing from the blow and weakening it")
                .with(AbilityEffect::Strike(StrikeSpec::new(d(4, 6)).lifesteal(50)))
                .with(weaken(25, 2)),
        ],
        Spellblade => vec![
            AbilityDef::new("Fire Slash", 1, 10, Stamina)
                .describe("A flaming cut that burns")
                .with(strike(d(2, 8).plus(2)))
                .with(AbilityEffect::Debuff(DebuffSpec::Burn {
                    dice: d(1, 4),
                    turns: 2,
                })),
            AbilityDef::new("Magical Surge", 3, 15, Mana)
                .describe("A burst of raw arcane force")
                .with(strike(d(2, 8))),
            AbilityDef::new("Wind Dance", 6, 20, Stamina)
                .describe("Strike twice in a blur")
                .with(AbilityEffect::Strike(
                    StrikeSpec::new(d(2, 6).plus(3)).repeat(Repeat::Twice),
                )),
            AbilityDef::new("Arcane Burst", 10, 40, Mana)
                .describe("Arcane explosion hitting every enemy")
                .with(area(d(5, 8))),
        ],
        DarkKnight => vec![
            AbilityDef::new("Shadow Strike", 1, 10, Stamina)
                .describe("A strike wreathed in shadow")
                .with(strike(d(2, 6).plus(2))),
            AbilityDef::new("Marked for Death", 3, 15, Mana)
                .describe("Empower the whole party's attacks")
                .with(AbilityEffect::PartyBuff(PartyBuffSpec::DamageBuff {
                    percent: 20,
                    turns: 3,
                })),
            AbilityDef::new("Blood Sacrifice", 6, 20, Stamina)
                .describe("Spill your own blood for power")
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::DamageBuff {
                    percent: 25,
                    turns: 2,
                }))
                .with(AbilityEffect::Recoil(d(2, 4).plus(3))),
            AbilityDef::new("Eternal Darkness", 10, 40, Mana)
                .describe("Engulf the target, leaving it vulnerable")
                .with(strike(d(4, 6)))
                .with(AbilityEffect::Debuff(DebuffSpec::Vulnerability {
                    percent: 25,
                    turns: 3,
                })),
        ],
        Bard => vec![
            AbilityDef::new("Bardic Inspiration", 1, 12, Stamina)
                .describe("Inspire the party to hit harder")
                .with(AbilityEffect::PartyBuff(PartyBuffSpec::DamageBuff {
                    percent: 20,
                    turns: 2,
                })),
            AbilityDef::new("Healing Tune", 3, 16, Mana)
                .describe("Heal yourself or an ally")
                .with(AbilityEffect::Heal(d(1, 8).plus(2))),
            AbilityDef::new("Swift Step", 6, 18, Stamina)
                .describe("Quicken your step and help the party dodge")
                .with(AbilityEffect::SelfBuff(SelfBuffSpec::Haste))
                .with(AbilityEffect::PartyBuff(PartyBuffSpec::Evasion {
                    percent: 25,
                    turns: 2,
                })),
            AbilityDef::new("Crescendo", 10, 42, Mana)
                .describe("A rousing finale that strikes, heals and empowers")
                .with(strike(d(4, 4)))
                .with(AbilityEffect::PartyBuff(PartyBuffSpec::DamageBuff {
                    percent: 40,
                    turns: 1,
                }))
                .with(AbilityEffect::Heal(d(2, 6))),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_class_unlocks_four_abilities_on_schedule() {
        let catalog = ClassCatalog::standard();
        assert_eq!(catalog.profiles().len(), CharacterClass::ALL.len());
        for profile in catalog.profiles() {
            let levels: Vec<u32> = profile.abilities.iter().map(|a| a.unlock_level).collect();
            assert_eq!(levels, [1, 3, 6, 10], "{}", profile.class);
        }
    }

    #[test]
    fn abilities_spend_resources_the_class_has() {
        for profile in ClassCatalog::standard().profiles() {
            for ability in &profile.abilities {
                assert!(
                    profile.class.uses(ability.cost.resource),
                    "{} cannot pay for {}",
                    profile.class,
                    ability.name
                );
            }
        }
    }

    #[test]
    fn warrior_hp_includes_resilience() {
        let catalog = ClassCatalog::standard();
        let level_one = catalog.stats_at_level(CharacterClass::Warrior, 1);
        assert_eq!(level_one, Some(ResourcePool::new(66, 40, 0)));
        // (60 + 8 * 9) * 1.1 = 145.2
        let level_ten = catalog.stats_at_level(CharacterClass::Warrior, 10);
        assert_eq!(level_ten.map(|s| s.hp), Some(145));
    }

    #[test]
    fn gish_classes_carry_both_pools() {
        let stats = ClassCatalog::standard()
            .stats_at_level(CharacterClass::Bard, 4)
            .unwrap_or_default();
        assert_eq!(stats, ResourcePool::new(60, 44, 59));
    }

    #[test]
    fn unlocked_list_grows_with_level() {
        let catalog = ClassCatalog::standard();
        let names: Vec<&str> = catalog
            .abilities_at_level(CharacterClass::Mage, 6)
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, ["Firebolt", "Frost Nova", "Lightning Bolt"]);
    }

    #[test]
    fn lightning_bolt_refunds_and_assassinate_locks_out() {
        let catalog = ClassCatalog::standard();
        let bolt = catalog
            .profile(CharacterClass::Mage)
            .and_then(|p| p.unlocked_ability("Lightning Bolt", 6));
        assert!(bolt.is_some_and(|a| a.has(&AbilityEffect::RefundOnKill { percent: 50 })));

        let assassinate = catalog
            .profile(CharacterClass::Rogue)
            .and_then(|p| p.unlocked_ability("assassinate", 10));
        assert!(assassinate.is_some_and(|a| a.has(&AbilityEffect::LockoutThisRound)));
    }
}
