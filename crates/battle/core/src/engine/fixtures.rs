//! Small class catalog and enemy roster for engine tests.
use crate::ability::{AbilityDef, AbilityEffect, DebuffSpec, Repeat, SelfBuffSpec, StrikeSpec};
use crate::class::{
    CharacterClass, ClassOracle, ClassPassive, ClassProfile, PassiveHook, ResourceKind,
    ResourcePool,
};
use crate::dice::DiceSpec;
use crate::enemy::{BossPhase, Enemy, EnemyAbility, EnemyDefinition};
use crate::ids::{BattleId, CharacterId, EnemyId, PartyId};
use crate::state::{Battle, BattleSetup, CharacterSheet, ParticipantOverride};
use crate::status::{EffectSpec, StatusEffectKind};

pub(crate) struct TestClasses(Vec<ClassProfile>);

impl ClassOracle for TestClasses {
    fn profile(&self, class: CharacterClass) -> Option<&ClassProfile> {
        self.0.iter().find(|profile| profile.class == class)
    }
}

fn profile(
    class: CharacterClass,
    base: ResourcePool,
    hooks: Vec<PassiveHook>,
    abilities: Vec<AbilityDef>,
) -> ClassProfile {
    ClassProfile {
        class,
        base,
        per_level: ResourcePool::new(8, 3, 3),
        passive: ClassPassive {
            name: format!("{class} passive"),
            description: String::new(),
            hooks,
        },
        abilities,
    }
}

fn strike(dice: DiceSpec) -> AbilityEffect {
    AbilityEffect::Strike(StrikeSpec::new(dice))
}

pub(crate) fn classes() -> TestClasses {
    use CharacterClass as C;
    use ResourceKind::{Mana, Stamina};

    TestClasses(vec![
        profile(
            C::Warrior,
            ResourcePool::new(60, 40, 0),
            vec![PassiveHook::MaxHpBonus { percent: 10 }],
            vec![
                AbilityDef::new("Slash", 1, 10, Stamina).with(strike(DiceSpec::new(2, 6).plus(3))),
                AbilityDef::new("Shield Wall", 3, 15, Stamina).with(AbilityEffect::SelfBuff(
                    SelfBuffSpec::ShieldUntilHit { reduction: 50 },
                )),
                AbilityDef::new("Whirlwind", 6, 20, Stamina).with(AbilityEffect::Strike(
                    StrikeSpec::new(DiceSpec::new(2, 6)).area(),
                )),
                AbilityDef::new("Riposte", 1, 15, Stamina).with(AbilityEffect::SelfBuff(
                    SelfBuffSpec::Parry {
                        max_per_level: 3,
                        reflect_percent: 50,
                    },
                )),
            ],
        ),
        profile(
            C::Marksman,
            ResourcePool::new(45, 45, 0),
            Vec::new(),
            vec![AbilityDef::new("Volley", 1, 10, Stamina).with(AbilityEffect::Strike(
                StrikeSpec::new(DiceSpec::new(1, 6))
                    .area()
                    .repeat(Repeat::TwiceIfMarked),
            ))],
        ),
        profile(
            C::Berserker,
            ResourcePool::new(55, 45, 0),
            vec![PassiveHook::MissingHpDamageBonus { percent: 2 }],
            vec![
                AbilityDef::new("Frenzy", 1, 0, Stamina).with(AbilityEffect::Toggle {
                    kind: StatusEffectKind::Frenzy,
                    value: 50,
                }),
                AbilityDef::new("Reckless Strike", 1, 10, Stamina)
                    .with(strike(DiceSpec::new(2, 8)))
                    .with(AbilityEffect::Recoil(DiceSpec::new(1, 4))),
            ],
        ),
        profile(
            C::Rogue,
            ResourcePool::new(45, 50, 0),
            vec![PassiveHook::CritChanceBonus { percent: 15 }],
            vec![
                AbilityDef::new("Backstab", 1, 10, Stamina).with(AbilityEffect::Strike(
                    StrikeSpec::new(DiceSpec::new(2, 6)).crit(10),
                )),
                AbilityDef::new("Assassinate", 1, 20, Stamina)
                    .with(AbilityEffect::Strike(
                        StrikeSpec::new(DiceSpec::new(3, 6)).auto_crit_if_full_hp(),
                    ))
                    .with(AbilityEffect::LockoutThisRound),
                AbilityDef::new("Twin Fangs", 1, 15, Stamina).with(AbilityEffect::Strike(
                    StrikeSpec::new(DiceSpec::new(1, 6)).repeat(Repeat::Twice),
                )),
            ],
        ),
        profile(
            C::Cleric,
            ResourcePool::new(45, 0, 50),
            vec![PassiveHook::HealingBonus { percent: 20 }],
            vec![AbilityDef::new("Heal", 1, 10, Mana).with(AbilityEffect::Heal(
                DiceSpec::new(2, 8).plus(5),
            ))],
        ),
        profile(
            C::Mage,
            ResourcePool::new(40, 0, 60),
            vec![PassiveHook::RecoveryMultiplier {
                resource: Mana,
                factor: 2,
            }],
            vec![
                AbilityDef::new("Lightning Bolt", 1, 20, Mana)
                    .with(strike(DiceSpec::new(2, 6)))
                    .with(AbilityEffect::RefundOnKill { percent: 50 }),
            ],
        ),
        profile(
            C::Warlock,
            ResourcePool::new(45, 0, 55),
            vec![PassiveHook::PoisonOnCurse { sides: 4, turns: 3 }],
            vec![AbilityDef::new("Hex", 1, 10, Mana).with(AbilityEffect::Debuff(
                DebuffSpec::Slow { turns: 2 },
            ))],
        ),
        profile(
            C::Druid,
            ResourcePool::new(50, 0, 50),
            vec![PassiveHook::Thorns { per_level: 2 }],
            Vec::new(),
        ),
        profile(
            C::Paladin,
            ResourcePool::new(60, 30, 30),
            vec![PassiveHook::LowHealthMitigation {
                percent: 10,
                below_percent: 50,
            }],
            Vec::new(),
        ),
        profile(
            C::Spellblade,
            ResourcePool::new(50, 30, 30),
            vec![PassiveHook::ManaFromDamage { percent: 20 }],
            vec![AbilityDef::new("Arcane Slash", 1, 10, Stamina).with(strike(DiceSpec::new(2, 6)))],
        ),
        profile(
            C::Bard,
            ResourcePool::new(45, 30, 30),
            vec![PassiveHook::GoldBonus { percent: 25 }],
            vec![
                AbilityDef::new("Quickstep", 1, 10, Stamina)
                    .with(AbilityEffect::SelfBuff(SelfBuffSpec::Haste)),
            ],
        ),
    ])
}

pub(crate) fn sheet(id: u64, class: CharacterClass, level: u32) -> CharacterSheet {
    let stats = classes()
        .profile(class)
        .map(|profile| profile.stats_at_level(level))
        .unwrap_or_default();
    CharacterSheet {
        id: CharacterId(id),
        name: format!("{class} {id}"),
        class,
        level,
        max_hp: stats.hp,
        max_stamina: stats.stamina,
        max_mana: stats.mana,
    }
}

pub(crate) fn goblin(id: u64) -> Enemy {
    let definition = EnemyDefinition {
        name: "Goblin Warrior".into(),
        hp: 25,
        abilities: vec![EnemyAbility::new("Club", 1.0).damage(DiceSpec::new(1, 6))],
        phases: Vec::new(),
    };
    Enemy::spawn(EnemyId(id), &definition, false)
}

/// Never hurts anyone.
pub(crate) fn dummy(id: u64) -> Enemy {
    let definition = EnemyDefinition {
        name: "Training Dummy".into(),
        hp: 200,
        abilities: vec![EnemyAbility::new("Wobble", 1.0)],
        phases: Vec::new(),
    };
    Enemy::spawn(EnemyId(id), &definition, false)
}

pub(crate) fn shaman(id: u64) -> Enemy {
    let definition = EnemyDefinition {
        name: "Cave Shaman".into(),
        hp: 30,
        abilities: vec![
            EnemyAbility::new("Hex Storm", 1.0)
                .damage(DiceSpec::new(1, 4))
                .area(),
        ],
        phases: Vec::new(),
    };
    Enemy::spawn(EnemyId(id), &definition, false)
}

pub(crate) fn drake(id: u64) -> Enemy {
    let definition = EnemyDefinition {
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
    };
    Enemy::spawn(EnemyId(id), &definition, true)
}

pub(crate) struct BattleBuilder {
    setup: BattleSetup,
}

impl BattleBuilder {
    pub(crate) fn new() -> Self {
        Self {
            setup: BattleSetup {
                id: BattleId(1),
                party_id: PartyId(1),
                run_id: None,
                members: Vec::new(),
                enemies: Vec::new(),
                overrides: Vec::new(),
                initial_effects: Vec::new(),
                easy_mode: false,
            },
        }
    }

    pub(crate) fn member(mut self, id: u64, class: CharacterClass, level: u32) -> Self {
        self.setup.members.push(sheet(id, class, level));
        self
    }

    pub(crate) fn enemy(mut self, enemy: Enemy) -> Self {
        self.setup.enemies.push(enemy);
        self
    }

    pub(crate) fn carried(mut self, id: u64, hp: u32, stamina: u32, mana: u32) -> Self {
        self.setup.overrides.push(ParticipantOverride {
            character_id: CharacterId(id),
            current_hp: hp,
            current_stamina: stamina,
            current_mana: mana,
        });
        self
    }

    pub(crate) fn effect(mut self, spec: EffectSpec) -> Self {
        self.setup.initial_effects.push(spec);
        self
    }

    pub(crate) fn build(self) -> Battle {
        match Battle::start(self.setup) {
            Ok(battle) => battle,
            Err(err) => panic!("invalid test battle: {err}"),
        }
    }
}
