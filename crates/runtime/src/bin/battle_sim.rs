//! Battle simulator.
//!
//! Builds a party, fights through one stage of an area (two mob battles, then
//! the boss) and prints every event. HP and resources carry over between
//! battles. Actions go through [`BattleService`] against the in-memory store,
//! so the whole stack runs end to end.
//!
//! # Environment
//!
//! - `SIM_PARTY`: comma-separated classes (default `Warrior,Cleric,Mage,Rogue`)
//! - `SIM_LEVEL`: party level (default 3)
//! - `SIM_AREA`: area index (default 0), used when `SIM_STAGE` is unset
//! - `SIM_STAGE`: stage name, e.g. `Goblin Camp`
//! - `SIM_EASY`: `true` for an easy-mode party
//! - `SIM_MAX_ROUNDS`: stop a battle after this many rounds (default 100)
//! - `SIM_JSON`: `true` to dump the last battle as JSON
//! - `BATTLE_SEED`, `BATTLE_DATA_DIR`: see [`RuntimeConfig`]
//!
//! ```bash
//! RUST_LOG=runtime::battle=debug SIM_STAGE="Dragon's Lair" cargo run -p battle-runtime --bin battle-sim
//! ```
use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use battle_content::{BATTLES_PER_AREA, ClassCatalog, EncounterBuilder};
use battle_core::{
    BattleConfig, BattleId, CharacterClass, CharacterId, CharacterSheet, ClassOracle, EnemyId,
    PartyId, PcgRng, PlayerAction, RecoveryKind, ResourceKind, RunId,
};
use battle_runtime::{
    BattleService, BattleView, CharacterRecord, InMemoryStore, ParticipantView, PartyRecord,
    RuntimeConfig, StartBattle,
};
use tracing_subscriber::EnvFilter;

const PARTY_ID: PartyId = PartyId(1);

struct SimSettings {
    party: Vec<CharacterClass>,
    level: u32,
    area: usize,
    stage: Option<String>,
    easy_mode: bool,
    max_rounds: u32,
    json: bool,
}

impl SimSettings {
    fn from_env() -> Result<Self> {
        let party = match env::var("SIM_PARTY") {
            Ok(list) => list
                .split(',')
                .map(|name| {
                    CharacterClass::from_str(name.trim())
                        .map_err(|_| anyhow!("unknown class '{}'", name.trim()))
                })
                .collect::<Result<Vec<_>>>()?,
            Err(_) => vec![
                CharacterClass::Warrior,
                CharacterClass::Cleric,
                CharacterClass::Mage,
                CharacterClass::Rogue,
            ],
        };
        Ok(Self {
            party,
            level: read_env::<u32>("SIM_LEVEL")
                .unwrap_or(3)
                .clamp(1, BattleConfig::MAX_LEVEL),
            area: read_env("SIM_AREA").unwrap_or(0),
            stage: env::var("SIM_STAGE").ok(),
            easy_mode: read_env("SIM_EASY").unwrap_or(false),
            max_rounds: read_env("SIM_MAX_ROUNDS").unwrap_or(100),
            json: read_env("SIM_JSON").unwrap_or(false),
        })
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let settings = SimSettings::from_env()?;
    let config = RuntimeConfig::from_env();
    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, level = settings.level, "starting simulation");

    let service = BattleService::builder()
        .config(config)
        .store(InMemoryStore::new())
        .build()?;
    let content = service.content();

    let party = build_party(&content.classes, &settings)?;
    service.roster().save_party(party.clone()).await?;

    let stage = match &settings.stage {
        Some(name) => content
            .areas
            .find_stage(name)
            .with_context(|| format!("no stage named '{name}'"))?,
        None => content
            .areas
            .stages()
            .find(|stage| stage.area_index == settings.area)
            .with_context(|| format!("area {} has no stages", settings.area))?,
    };
    println!(
        "{} at {} ({}): {}",
        party.name, stage.stage.name, stage.area.name, stage.stage.description
    );

    let mut rng = PcgRng::new(seed);
    let mut encounters =
        EncounterBuilder::new(&content.config, stage.area_index).easy_mode(settings.easy_mode);
    let mut carried = Vec::new();
    let mut last = None;

    for battle_index in 0..BATTLES_PER_AREA {
        let enemies = encounters.for_battle(stage.stage, battle_index, &mut rng);
        let names: Vec<&str> = enemies.iter().map(|enemy| enemy.name.as_str()).collect();
        println!("\n== Battle {} vs {} ==", battle_index + 1, names.join(", "));

        let request = StartBattle::new(party.id, enemies)
            .in_run(RunId(1), stage.area_index)
            .carry(carried);
        let battle = service.start_battle(request).await?;
        let view = autoplay(&service, battle.id, settings.max_rounds).await?;

        if !view.finished {
            println!("\nNo winner after {} rounds.", settings.max_rounds);
            last = Some(view);
            break;
        }
        if !view.won {
            println!("\nThe party falls in round {}.", view.turn);
            last = Some(view);
            break;
        }
        carried = view.carry_over();
        last = Some(view);
    }

    if let Some(party) = service.roster().party(PARTY_ID).await? {
        println!("\nParty gold: {}", party.gold);
        for member in &party.members {
            println!(
                "  {} ({}): {} XP, {} battles won",
                member.sheet.name, member.sheet.class, member.xp, member.battles_won
            );
        }
    }
    if settings.json {
        if let Some(view) = last {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

fn build_party(classes: &ClassCatalog, settings: &SimSettings) -> Result<PartyRecord> {
    let members = settings
        .party
        .iter()
        .enumerate()
        .map(|(index, class)| -> Result<CharacterRecord> {
            let stats = classes
                .stats_at_level(*class, settings.level)
                .with_context(|| format!("class {class} is not in the catalog"))?;
            Ok(CharacterRecord::new(CharacterSheet {
                id: CharacterId(index as u64 + 1),
                name: format!("{class} {}", index + 1),
                class: *class,
                level: settings.level,
                max_hp: stats.hp,
                max_stamina: stats.stamina,
                max_mana: stats.mana,
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PartyRecord {
        id: PARTY_ID,
        name: "The Simulated".into(),
        easy_mode: settings.easy_mode,
        gold: 0,
        members,
    })
}

async fn autoplay(service: &BattleService, id: BattleId, max_rounds: u32) -> Result<BattleView> {
    loop {
        let view = service
            .get_battle(id)
            .await?
            .with_context(|| format!("{id} disappeared"))?;
        if view.finished || view.turn > max_rounds {
            return Ok(view);
        }

        let Some(actor) = view.participants.iter().find(|p| p.hp > 0 && !p.has_acted) else {
            bail!("{id} is waiting on nobody");
        };
        let Some(target) = view.living_enemies().min_by_key(|enemy| enemy.hp).map(|e| e.id) else {
            bail!("{id} is unfinished without enemies");
        };

        let action = choose_action(&service.content().classes, &view, actor, target);
        let report = match service.execute(id, action).await {
            Ok(report) => report,
            Err(error) if !error.severity().is_internal() => {
                tracing::debug!(%error, "falling back to a basic attack");
                service
                    .use_basic_attack(id, actor.character_id, target)
                    .await?
            }
            Err(error) => return Err(error.into()),
        };
        for event in &report.events {
            println!("  {}", event.message);
        }
    }
}

/// Heal a badly hurt ally, else cast the priciest strike, else recover when
/// out of resources, else swing.
fn choose_action(
    classes: &ClassCatalog,
    view: &BattleView,
    actor: &ParticipantView,
    target: EnemyId,
) -> PlayerAction {
    let basic = PlayerAction::BasicAttack {
        actor: actor.character_id,
        target,
    };
    let Some(profile) = classes.profile(actor.class) else {
        return basic;
    };

    let usable: Vec<_> = actor
        .abilities
        .iter()
        .filter(|ability| ability.affordable && !actor.locked_out)
        .filter_map(|ability| profile.unlocked_ability(&ability.name, actor.level))
        .collect();

    let wounded = view
        .participants
        .iter()
        .filter(|p| p.hp > 0 && p.hp * 2 < p.max_hp)
        .min_by_key(|p| p.hp * 100 / p.max_hp.max(1));
    if let Some(ally) = wounded {
        if let Some(heal) = usable.iter().find(|ability| ability.heal().is_some()) {
            return PlayerAction::UseAbility {
                actor: actor.character_id,
                ability: heal.name.clone(),
                target_enemy: Some(target),
                target_ally: Some(ally.character_id),
            };
        }
    }

    if let Some(strike) = usable
        .iter()
        .filter(|ability| ability.strike().is_some())
        .max_by_key(|ability| ability.cost.amount)
    {
        return PlayerAction::UseAbility {
            actor: actor.character_id,
            ability: strike.name.clone(),
            target_enemy: Some(target),
            target_ally: None,
        };
    }

    let starved = actor.abilities.iter().find(|ability| !ability.affordable);
    match starved.map(|ability| ability.resource) {
        Some(ResourceKind::Stamina) if actor.can_rest => PlayerAction::Recover {
            actor: actor.character_id,
            kind: RecoveryKind::Rest,
        },
        Some(ResourceKind::Mana) if actor.can_meditate => PlayerAction::Recover {
            actor: actor.character_id,
            kind: RecoveryKind::Meditate,
        },
        _ => basic,
    }
}
