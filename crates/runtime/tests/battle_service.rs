//! End-to-end tests of the battle service over the in-memory store.

use battle_content::{Blessing, ClassCatalog, ContentBundle, initial_effects};
use battle_core::{
    BattleId, CharacterClass, CharacterId, CharacterSheet, Enemy, EnemyDefinition, EnemyId,
    EventKind, PartyId, RecoveryKind, RunId, StatusEffectKind,
};
use battle_runtime::{
    BattleService, CharacterRecord, InMemoryStore, PartyRecord, PartyRoster, RepositoryError,
    RuntimeConfig, RuntimeError, StartBattle,
};

const PARTY: PartyId = PartyId(1);
const WARRIOR: CharacterId = CharacterId(1);
const CLERIC: CharacterId = CharacterId(2);

fn member(id: CharacterId, class: CharacterClass, level: u32) -> CharacterRecord {
    let stats = ClassCatalog::standard()
        .stats_at_level(class, level)
        .unwrap();
    CharacterRecord::new(CharacterSheet {
        id,
        name: format!("{class}"),
        class,
        level,
        max_hp: stats.hp,
        max_stamina: stats.stamina,
        max_mana: stats.mana,
    })
}

/// Enemy without abilities: it never fights back.
fn dummy(id: u64, hp: u32) -> Enemy {
    let definition = EnemyDefinition {
        name: "Training Dummy".into(),
        hp,
        abilities: Vec::new(),
        phases: Vec::new(),
    };
    Enemy::spawn(EnemyId(id), &definition, false)
}

async fn service_with(store: InMemoryStore, seed: u64) -> BattleService {
    store
        .save_party(PartyRecord {
            id: PARTY,
            name: "Testers".into(),
            easy_mode: false,
            gold: 0,
            members: vec![
                member(WARRIOR, CharacterClass::Warrior, 1),
                member(CLERIC, CharacterClass::Cleric, 1),
            ],
        })
        .await
        .unwrap();
    BattleService::builder()
        .config(RuntimeConfig::default().with_seed(seed))
        .content(ContentBundle::builtin().unwrap())
        .store(store)
        .build()
        .unwrap()
}

async fn service() -> BattleService {
    service_with(InMemoryStore::new(), 7).await
}

async fn start(service: &BattleService, enemies: Vec<Enemy>) -> BattleId {
    service
        .start_battle(StartBattle::new(PARTY, enemies))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn start_battle_requires_a_known_party() {
    let service = service().await;
    let err = service
        .start_battle(StartBattle::new(PartyId(99), vec![dummy(1, 10)]))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::PartyNotFound(PartyId(99))));
    assert_eq!(err.error_code(), "PARTY_NOT_FOUND");
}

#[tokio::test]
async fn start_battle_applies_overrides_and_blessings() {
    let service = service().await;
    let effects = initial_effects(&[Blessing::Shield, Blessing::DamageBuff], &[WARRIOR, CLERIC]);
    let battle = service
        .start_battle(
            StartBattle::new(PARTY, vec![dummy(1, 10)])
                .in_run(RunId(4), 2)
                .carry(vec![battle_core::ParticipantOverride {
                    character_id: WARRIOR,
                    current_hp: 12,
                    current_stamina: 5,
                    current_mana: 0,
                }])
                .with_effects(effects),
        )
        .await
        .unwrap();

    assert_eq!(battle.run_id, Some(RunId(4)));
    let view = service.get_battle(battle.id).await.unwrap().unwrap();
    assert_eq!(view.area, Some(2));
    let warrior = view.participant(WARRIOR).unwrap();
    assert_eq!((warrior.hp, warrior.stamina), (12, 5));
    assert!(warrior.effects.contains(&StatusEffectKind::ShieldUntilHit));
    assert!(warrior.effects.contains(&StatusEffectKind::PartyDamageBuff));
    assert_eq!(view.effects.len(), 3);
}

#[tokio::test]
async fn abilities_spend_resources_and_close_the_round() {
    let service = service().await;
    let id = start(&service, vec![dummy(1, 500)]).await;

    let report = service
        .use_ability(id, WARRIOR, "Slash", Some(EnemyId(1)), None)
        .await
        .unwrap();
    assert!(!report.round_closed);
    assert!(report.events.iter().any(|e| e.damage.is_some_and(|d| d >= 5)));

    let view = service.get_battle(id).await.unwrap().unwrap();
    let warrior = view.participant(WARRIOR).unwrap();
    assert_eq!(warrior.stamina, warrior.max_stamina - 10);
    assert!(warrior.has_acted);
    assert!(view.enemies[0].hp < 500);

    let report = service
        .use_ability(id, CLERIC, "Prayer", None, Some(WARRIOR))
        .await
        .unwrap();
    assert!(report.round_closed);
    assert!(report.events.iter().any(|e| e.kind == EventKind::Heal));
    assert!(!report.finished);

    let view = service.get_battle(id).await.unwrap().unwrap();
    assert_eq!(view.turn, 2);
    assert!(view.participants.iter().all(|p| !p.has_acted));
}

#[tokio::test]
async fn rejected_actions_leave_the_battle_untouched() {
    let service = service().await;
    let id = start(&service, vec![dummy(1, 500)]).await;
    let before = service.get_battle(id).await.unwrap().unwrap();

    let err = service
        .use_ability(id, CLERIC, "Slash", Some(EnemyId(1)), None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ABILITY_UNAVAILABLE");

    let err = service
        .use_basic_attack(id, CharacterId(42), EnemyId(1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CHARACTER_NOT_IN_BATTLE");

    let err = service
        .use_recovery(id, WARRIOR, RecoveryKind::Meditate)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "RECOVERY_UNAVAILABLE");

    let err = service
        .use_basic_attack(id, WARRIOR, EnemyId(9))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ENEMY_NOT_FOUND");

    assert_eq!(service.get_battle(id).await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn unknown_battle_is_a_validation_error() {
    let service = service().await;
    let err = service
        .use_basic_attack(BattleId(77), WARRIOR, EnemyId(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Repository(RepositoryError::BattleNotFound(BattleId(77)))
    ));
    assert!(!err.severity().is_internal());
    assert!(service.get_battle(BattleId(77)).await.unwrap().is_none());
}

#[tokio::test]
async fn victory_records_rewards_with_the_commit() {
    let service = service().await;
    let battle = service
        .start_battle(StartBattle::new(PARTY, vec![dummy(1, 2)]).in_run(RunId(1), 1))
        .await
        .unwrap();

    let report = service
        .use_basic_attack(battle.id, WARRIOR, EnemyId(1))
        .await
        .unwrap();
    assert!(report.finished && report.won);
    // (20 + 2 / 2) x 1.5
    assert_eq!(report.reward_xp, Some(31));
    let gold = report.reward_gold.unwrap();
    // (2d10 + 10) x 1.5
    assert!((18..=45).contains(&gold));
    let last = report.events.last().unwrap();
    assert_eq!(last.kind, EventKind::Reward);
    assert_eq!(
        last.message,
        format!("Victory! Earned 31 XP and {gold} gold")
    );

    let party = service.roster().party(PARTY).await.unwrap().unwrap();
    assert_eq!(party.gold, gold);
    for member in &party.members {
        assert_eq!(member.xp, 31);
        assert_eq!(member.battles_won, 1);
    }
    let ledger = service.roster().ledger(PARTY).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].battle_id, battle.id);

    let err = service
        .use_basic_attack(battle.id, CLERIC, EnemyId(1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "BATTLE_FINISHED");
}

#[tokio::test]
async fn failed_commit_rolls_back_the_whole_action() {
    let store = InMemoryStore::new();
    let service = service_with(store.clone(), 7).await;
    let id = start(&service, vec![dummy(1, 500)]).await;

    service
        .use_basic_attack(id, WARRIOR, EnemyId(1))
        .await
        .unwrap();
    let before = service.get_battle(id).await.unwrap().unwrap();

    // The cleric's action would close the round.
    store.fail_next_commit();
    let err = service
        .use_basic_attack(id, CLERIC, EnemyId(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Repository(RepositoryError::CommitFailed(_))
    ));
    assert!(err.severity().is_internal());

    let after = service.get_battle(id).await.unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(after.turn, 1);
    assert!(!after.participant(CLERIC).unwrap().has_acted);

    let retry = service
        .use_basic_attack(id, CLERIC, EnemyId(1))
        .await
        .unwrap();
    assert!(retry.round_closed);
    assert_eq!(service.get_battle(id).await.unwrap().unwrap().turn, 2);
}

#[tokio::test]
async fn failed_winning_commit_grants_nothing() {
    let store = InMemoryStore::new();
    let service = service_with(store.clone(), 7).await;
    let id = start(&service, vec![dummy(1, 2)]).await;

    store.fail_next_commit();
    assert!(
        service
            .use_basic_attack(id, WARRIOR, EnemyId(1))
            .await
            .is_err()
    );
    let view = service.get_battle(id).await.unwrap().unwrap();
    assert!(!view.finished);
    assert_eq!(view.enemies[0].hp, 2);
    assert_eq!(service.roster().party(PARTY).await.unwrap().unwrap().gold, 0);
    assert!(service.roster().ledger(PARTY).await.unwrap().is_empty());

    let report = service
        .use_basic_attack(id, WARRIOR, EnemyId(1))
        .await
        .unwrap();
    assert!(report.won);
    assert_eq!(
        service.roster().party(PARTY).await.unwrap().unwrap().gold,
        report.reward_gold.unwrap()
    );
}

#[tokio::test]
async fn concurrent_actions_on_one_battle_close_the_round_once() {
    let service = service().await;
    let id = start(&service, vec![dummy(1, 500)]).await;

    let (a, b) = tokio::join!(
        {
            let service = service.clone();
            async move { service.use_basic_attack(id, WARRIOR, EnemyId(1)).await }
        },
        {
            let service = service.clone();
            async move { service.use_basic_attack(id, CLERIC, EnemyId(1)).await }
        }
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(
        [a.round_closed, b.round_closed]
            .iter()
            .filter(|closed| **closed)
            .count(),
        1
    );

    let view = service.get_battle(id).await.unwrap().unwrap();
    assert_eq!(view.turn, 2);
    assert_eq!(view.log.len(), a.events.len() + b.events.len());
}

#[tokio::test]
async fn battles_run_independently() {
    let service = service().await;
    let first = start(&service, vec![dummy(1, 500)]).await;
    let second = start(&service, vec![dummy(1, 500)]).await;
    assert_ne!(first, second);

    let (a, b) = tokio::join!(
        service.use_basic_attack(first, WARRIOR, EnemyId(1)),
        service.use_basic_attack(second, WARRIOR, EnemyId(1))
    );
    a.unwrap();
    b.unwrap();

    for id in [first, second] {
        let view = service.get_battle(id).await.unwrap().unwrap();
        assert!(view.participant(WARRIOR).unwrap().has_acted);
        assert!(!view.participant(CLERIC).unwrap().has_acted);
    }
}

#[tokio::test]
async fn recovery_restores_half_the_pool() {
    let service = service().await;
    let id = start(&service, vec![dummy(1, 500)]).await;

    service
        .use_ability(id, WARRIOR, "Slash", Some(EnemyId(1)), None)
        .await
        .unwrap();
    service
        .use_recovery(id, CLERIC, RecoveryKind::Meditate)
        .await
        .unwrap();
    // Round two: the warrior rests off the Slash cost.
    let report = service
        .use_recovery(id, WARRIOR, RecoveryKind::Rest)
        .await
        .unwrap();
    let recovery = report
        .events
        .iter()
        .find(|e| e.kind == EventKind::Recovery)
        .unwrap();
    assert_eq!(recovery.resource_restored, Some(10));

    let view = service.get_battle(id).await.unwrap().unwrap();
    let warrior = view.participant(WARRIOR).unwrap();
    assert_eq!(warrior.stamina, warrior.max_stamina);
}

#[tokio::test]
async fn same_seed_same_battle() {
    async fn play(seed: u64) -> Vec<String> {
        let service = service_with(InMemoryStore::new(), seed).await;
        let id = start(&service, vec![dummy(1, 500), dummy(2, 500)]).await;
        for _ in 0..3 {
            service
                .use_ability(id, WARRIOR, "Slash", Some(EnemyId(1)), None)
                .await
                .unwrap();
            service
                .use_basic_attack(id, CLERIC, EnemyId(2))
                .await
                .unwrap();
        }
        let view = service.get_battle(id).await.unwrap().unwrap();
        view.log.into_iter().map(|event| event.message).collect()
    }

    assert_eq!(play(11).await, play(11).await);
}

#[tokio::test]
async fn event_log_projects_to_json() {
    let service = service().await;
    let id = start(&service, vec![dummy(1, 500)]).await;
    let first = service
        .use_ability(id, WARRIOR, "Slash", Some(EnemyId(1)), None)
        .await
        .unwrap();
    let second = service
        .use_basic_attack(id, CLERIC, EnemyId(1))
        .await
        .unwrap();

    let view = service.get_battle(id).await.unwrap().unwrap();
    let json = serde_json::to_value(&view.log).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), first.events.len() + second.events.len());
    assert_eq!(entries[0]["ability"], "Slash");
    assert!(entries.iter().all(|entry| entry["message"].is_string()));
    assert!(entries.iter().any(|entry| entry["kind"] == "attack"));

    let report = serde_json::to_value(&second).unwrap();
    assert_eq!(report["finished"], false);
    assert!(report["reward_xp"].is_null());
}
