//! Battle service: the entry points clients call.
//!
//! Every mutating call runs as one unit:
//! 1. open a transaction on the battle (waits for other actions on it)
//! 2. resolve the action on a copy with [`BattleEngine`]
//! 3. commit the copy, plus rewards on victory
//!
//! A rejected action or a failed commit leaves the stored battle as it was.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use battle_content::ContentBundle;
use battle_core::{
    Battle, BattleError, BattleEngine, BattleEnv, BattleEvent, BattleId, BattleSetup,
    CharacterId, EffectSpec, Enemy, EnemyId, ParticipantOverride, PartyId, PcgRng, PlayerAction,
    RecoveryKind, RunId,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::repository::{BattleRecord, BattleRepository, PartyRoster, RewardGrant};
use crate::view::BattleView;

const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Inputs of [`BattleService::start_battle`].
#[derive(Clone, Debug)]
pub struct StartBattle {
    pub party_id: PartyId,
    pub enemies: Vec<Enemy>,
    pub run_id: Option<RunId>,
    /// Difficulty index used for reward multipliers.
    pub area: Option<usize>,
    pub overrides: Vec<ParticipantOverride>,
    pub initial_effects: Vec<EffectSpec>,
}

impl StartBattle {
    pub fn new(party_id: PartyId, enemies: Vec<Enemy>) -> Self {
        Self {
            party_id,
            enemies,
            run_id: None,
            area: None,
            overrides: Vec::new(),
            initial_effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_run(mut self, run_id: RunId, area: usize) -> Self {
        self.run_id = Some(run_id);
        self.area = Some(area);
        self
    }

    #[must_use]
    pub fn carry(mut self, overrides: Vec<ParticipantOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: Vec<EffectSpec>) -> Self {
        self.initial_effects = effects;
        self
    }
}

/// What one action produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionReport {
    /// Every event of the call, enemy turns and damage over time included.
    pub events: Vec<BattleEvent>,
    pub round_closed: bool,
    pub finished: bool,
    pub won: bool,
    pub reward_xp: Option<u32>,
    pub reward_gold: Option<u32>,
}

/// Cloneable handle over the repositories and content.
#[derive(Clone)]
pub struct BattleService {
    battles: Arc<dyn BattleRepository>,
    roster: Arc<dyn PartyRoster>,
    content: Arc<ContentBundle>,
    seed: Option<u64>,
    actions: Arc<AtomicU64>,
}

impl BattleService {
    pub fn builder() -> BattleServiceBuilder {
        BattleServiceBuilder::default()
    }

    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    pub fn roster(&self) -> &dyn PartyRoster {
        &*self.roster
    }

    /// Starts a battle with every member of the party.
    pub async fn start_battle(&self, request: StartBattle) -> Result<Battle> {
        let party = self
            .roster
            .party(request.party_id)
            .await?
            .ok_or(RuntimeError::PartyNotFound(request.party_id))?;

        let id = self.battles.next_battle_id().await?;
        let battle = Battle::start(BattleSetup {
            id,
            party_id: party.id,
            run_id: request.run_id,
            members: party.sheets(),
            enemies: request.enemies,
            overrides: request.overrides,
            initial_effects: request.initial_effects,
            easy_mode: party.easy_mode,
        })
        .inspect_err(|error| {
            warn!(
                target: "runtime::battle",
                party_id = %party.id,
                code = error.error_code(),
                %error,
                "battle setup rejected"
            );
        })?;

        self.battles
            .insert(BattleRecord::new(battle.clone(), request.area))
            .await?;

        info!(
            target: "runtime::battle",
            battle_id = %id,
            party_id = %party.id,
            members = battle.participants.len(),
            enemies = battle.enemies.len(),
            area = ?request.area,
            "battle started"
        );
        Ok(battle)
    }

    pub async fn get_battle(&self, id: BattleId) -> Result<Option<BattleView>> {
        let record = self.battles.get(id).await?;
        Ok(record.map(|record| BattleView::project(&record, &self.content.classes)))
    }

    pub async fn use_ability(
        &self,
        battle_id: BattleId,
        character_id: CharacterId,
        ability: &str,
        target_enemy: Option<EnemyId>,
        target_ally: Option<CharacterId>,
    ) -> Result<ActionReport> {
        self.execute(
            battle_id,
            PlayerAction::UseAbility {
                actor: character_id,
                ability: ability.to_owned(),
                target_enemy,
                target_ally,
            },
        )
        .await
    }

    pub async fn use_basic_attack(
        &self,
        battle_id: BattleId,
        character_id: CharacterId,
        target: EnemyId,
    ) -> Result<ActionReport> {
        self.execute(
            battle_id,
            PlayerAction::BasicAttack {
                actor: character_id,
                target,
            },
        )
        .await
    }

    pub async fn use_recovery(
        &self,
        battle_id: BattleId,
        character_id: CharacterId,
        kind: RecoveryKind,
    ) -> Result<ActionReport> {
        self.execute(
            battle_id,
            PlayerAction::Recover {
                actor: character_id,
                kind,
            },
        )
        .await
    }

    /// Resolves and commits one action.
    pub async fn execute(&self, battle_id: BattleId, action: PlayerAction) -> Result<ActionReport> {
        let actor = action.actor();
        let tx = self.battles.begin(battle_id).await?;

        let mut battle = tx.record().battle.clone();
        let env = BattleEnv::new(&self.content.classes, &self.content.config)
            .in_area(tx.record().area);
        let mut rng = self.action_rng(battle_id);

        let outcome = match BattleEngine::new(&mut battle).execute(env, &mut rng, &action) {
            Ok(outcome) => outcome,
            Err(error) => {
                if error.severity().is_internal() {
                    warn!(
                        target: "runtime::battle",
                        battle_id = %battle_id,
                        character_id = %actor,
                        code = error.error_code(),
                        %error,
                        "action failed"
                    );
                } else {
                    debug!(
                        target: "runtime::battle",
                        battle_id = %battle_id,
                        character_id = %actor,
                        code = error.error_code(),
                        %error,
                        "action rejected"
                    );
                }
                return Err(error.into());
            }
        };

        let round = battle.turn;
        let grant = outcome
            .rewards
            .as_ref()
            .map(|rewards| RewardGrant::new(battle.party_id, rewards));

        if let Err(error) = tx.commit(battle, grant).await {
            warn!(
                target: "runtime::battle",
                battle_id = %battle_id,
                character_id = %actor,
                %error,
                "commit failed, action rolled back"
            );
            return Err(error.into());
        }

        debug!(
            target: "runtime::battle",
            battle_id = %battle_id,
            character_id = %actor,
            ability = action_label(&action),
            round,
            events = outcome.events.len(),
            round_closed = outcome.round_closed,
            "action committed"
        );
        if outcome.finished {
            info!(
                target: "runtime::battle",
                battle_id = %battle_id,
                won = outcome.won,
                round,
                reward_xp = outcome.rewards.as_ref().map(|r| r.xp),
                reward_gold = outcome.rewards.as_ref().map(|r| r.gold),
                "battle finished"
            );
        }

        Ok(ActionReport {
            reward_xp: outcome.rewards.as_ref().map(|r| r.xp),
            reward_gold: outcome.rewards.as_ref().map(|r| r.gold),
            events: outcome.events,
            round_closed: outcome.round_closed,
            finished: outcome.finished,
            won: outcome.won,
        })
    }

    /// Fresh generator per action. With a configured seed, the sequence of
    /// actions a service handles is reproducible.
    fn action_rng(&self, battle_id: BattleId) -> PcgRng {
        let nth = self.actions.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => PcgRng::new(
                seed ^ battle_id.0.rotate_left(32) ^ (nth + 1).wrapping_mul(SEED_SPREAD),
            ),
            None => PcgRng::new(rand::random()),
        }
    }
}

fn action_label(action: &PlayerAction) -> &str {
    match action {
        PlayerAction::UseAbility { ability, .. } => ability,
        PlayerAction::BasicAttack { .. } => "basic_attack",
        PlayerAction::Recover { kind, .. } => kind.as_ref(),
    }
}

/// Assembles a [`BattleService`].
#[derive(Default)]
pub struct BattleServiceBuilder {
    config: RuntimeConfig,
    content: Option<ContentBundle>,
    battles: Option<Arc<dyn BattleRepository>>,
    roster: Option<Arc<dyn PartyRoster>>,
}

impl BattleServiceBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the content `config` would load.
    pub fn content(mut self, content: ContentBundle) -> Self {
        self.content = Some(content);
        self
    }

    /// One store serving both battles and parties.
    pub fn store<S>(mut self, store: S) -> Self
    where
        S: BattleRepository + PartyRoster + 'static,
    {
        let store = Arc::new(store);
        let battles: Arc<dyn BattleRepository> = store.clone();
        let roster: Arc<dyn PartyRoster> = store;
        self.battles = Some(battles);
        self.roster = Some(roster);
        self
    }

    pub fn build(self) -> Result<BattleService> {
        let (Some(battles), Some(roster)) = (self.battles, self.roster) else {
            return Err(RuntimeError::MissingStore);
        };
        let content = match self.content {
            Some(content) => content,
            None => self.config.load_content()?,
        };
        Ok(BattleService {
            battles,
            roster,
            content: Arc::new(content),
            seed: self.config.seed,
            actions: Arc::new(AtomicU64::new(0)),
        })
    }
}
