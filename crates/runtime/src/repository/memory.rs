//! In-memory store for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use battle_core::{Battle, BattleId, PartyId};
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::error::{RepositoryError, Result};
use super::traits::{BattleRepository, BattleTransaction, PartyRoster};
use super::types::{BattleRecord, LedgerEntry, PartyRecord, RewardGrant};

/// Battles, parties and the reward ledger kept in process memory.
///
/// Each battle sits behind its own mutex, so a transaction only blocks other
/// transactions on the same battle. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    battles: RwLock<HashMap<BattleId, Arc<Mutex<BattleRecord>>>>,
    parties: Mutex<HashMap<PartyId, PartyRecord>>,
    ledger: Mutex<Vec<LedgerEntry>>,
    next_battle: AtomicU64,
    fail_next_commit: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commit fail without writing anything.
    pub fn fail_next_commit(&self) {
        self.inner.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Stored battle as pretty JSON.
    pub async fn export_json(&self, id: BattleId) -> Result<String> {
        let record = self
            .get(id)
            .await?
            .ok_or(RepositoryError::BattleNotFound(id))?;
        Ok(serde_json::to_string_pretty(&record)?)
    }

    async fn slot(&self, id: BattleId) -> Option<Arc<Mutex<BattleRecord>>> {
        self.inner.battles.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl BattleRepository for InMemoryStore {
    async fn next_battle_id(&self) -> Result<BattleId> {
        Ok(BattleId(
            self.inner.next_battle.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }

    async fn insert(&self, record: BattleRecord) -> Result<()> {
        let mut battles = self.inner.battles.write().await;
        let id = record.id();
        if battles.contains_key(&id) {
            return Err(RepositoryError::DuplicateBattle(id));
        }
        battles.insert(id, Arc::new(Mutex::new(record)));
        Ok(())
    }

    async fn get(&self, id: BattleId) -> Result<Option<BattleRecord>> {
        match self.slot(id).await {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn begin(&self, id: BattleId) -> Result<Box<dyn BattleTransaction>> {
        let slot = self
            .slot(id)
            .await
            .ok_or(RepositoryError::BattleNotFound(id))?;
        let guard = slot.lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            guard,
            inner: Arc::clone(&self.inner),
        }))
    }
}

#[async_trait]
impl PartyRoster for InMemoryStore {
    async fn party(&self, id: PartyId) -> Result<Option<PartyRecord>> {
        Ok(self.inner.parties.lock().await.get(&id).cloned())
    }

    async fn save_party(&self, party: PartyRecord) -> Result<()> {
        self.inner.parties.lock().await.insert(party.id, party);
        Ok(())
    }

    async fn ledger(&self, id: PartyId) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .inner
            .ledger
            .lock()
            .await
            .iter()
            .filter(|entry| entry.grant.party_id == id)
            .cloned()
            .collect())
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<BattleRecord>,
    inner: Arc<Inner>,
}

#[async_trait]
impl BattleTransaction for InMemoryTransaction {
    fn record(&self) -> &BattleRecord {
        &self.guard
    }

    async fn commit(
        mut self: Box<Self>,
        battle: Battle,
        rewards: Option<RewardGrant>,
    ) -> Result<()> {
        if self.inner.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::CommitFailed("injected failure".into()));
        }

        // Lock order: battle, parties, ledger.
        let inner = Arc::clone(&self.inner);
        let mut parties = inner.parties.lock().await;
        let mut ledger = inner.ledger.lock().await;

        if let Some(grant) = rewards {
            let party = parties
                .get_mut(&grant.party_id)
                .ok_or(RepositoryError::UnknownParty(grant.party_id))?;
            party.gold = party.gold.saturating_add(grant.gold);
            for member in party
                .members
                .iter_mut()
                .filter(|member| grant.recipients.contains(&member.sheet.id))
            {
                member.xp = member.xp.saturating_add(grant.xp);
                member.battles_won += 1;
            }
            ledger.push(LedgerEntry {
                battle_id: battle.id,
                grant,
                granted_at: Utc::now(),
            });
        }

        let record = &mut *self.guard;
        record.battle = battle;
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(())
    }
}
