//! Repository contracts for battles, parties and the reward ledger.

use async_trait::async_trait;
use battle_core::{Battle, BattleId, PartyId};

use super::error::Result;
use super::types::{BattleRecord, LedgerEntry, PartyRecord, RewardGrant};

/// Storage for battle aggregates.
#[async_trait]
pub trait BattleRepository: Send + Sync {
    /// Reserves a fresh battle id.
    async fn next_battle_id(&self) -> Result<BattleId>;

    async fn insert(&self, record: BattleRecord) -> Result<()>;

    /// Last committed state. Waits for an open transaction on the same battle.
    async fn get(&self, id: BattleId) -> Result<Option<BattleRecord>>;

    /// Opens an exclusive transaction on one battle.
    ///
    /// Waits while another transaction holds the same battle. Transactions on
    /// different battles never wait for each other.
    async fn begin(&self, id: BattleId) -> Result<Box<dyn BattleTransaction>>;
}

/// Exclusive access to one battle. Dropping it rolls back.
#[async_trait]
pub trait BattleTransaction: Send {
    /// The battle as it was when the transaction opened.
    fn record(&self) -> &BattleRecord;

    /// Stores `battle` and, on victory, the rewards as one unit.
    ///
    /// On error nothing is written: neither the battle nor the ledger.
    async fn commit(self: Box<Self>, battle: Battle, rewards: Option<RewardGrant>) -> Result<()>;
}

/// Parties, their members and the rewards they earned.
#[async_trait]
pub trait PartyRoster: Send + Sync {
    async fn party(&self, id: PartyId) -> Result<Option<PartyRecord>>;

    async fn save_party(&self, party: PartyRecord) -> Result<()>;

    /// Committed rewards of a party, oldest first.
    async fn ledger(&self, id: PartyId) -> Result<Vec<LedgerEntry>>;
}
