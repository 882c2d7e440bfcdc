//! Records kept by the repositories.
use battle_core::{Battle, BattleId, CharacterId, CharacterSheet, PartyId, Rewards};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored battle plus the metadata the engine does not track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle: Battle,
    /// Difficulty index of the area the battle was spawned for.
    pub area: Option<usize>,
    /// Bumped by every commit.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BattleRecord {
    pub fn new(battle: Battle, area: Option<usize>) -> Self {
        let now = Utc::now();
        Self {
            battle,
            area,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> BattleId {
        self.battle.id
    }
}

/// A party member and their progression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub sheet: CharacterSheet,
    pub xp: u32,
    pub battles_won: u32,
}

impl CharacterRecord {
    pub fn new(sheet: CharacterSheet) -> Self {
        Self {
            sheet,
            xp: 0,
            battles_won: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    pub id: PartyId,
    pub name: String,
    /// Easy-mode parties roll two basic-attack dice and face weaker enemies.
    pub easy_mode: bool,
    pub gold: u32,
    pub members: Vec<CharacterRecord>,
}

impl PartyRecord {
    pub fn member(&self, id: CharacterId) -> Option<&CharacterRecord> {
        self.members.iter().find(|member| member.sheet.id == id)
    }

    pub fn sheets(&self) -> Vec<CharacterSheet> {
        self.members.iter().map(|member| member.sheet.clone()).collect()
    }
}

/// Victory rewards to record together with the winning commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub party_id: PartyId,
    /// Granted to each recipient.
    pub xp: u32,
    /// Granted once to the party.
    pub gold: u32,
    pub recipients: Vec<CharacterId>,
}

impl RewardGrant {
    pub fn new(party_id: PartyId, rewards: &Rewards) -> Self {
        Self {
            party_id,
            xp: rewards.xp,
            gold: rewards.gold,
            recipients: rewards.recipients.clone(),
        }
    }
}

/// One committed reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub battle_id: BattleId,
    pub grant: RewardGrant,
    pub granted_at: DateTime<Utc>,
}
