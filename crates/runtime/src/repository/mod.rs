//! Repository layer for battle state and party progression.
//!
//! Battles are read and written through a [`BattleTransaction`], which holds
//! the battle exclusively until it is committed or dropped. Dropping a
//! transaction without committing leaves the stored battle untouched.
//!
//! Static content (classes, areas) is not stored here; it comes from
//! `battle-content`.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::InMemoryStore;
pub use traits::{BattleRepository, BattleTransaction, PartyRoster};
pub use types::{BattleRecord, CharacterRecord, LedgerEntry, PartyRecord, RewardGrant};
