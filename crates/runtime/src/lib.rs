//! Async orchestration around the pure battle engine.
//!
//! `battle-runtime` loads a battle through a repository transaction, lets
//! [`battle_core::BattleEngine`] resolve the action against a copy, and commits
//! the new state together with any victory rewards in one unit. Readers get a
//! [`BattleView`] that adds class data the engine does not store.
//!
//! Modules are organized by responsibility:
//! - [`service`] hosts [`BattleService`] and its builder
//! - [`repository`] defines storage contracts and the in-memory store
//! - [`view`] projects battles for clients
//! - [`config`] reads runtime settings from the environment
pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod view;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use repository::{
    BattleRecord, BattleRepository, BattleTransaction, CharacterRecord, InMemoryStore,
    LedgerEntry, PartyRecord, PartyRoster, RepositoryError, RewardGrant,
};
pub use service::{ActionReport, BattleService, BattleServiceBuilder, StartBattle};
pub use view::{AbilityView, BattleView, EnemyView, ParticipantView};
