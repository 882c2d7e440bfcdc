//! Static battle content and loaders.
//!
//! This crate houses the balance data consumed by `battle-core`:
//! - The twelve-class catalog (stats, passives, abilities)
//! - Areas, stages and enemies (data-driven via RON)
//! - Encounter spawning and area scaling
//! - Rest-stop blessings as battle-start effects
//! - Balance configuration (data-driven via TOML)
//!
//! Content is read-only; battles only ever see it through `ClassOracle` and
//! spawned `Enemy` values.

pub mod areas;
pub mod blessings;
pub mod classes;
pub mod encounter;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use areas::{AreaCatalog, AreaDefinition, StageDefinition, StageRef};
pub use blessings::{Blessing, initial_effects};
pub use classes::ClassCatalog;
pub use encounter::{BATTLES_PER_AREA, EncounterBuilder, MOB_ENCOUNTER_SIZE};

#[cfg(feature = "loaders")]
pub use loaders::{
    AreaLoader, ConfigLoader, ContentFactory, LoadResult, factory::ContentBundle,
};
