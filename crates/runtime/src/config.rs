//! Runtime settings.
//!
//! Environment variables:
//! - `BATTLE_SEED`: base seed for action RNGs, making runs reproducible
//! - `BATTLE_DATA_DIR`: directory with `config.toml` / `areas.ron` overrides
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use battle_content::{ContentBundle, ContentFactory, LoadResult};
use battle_core::BattleConfig;

#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Balance rules used when no data directory is configured.
    pub battle: BattleConfig,
    /// Seeds every action RNG when set; otherwise each action draws a fresh
    /// seed from the OS.
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const SEED_ENV: &'static str = "BATTLE_SEED";
    pub const DATA_DIR_ENV: &'static str = "BATTLE_DATA_DIR";

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: read_env(Self::SEED_ENV).or(defaults.seed),
            data_dir: read_env::<PathBuf>(Self::DATA_DIR_ENV).or(defaults.data_dir),
            ..defaults
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Classes, areas and balance rules for the service.
    ///
    /// With a data directory, its files win over `battle`.
    pub fn load_content(&self) -> LoadResult<ContentBundle> {
        match &self.data_dir {
            Some(dir) => ContentFactory::new(dir).load_all(),
            None => {
                let mut bundle = ContentBundle::builtin()?;
                bundle.config = self.battle.clone();
                Ok(bundle)
            }
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
