//! Content factory for loading all battle content from a data directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::areas::AreaCatalog;
use crate::classes::ClassCatalog;
use crate::loaders::{AreaLoader, ConfigLoader, LoadResult};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── areas.ron
/// ```
///
/// Missing files fall back to the built-in content.
pub struct ContentFactory {
    data_dir: PathBuf,
}

/// Everything a battle service needs from content.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub config: BattleConfig,
    pub classes: ClassCatalog,
    pub areas: AreaCatalog,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load balance configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the area catalog from `areas.ron`.
    pub fn load_areas(&self) -> LoadResult<AreaCatalog> {
        let path = self.data_dir.join("areas.ron");
        if !path.exists() {
            return AreaLoader::embedded();
        }
        AreaLoader::load(&path)
    }

    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        Ok(ContentBundle {
            config: self.load_config()?,
            classes: ClassCatalog::standard(),
            areas: self.load_areas()?,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ContentBundle {
    /// Built-in content, no files involved.
    pub fn builtin() -> LoadResult<Self> {
        Ok(Self {
            config: BattleConfig::default(),
            classes: ClassCatalog::standard(),
            areas: AreaLoader::embedded()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_data_directory_loads() {
        let factory = ContentFactory::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"));
        let bundle = factory.load_all().unwrap();
        assert_eq!(bundle.areas.areas.len(), 4);
        assert_eq!(bundle.config.reward.area_multipliers, [1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn empty_directory_falls_back_to_builtin_content() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        let bundle = factory.load_all().unwrap();
        assert_eq!(bundle.config, BattleConfig::default());
        assert_eq!(bundle.areas, AreaLoader::embedded().unwrap());
    }

    #[test]
    fn broken_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "rest_percent = \"lots\"").unwrap();
        let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
        assert!(err.to_string().contains("config TOML"));
    }
}
