//! Area catalog loader.

use std::path::Path;

use crate::areas::AreaCatalog;
use crate::loaders::{LoadResult, read_file};

const EMBEDDED_AREAS: &str = include_str!("../../data/areas.ron");

/// Loader for the area catalog from RON files.
pub struct AreaLoader;

impl AreaLoader {
    /// Load an area catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<AreaCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// The catalog compiled into the crate.
    pub fn embedded() -> LoadResult<AreaCatalog> {
        Self::parse(EMBEDDED_AREAS)
    }

    pub fn parse(content: &str) -> LoadResult<AreaCatalog> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse area catalog RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_a_catalog_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                areas: [(
                    name: "Cellar",
                    stages: [(
                        name: "Rat Nest",
                        pool: [(name: "Rat", hp: 5, abilities: [(name: "Nibble", damage: Some((count: 1, sides: 2)), weight: 1.0)])],
                        boss: (
                            name: "Rat King",
                            hp: 30,
                            abilities: [(name: "Gnaw", damage: Some((count: 1, sides: 6)), effects: [poison(sides: 3, turns: 2)], weight: 1.0)],
                            phases: [(hp_percent: 50, message: "The Rat King squeals!", damage_multiplier: Some(1.5))],
                        ),
                    )],
                )],
            )"#
        )
        .unwrap();

        let catalog = AreaLoader::load(file.path()).unwrap();
        let stage = catalog.find_stage("Rat Nest").unwrap().stage;
        assert!(stage.adds.is_empty());
        assert_eq!(stage.boss.phases[0].damage_multiplier, Some(1.5));
        assert_eq!(stage.boss.abilities[0].effects.len(), 1);
    }

    #[test]
    fn rejects_malformed_catalogs() {
        let err = AreaLoader::parse("(areas: [(name: 3)])").unwrap_err();
        assert!(err.to_string().contains("area catalog"));
    }
}
