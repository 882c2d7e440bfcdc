//! Areas, stages and the enemies that live there.
use battle_core::EnemyDefinition;

/// One fighting location inside an area.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Regular enemies drawn for mob encounters.
    pub pool: Vec<EnemyDefinition>,
    pub boss: EnemyDefinition,
    /// Spawned alongside the boss.
    #[cfg_attr(feature = "serde", serde(default))]
    pub adds: Vec<EnemyDefinition>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaDefinition {
    pub name: String,
    pub stages: Vec<StageDefinition>,
}

/// Every area in run order. The position of an area is its difficulty index.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaCatalog {
    pub areas: Vec<AreaDefinition>,
}

/// A stage together with the index of the area holding it.
#[derive(Clone, Copy, Debug)]
pub struct StageRef<'a> {
    pub area_index: usize,
    pub area: &'a AreaDefinition,
    pub stage: &'a StageDefinition,
}

impl AreaCatalog {
    pub fn area(&self, index: usize) -> Option<&AreaDefinition> {
        self.areas.get(index)
    }

    pub fn area_by_name(&self, name: &str) -> Option<(usize, &AreaDefinition)> {
        self.areas
            .iter()
            .enumerate()
            .find(|(_, area)| area.name.eq_ignore_ascii_case(name))
    }

    /// Finds a stage by name across all areas.
    pub fn find_stage(&self, name: &str) -> Option<StageRef<'_>> {
        self.areas
            .iter()
            .enumerate()
            .find_map(|(area_index, area)| {
                area.stages
                    .iter()
                    .find(|stage| stage.name.eq_ignore_ascii_case(name))
                    .map(|stage| StageRef {
                        area_index,
                        area,
                        stage,
                    })
            })
    }

    pub fn stages(&self) -> impl Iterator<Item = StageRef<'_>> {
        self.areas.iter().enumerate().flat_map(|(area_index, area)| {
            area.stages.iter().map(move |stage| StageRef {
                area_index,
                area,
                stage,
            })
        })
    }
}

#[cfg(all(test, feature = "loaders"))]
mod tests {
    use crate::loaders::AreaLoader;

    #[test]
    fn embedded_catalog_has_four_areas_of_four_stages() {
        let catalog = AreaLoader::embedded().unwrap();
        let names: Vec<&str> = catalog.areas.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Forest", "Mountain", "Volcano", "Dark Temple"]);
        assert!(catalog.areas.iter().all(|area| area.stages.len() == 4));
    }

    #[test]
    fn every_enemy_can_act() {
        let catalog = AreaLoader::embedded().unwrap();
        for stage in catalog.stages() {
            let stage = stage.stage;
            assert!(!stage.pool.is_empty(), "{} has an empty pool", stage.name);
            for enemy in stage.pool.iter().chain(&stage.adds).chain([&stage.boss]) {
                assert!(enemy.hp > 0, "{}", enemy.name);
                assert!(
                    enemy.abilities.iter().any(|a| a.weight > 0.0),
                    "{} has no selectable ability",
                    enemy.name
                );
            }
        }
    }

    #[test]
    fn stages_resolve_to_their_area() {
        let catalog = AreaLoader::embedded().unwrap();
        let lair = catalog.find_stage("dragon's lair").unwrap();
        assert_eq!(lair.area_index, 2);
        assert_eq!(lair.stage.boss.name, "Magma Drake");
        assert_eq!(lair.stage.boss.phases[0].hp_percent, 30);
        assert_eq!(catalog.area_by_name("mountain").map(|(i, _)| i), Some(1));
    }
}
