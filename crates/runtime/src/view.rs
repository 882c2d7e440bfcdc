//! Read projection of a battle for clients.
//!
//! Unlocked abilities, the passive text and recovery options depend only on
//! class and level, so they are derived here instead of stored.
use battle_core::{
    AbilityDef, Battle, BattleEvent, BattleId, CharacterClass, CharacterId, ClassOracle,
    EffectTarget, Enemy, EnemyId, Participant, ParticipantOverride, PartyId, ResourceKind, RunId,
    StatusEffect, StatusEffectKind, Toggles,
};
use serde::Serialize;

use crate::repository::BattleRecord;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleView {
    pub id: BattleId,
    pub party_id: PartyId,
    pub run_id: Option<RunId>,
    pub area: Option<usize>,
    pub turn: u32,
    pub finished: bool,
    pub won: bool,
    pub participants: Vec<ParticipantView>,
    pub enemies: Vec<EnemyView>,
    pub effects: Vec<StatusEffect>,
    pub log: Vec<BattleEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantView {
    pub character_id: CharacterId,
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub has_acted: bool,
    pub locked_out: bool,
    /// Effects on this participant, party-wide ones included.
    pub effects: Vec<StatusEffectKind>,
    /// Empty once the participant is defeated.
    pub abilities: Vec<AbilityView>,
    pub passive: Option<String>,
    pub can_rest: bool,
    pub can_meditate: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AbilityView {
    pub name: String,
    pub description: String,
    pub cost: u32,
    pub resource: ResourceKind,
    pub unlock_level: u32,
    /// Enough resource to cast right now.
    pub affordable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub is_boss: bool,
    pub effects: Vec<StatusEffectKind>,
}

impl BattleView {
    pub fn project(record: &BattleRecord, classes: &dyn ClassOracle) -> Self {
        let battle = &record.battle;
        Self {
            id: battle.id,
            party_id: battle.party_id,
            run_id: battle.run_id,
            area: record.area,
            turn: battle.turn,
            finished: battle.finished,
            won: battle.won,
            participants: battle
                .participants
                .iter()
                .map(|participant| ParticipantView::project(battle, participant, classes))
                .collect(),
            enemies: battle
                .enemies
                .iter()
                .map(|enemy| EnemyView::project(battle, enemy))
                .collect(),
            effects: battle.effects.as_slice().to_vec(),
            log: battle.log().to_vec(),
        }
    }

    pub fn participant(&self, id: CharacterId) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| p.character_id == id)
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &EnemyView> {
        self.enemies.iter().filter(|enemy| enemy.hp > 0)
    }

    /// Current HP and resources of every participant, to seed the next battle.
    pub fn carry_over(&self) -> Vec<ParticipantOverride> {
        self.participants
            .iter()
            .map(|p| ParticipantOverride {
                character_id: p.character_id,
                current_hp: p.hp,
                current_stamina: p.stamina,
                current_mana: p.mana,
            })
            .collect()
    }
}

impl ParticipantView {
    fn project(battle: &Battle, participant: &Participant, classes: &dyn ClassOracle) -> Self {
        let sheet = &participant.character;
        let profile = classes.profile(sheet.class);
        let abilities = match profile {
            Some(profile) if participant.is_alive() => profile
                .abilities_at_level(sheet.level)
                .map(|ability| AbilityView::project(ability, participant))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            character_id: sheet.id,
            name: sheet.name.clone(),
            class: sheet.class,
            level: sheet.level,
            hp: participant.current_hp,
            max_hp: sheet.max_hp,
            stamina: participant.current_stamina,
            max_stamina: sheet.max_stamina,
            mana: participant.current_mana,
            max_mana: sheet.max_mana,
            has_acted: participant.has_acted,
            locked_out: participant.toggles.contains(Toggles::ABILITY_LOCKOUT),
            effects: effects_on(battle, EffectTarget::Character(sheet.id), true),
            abilities,
            passive: profile
                .map(|profile| format!("{}: {}", profile.passive.name, profile.passive.description)),
            can_rest: sheet.class.uses(ResourceKind::Stamina),
            can_meditate: sheet.class.uses(ResourceKind::Mana),
        }
    }
}

impl AbilityView {
    fn project(ability: &AbilityDef, participant: &Participant) -> Self {
        Self {
            name: ability.name.clone(),
            description: ability.description.clone(),
            cost: ability.cost.amount,
            resource: ability.cost.resource,
            unlock_level: ability.unlock_level,
            affordable: participant.resource(ability.cost.resource) >= ability.cost.amount,
        }
    }
}

impl EnemyView {
    fn project(battle: &Battle, enemy: &Enemy) -> Self {
        Self {
            id: enemy.id,
            name: enemy.name.clone(),
            hp: enemy.hp,
            max_hp: enemy.max_hp,
            is_boss: enemy.is_boss,
            effects: effects_on(battle, EffectTarget::Enemy(enemy.id), false),
        }
    }
}

fn effects_on(battle: &Battle, target: EffectTarget, include_party: bool) -> Vec<StatusEffectKind> {
    battle
        .effects
        .iter()
        .filter(|effect| {
            effect.target == target || (include_party && effect.target == EffectTarget::Party)
        })
        .map(|effect| effect.kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use battle_content::ClassCatalog;
    use battle_core::{BattleSetup, CharacterSheet, EnemyDefinition};

    use super::*;

    fn sheet(id: u64, class: CharacterClass, level: u32, hp: u32) -> CharacterSheet {
        CharacterSheet {
            id: CharacterId(id),
            name: format!("{class} {id}"),
            class,
            level,
            max_hp: hp,
            max_stamina: 40,
            max_mana: 60,
        }
    }

    fn record() -> BattleRecord {
        let slime = EnemyDefinition {
            name: "Slime".into(),
            hp: 12,
            abilities: Vec::new(),
            phases: Vec::new(),
        };
        let battle = Battle::start(BattleSetup {
            id: BattleId(3),
            party_id: PartyId(1),
            run_id: None,
            members: vec![
                sheet(1, CharacterClass::Mage, 6, 50),
                sheet(2, CharacterClass::Warrior, 1, 66),
                sheet(3, CharacterClass::Paladin, 3, 70),
            ],
            enemies: vec![Enemy::spawn(EnemyId(1), &slime, false)],
            overrides: vec![ParticipantOverride {
                character_id: CharacterId(3),
                current_hp: 0,
                current_stamina: 0,
                current_mana: 0,
            }],
            initial_effects: Vec::new(),
            easy_mode: false,
        })
        .unwrap();
        BattleRecord::new(battle, Some(1))
    }

    #[test]
    fn lists_unlocked_abilities_per_level() {
        let classes = ClassCatalog::standard();
        let view = BattleView::project(&record(), &classes);

        let mage = view.participant(CharacterId(1)).unwrap();
        assert_eq!(mage.abilities.len(), 3);
        assert!(mage.abilities.iter().all(|a| a.resource == ResourceKind::Mana));
        assert!(mage.passive.as_deref().unwrap().starts_with("Disciplined"));
        assert!(mage.can_meditate);
        assert!(!mage.can_rest);

        let warrior = view.participant(CharacterId(2)).unwrap();
        assert_eq!(warrior.abilities.len(), 1);
        assert!(warrior.can_rest && !warrior.can_meditate);
    }

    #[test]
    fn defeated_participants_have_no_abilities() {
        let classes = ClassCatalog::standard();
        let view = BattleView::project(&record(), &classes);
        let paladin = view.participant(CharacterId(3)).unwrap();
        assert_eq!(paladin.hp, 0);
        assert!(paladin.abilities.is_empty());
        assert!(paladin.can_rest && paladin.can_meditate);
    }

    #[test]
    fn carries_record_metadata() {
        let classes = ClassCatalog::standard();
        let view = BattleView::project(&record(), &classes);
        assert_eq!(view.area, Some(1));
        assert_eq!(view.turn, 1);
        assert_eq!(view.living_enemies().count(), 1);

        let carried = view.carry_over();
        assert_eq!(carried.len(), 3);
        assert_eq!(carried[2].current_hp, 0);
        assert_eq!(carried[1].current_hp, 66);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["participants"][0]["class"], "Mage");
    }
}
