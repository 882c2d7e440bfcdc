//! The battle aggregate and the participant records inside it.
use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::class::{CharacterClass, ResourceKind};
use crate::config::BattleConfig;
use crate::enemy::Enemy;
use crate::error::{BattleError, ErrorSeverity};
use crate::event::BattleEvent;
use crate::ids::{BattleId, CharacterId, Combatant, EnemyId, PartyId, RunId};
use crate::status::{EffectSpec, StatusEffects};

bitflags! {
    /// Per-participant flags that survive between actions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Toggles: u8 {
        /// Abilities are unavailable until the current round closes.
        const ABILITY_LOCKOUT = 1 << 0;
    }
}

impl Toggles {
    /// Flags after a round closes. One-round cooldowns end.
    pub fn roll_over(self) -> Self {
        self - Self::ABILITY_LOCKOUT
    }
}

/// The character data a battle needs, snapshotted at battle start.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSheet {
    pub id: CharacterId,
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub max_hp: u32,
    pub max_stamina: u32,
    pub max_mana: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub character: CharacterSheet,
    pub current_hp: u32,
    pub current_stamina: u32,
    pub current_mana: u32,
    pub has_acted: bool,
    pub toggles: Toggles,
}

impl Participant {
    pub fn fresh(character: CharacterSheet) -> Self {
        Self {
            current_hp: character.max_hp,
            current_stamina: character.max_stamina,
            current_mana: character.max_mana,
            character,
            has_acted: false,
            toggles: Toggles::empty(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.character.id
    }

    pub fn combatant(&self) -> Combatant {
        Combatant::Character(self.character.id)
    }

    pub fn name(&self) -> &str {
        &self.character.name
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.current_hp >= self.character.max_hp
    }

    /// `current_hp / max_hp < percent / 100`.
    pub fn is_below_percent(&self, percent: u32) -> bool {
        u64::from(self.current_hp) * 100 < u64::from(percent) * u64::from(self.character.max_hp)
    }

    /// Whole 10% steps of max HP that are missing.
    pub fn missing_hp_tenths(&self) -> u32 {
        let max = u64::from(self.character.max_hp);
        if max == 0 {
            return 0;
        }
        let missing = max.saturating_sub(u64::from(self.current_hp));
        u32::try_from(missing * 10 / max).unwrap_or(10)
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    /// Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.character.max_hp.saturating_sub(self.current_hp));
        self.current_hp += healed;
        healed
    }

    pub fn resource(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Stamina => self.current_stamina,
            ResourceKind::Mana => self.current_mana,
        }
    }

    pub fn max_resource(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Stamina => self.character.max_stamina,
            ResourceKind::Mana => self.character.max_mana,
        }
    }

    pub fn spend(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Stamina => {
                self.current_stamina = self.current_stamina.saturating_sub(amount);
            }
            ResourceKind::Mana => self.current_mana = self.current_mana.saturating_sub(amount),
        }
    }

    /// Returns the amount actually restored.
    pub fn restore(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let restored = amount.min(self.max_resource(kind).saturating_sub(self.resource(kind)));
        match kind {
            ResourceKind::Stamina => self.current_stamina += restored,
            ResourceKind::Mana => self.current_mana += restored,
        }
        restored
    }
}

/// Carry-over state for a participant joining mid-run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantOverride {
    pub character_id: CharacterId,
    pub current_hp: u32,
    pub current_stamina: u32,
    pub current_mana: u32,
}

/// Inputs of [`Battle::start`].
#[derive(Clone, Debug, PartialEq)]
pub struct BattleSetup {
    pub id: BattleId,
    pub party_id: PartyId,
    pub run_id: Option<RunId>,
    pub members: Vec<CharacterSheet>,
    pub enemies: Vec<Enemy>,
    pub overrides: Vec<ParticipantOverride>,
    pub initial_effects: Vec<EffectSpec>,
    pub easy_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("a battle needs at least one party member")]
    EmptyParty,

    #[error("party has {size} members, at most {max} can fight")]
    PartyTooLarge { size: usize, max: usize },

    #[error("a battle needs at least one enemy")]
    NoEnemies,

    #[error("character {0} is listed twice")]
    DuplicateCharacter(CharacterId),

    #[error("enemy id {0} is used by more than one enemy")]
    DuplicateEnemyId(EnemyId),
}

impl BattleError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyParty | Self::PartyTooLarge { .. } | Self::DuplicateCharacter(_) => {
                ErrorSeverity::Validation
            }
            Self::NoEnemies => ErrorSeverity::Internal,
            Self::DuplicateEnemyId(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParty => "EMPTY_PARTY",
            Self::PartyTooLarge { .. } => "PARTY_TOO_LARGE",
            Self::NoEnemies => "NO_ENEMIES",
            Self::DuplicateCharacter(_) => "DUPLICATE_CHARACTER",
            Self::DuplicateEnemyId(_) => "DUPLICATE_ENEMY_ID",
        }
    }
}

/// One fight between a party and a group of enemies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battle {
    pub id: BattleId,
    pub party_id: PartyId,
    pub run_id: Option<RunId>,
    pub easy_mode: bool,
    /// Round counter, starting at 1.
    pub turn: u32,
    pub finished: bool,
    pub won: bool,
    pub enemies: Vec<Enemy>,
    pub effects: StatusEffects,
    pub participants: ArrayVec<Participant, { BattleConfig::MAX_PARTY_SIZE }>,
    log: Vec<BattleEvent>,
}

impl Battle {
    pub fn start(setup: BattleSetup) -> Result<Self, SetupError> {
        if setup.members.is_empty() {
            return Err(SetupError::EmptyParty);
        }
        if setup.members.len() > BattleConfig::MAX_PARTY_SIZE {
            return Err(SetupError::PartyTooLarge {
                size: setup.members.len(),
                max: BattleConfig::MAX_PARTY_SIZE,
            });
        }
        if setup.enemies.is_empty() {
            return Err(SetupError::NoEnemies);
        }
        for (index, enemy) in setup.enemies.iter().enumerate() {
            if setup.enemies[..index].iter().any(|other| other.id == enemy.id) {
                return Err(SetupError::DuplicateEnemyId(enemy.id));
            }
        }

        let mut participants = ArrayVec::new();
        for member in setup.members {
            if participants
                .iter()
                .any(|existing: &Participant| existing.id() == member.id)
            {
                return Err(SetupError::DuplicateCharacter(member.id));
            }
            let mut participant = Participant::fresh(member);
            if let Some(carried) = setup
                .overrides
                .iter()
                .find(|o| o.character_id == participant.id())
            {
                let sheet = &participant.character;
                participant.current_hp = carried.current_hp.min(sheet.max_hp);
                participant.current_stamina = carried.current_stamina.min(sheet.max_stamina);
                participant.current_mana = carried.current_mana.min(sheet.max_mana);
            }
            participants.push(participant);
        }

        let mut effects = StatusEffects::new();
        for spec in setup.initial_effects {
            effects.apply(spec);
        }

        Ok(Self {
            id: setup.id,
            party_id: setup.party_id,
            run_id: setup.run_id,
            easy_mode: setup.easy_mode,
            turn: 1,
            finished: false,
            won: false,
            enemies: setup.enemies,
            effects,
            participants,
            log: Vec::new(),
        })
    }

    pub fn participant(&self, id: CharacterId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn participant_mut(&mut self, id: CharacterId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id() == id)
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn living_participant_ids(&self) -> Vec<CharacterId> {
        self.participants
            .iter()
            .filter(|p| p.is_alive())
            .map(Participant::id)
            .collect()
    }

    pub fn living_enemy_ids(&self) -> Vec<EnemyId> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| e.id)
            .collect()
    }

    pub fn party_wiped(&self) -> bool {
        self.participants.iter().all(|p| !p.is_alive())
    }

    pub fn enemies_defeated(&self) -> bool {
        self.enemies.iter().all(|e| !e.is_alive())
    }

    /// Every living participant has acted this round.
    ///
    /// Vacuously false for a wiped party: there is no round to close.
    pub fn all_living_acted(&self) -> bool {
        let mut living = self.participants.iter().filter(|p| p.is_alive()).peekable();
        living.peek().is_some() && living.all(|p| p.has_acted)
    }

    /// Display name of any combatant, for log lines.
    pub fn name_of(&self, combatant: Combatant) -> &str {
        match combatant {
            Combatant::Character(id) => self.participant(id).map_or("someone", |p| p.name()),
            Combatant::Enemy(id) => self.enemy(id).map_or("something", |e| e.name.as_str()),
        }
    }

    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// Appends committed events. The log is never rewritten.
    pub fn append_log(&mut self, events: impl IntoIterator<Item = BattleEvent>) {
        self.log.extend(events);
    }
}
