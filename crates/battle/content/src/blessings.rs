//! Rest-stop blessings that carry into every battle of the next area.
use battle_core::{
    CharacterId, EffectSource, EffectSpec, EffectTarget, StatusEffectKind, UNTIL_REMOVED,
};

/// A blessing that becomes status effects at battle start.
///
/// One-off services (full heal, revive) change carried-over HP instead and
/// never reach the battle as effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Blessing {
    /// +20% party damage.
    DamageBuff,
    /// -20% damage taken by the party.
    Protection,
    /// Every member starts with a 50% shield.
    Shield,
}

impl Blessing {
    pub const DAMAGE_PERCENT: u32 = 20;
    pub const PROTECTION_PERCENT: u32 = 20;
    pub const SHIELD_REDUCTION: u32 = 50;

    /// Effects this blessing places on a party made of `members`.
    pub fn effects(self, members: &[CharacterId]) -> Vec<EffectSpec> {
        let party = |kind, value| {
            EffectSpec::new(kind, EffectSource::Blessing, EffectTarget::Party, UNTIL_REMOVED)
                .with_value(value)
        };
        match self {
            Self::DamageBuff => vec![party(
                StatusEffectKind::PartyDamageBuff,
                Self::DAMAGE_PERCENT,
            )],
            Self::Protection => vec![party(
                StatusEffectKind::PartyDamageReduction,
                Self::PROTECTION_PERCENT,
            )],
            Self::Shield => members
                .iter()
                .map(|member| {
                    EffectSpec::new(
                        StatusEffectKind::ShieldUntilHit,
                        EffectSource::Blessing,
                        *member,
                        UNTIL_REMOVED,
                    )
                    .with_value(Self::SHIELD_REDUCTION)
                })
                .collect(),
        }
    }
}

/// Initial effects for a battle from every active blessing.
pub fn initial_effects(blessings: &[Blessing], members: &[CharacterId]) -> Vec<EffectSpec> {
    blessings
        .iter()
        .flat_map(|blessing| blessing.effects(members))
        .collect()
}
