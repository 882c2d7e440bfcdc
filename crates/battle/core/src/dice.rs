//! Dice notation and the randomness oracle behind every roll.
//!
//! The engine never reaches for a global RNG. Every roll, chance check and
//! random pick goes through an [`RngOracle`] handed in by the caller, so
//! services can seed it and tests can script it.
use std::collections::VecDeque;

/// `count`d`sides` + `modifier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifier: i32,
}

impl DiceSpec {
    pub const fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            modifier: 0,
        }
    }

    #[must_use]
    pub const fn plus(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Average result, used when enemies pick their strongest move.
    pub fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 + f64::from(self.modifier)
    }

    /// Rolls the dice and adds the modifier. Never returns less than zero.
    pub fn roll<R: RngOracle + ?Sized>(&self, rng: &mut R) -> u32 {
        let total = i64::from(rng.roll_dice(self.count, self.sides)) + i64::from(self.modifier);
        u32::try_from(total.max(0)).unwrap_or(u32::MAX)
    }
}

impl core::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.count, self.sides),
            m if m > 0 => write!(f, "{}d{}+{}", self.count, self.sides, m),
            m => write!(f, "{}d{}{}", self.count, self.sides, m),
        }
    }
}

/// RNG oracle for every random decision the engine makes.
///
/// Only [`next_u32`](Self::next_u32) is required. The remaining methods are
/// derived from it but may be overridden (see [`ScriptedRng`]).
pub trait RngOracle {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Roll a die with N sides (1-N inclusive). A zero-sided die rolls 0.
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }

    /// Sum of `count` dice with `sides` sides each.
    fn roll_dice(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).map(|_| self.roll_die(sides)).sum()
    }

    /// True with probability `percent`/100.
    fn chance(&mut self, percent: u32) -> bool {
        if percent == 0 {
            return false;
        }
        (self.next_u32() % 100) < percent
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_u32() as usize) % len
    }

    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl<R: RngOracle + ?Sized> RngOracle for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }

    fn chance(&mut self, percent: u32) -> bool {
        (**self).chance(percent)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }

    fn unit(&mut self) -> f64 {
        (**self).unit()
    }
}

/// Picks an item with probability proportional to its weight.
///
/// Walks the list subtracting weights from a uniform roll over the total and
/// returns the first item that takes the roll to zero. Falls back to the last
/// item to absorb rounding.
pub fn weighted_choice<'a, T, R>(
    rng: &mut R,
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
) -> Option<&'a T>
where
    R: RngOracle + ?Sized,
{
    let total: f64 = items.iter().map(|item| weight(item).max(0.0)).sum();
    if items.is_empty() {
        return None;
    }
    if total <= 0.0 {
        return items.first();
    }
    let mut roll = rng.unit() * total;
    for item in items {
        roll -= weight(item).max(0.0);
        if roll <= 0.0 {
            return Some(item);
        }
    }
    items.last()
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Scripted oracle for tests and replays.
///
/// Each kind of decision reads from its own queue so a test can pin down a
/// die result without disturbing crit checks or target picks. Empty queues
/// fall back to: dice roll their minimum (or maximum, see
/// [`rolling_max`](Self::rolling_max)), chances fail, picks take index 0 and
/// units return 0.0.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    dice: VecDeque<u32>,
    chances: VecDeque<bool>,
    picks: VecDeque<usize>,
    units: VecDeque<f64>,
    roll_max: bool,
}

impl ScriptedRng {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unscripted dice roll their highest face instead of 1.
    #[must_use]
    pub fn rolling_max(mut self) -> Self {
        self.roll_max = true;
        self
    }

    /// Queues individual die faces. Values are clamped to `1..=sides`.
    #[must_use]
    pub fn with_dice(mut self, faces: impl IntoIterator<Item = u32>) -> Self {
        self.dice.extend(faces);
        self
    }

    #[must_use]
    pub fn with_chances(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(outcomes);
        self
    }

    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }
}

impl RngOracle for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.dice.pop_front() {
            Some(face) => face.clamp(1, sides),
            None if self.roll_max => sides,
            None => 1,
        }
    }

    fn chance(&mut self, percent: u32) -> bool {
        percent > 0 && self.chances.pop_front().unwrap_or(false)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.picks.pop_front().unwrap_or(0) % len
    }

    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0).clamp(0.0, 1.0)
    }
}
