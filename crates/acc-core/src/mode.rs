//! Transport modes and mode-set bitsets.
//!
//! A mode is identified by its bit position (`ModeId`).  Modes combine with
//! bitwise OR into a [`ModeSet`]; edges carry the set of modes allowed on
//! them and intermodal labels carry the set of modes still available.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── ModeId / ModeSet ──────────────────────────────────────────────────────────

/// Bit position of a mode inside a [`ModeSet`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeId(pub u8);

impl ModeId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bitset of modes.  At most [`ModeSet::CAPACITY`] modes exist per registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSet(pub u64);

impl ModeSet {
    pub const CAPACITY: usize = 64;
    pub const EMPTY: ModeSet = ModeSet(0);

    #[inline]
    pub fn single(mode: ModeId) -> Self {
        ModeSet(1u64 << mode.0)
    }

    #[inline]
    pub fn contains(self, mode: ModeId) -> bool {
        self.0 & (1u64 << mode.0) != 0
    }

    #[inline]
    pub fn with(self, mode: ModeId) -> Self {
        ModeSet(self.0 | (1u64 << mode.0))
    }

    #[inline]
    pub fn without(self, mode: ModeId) -> Self {
        ModeSet(self.0 & !(1u64 << mode.0))
    }

    #[inline]
    pub fn union(self, other: ModeSet) -> Self {
        ModeSet(self.0 | other.0)
    }

    #[inline]
    pub fn intersection(self, other: ModeSet) -> Self {
        ModeSet(self.0 & other.0)
    }

    #[inline]
    pub fn intersects(self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of modes in the set.
    #[inline]
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Members in ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = ModeId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let bit = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(ModeId(bit))
        })
    }

    /// Lowest member, if any.
    #[inline]
    pub fn first(self) -> Option<ModeId> {
        (self.0 != 0).then(|| ModeId(self.0.trailing_zeros() as u8))
    }
}

impl FromIterator<ModeId> for ModeSet {
    fn from_iter<I: IntoIterator<Item = ModeId>>(iter: I) -> Self {
        iter.into_iter().fold(ModeSet::EMPTY, ModeSet::with)
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeSet({:#b})", self.0)
    }
}

// ── Mode ──────────────────────────────────────────────────────────────────────

/// Speed and cost parameters of one transport mode.
///
/// The cost rates are only consulted by measure-building and cost-aware
/// weight functions; plain travel-time searches ignore them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mode {
    pub id:           ModeId,
    pub name:         String,
    /// Maximum speed in m/s.  Edge speeds above this are capped.
    pub max_speed:    f64,
    /// Metabolic energy in kcal per km.
    pub kcal_per_km:  f64,
    /// CO2 emissions in grams per km.
    pub co2_per_km:   f64,
    /// Monetary price per km.
    pub price_per_km: f64,
    /// `true` for the public-transport mode whose edges follow timetables.
    pub scheduled:    bool,
}

// ── ModeRegistry ──────────────────────────────────────────────────────────────

/// Owns all modes of a run and resolves them by name.
#[derive(Clone, Debug, Default)]
pub struct ModeRegistry {
    modes: Vec<Mode>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual four modes: `foot`, `bicycle`, `car`, `transit`.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        // Fixed, distinct names: registration cannot fail.
        let _ = reg.register("foot", 1.4, 55.0, 0.0, 0.0, false);
        let _ = reg.register("bicycle", 4.2, 25.0, 0.0, 0.0, false);
        let _ = reg.register("car", 200.0 / 3.6, 0.0, 170.0, 0.30, false);
        let _ = reg.register("transit", 100.0 / 3.6, 0.0, 60.0, 0.10, true);
        reg
    }

    /// Add a mode and return its bit.
    pub fn register(
        &mut self,
        name:         &str,
        max_speed:    f64,
        kcal_per_km:  f64,
        co2_per_km:   f64,
        price_per_km: f64,
        scheduled:    bool,
    ) -> CoreResult<ModeId> {
        if self.modes.iter().any(|m| m.name == name) {
            return Err(CoreError::DuplicateMode(name.to_owned()));
        }
        if self.modes.len() >= ModeSet::CAPACITY {
            return Err(CoreError::TooManyModes { max: ModeSet::CAPACITY });
        }
        let id = ModeId(self.modes.len() as u8);
        self.modes.push(Mode {
            id,
            name: name.to_owned(),
            max_speed,
            kcal_per_km,
            co2_per_km,
            price_per_km,
            scheduled,
        });
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: ModeId) -> &Mode {
        &self.modes[id.index()]
    }

    pub fn by_name(&self, name: &str) -> CoreResult<&Mode> {
        self.modes
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::UnknownMode(name.to_owned()))
    }

    /// Resolve a list of names into a non-empty mode set.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> CoreResult<ModeSet> {
        let mut set = ModeSet::EMPTY;
        for name in names {
            set = set.with(self.by_name(name.as_ref())?.id);
        }
        if set.is_empty() {
            return Err(CoreError::NoModes);
        }
        Ok(set)
    }

    /// Union of all scheduled (timetabled) modes.
    pub fn scheduled(&self) -> ModeSet {
        self.modes.iter().filter(|m| m.scheduled).map(|m| m.id).collect()
    }

    /// Comma-separated mode names, e.g. `"foot,transit"`.
    pub fn names(&self, set: ModeSet) -> String {
        set.iter()
            .filter(|id| id.index() < self.modes.len())
            .map(|id| self.modes[id.index()].name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter()
    }
}
