//! Destination result stores.
//!
//! A store is created per origin search, fed with candidates while the
//! search relaxes edges, asked `finished()` after every settled label, and
//! finally drained into ordered [`AccessRecord`]s.
//!
//! | Variant  | Finished when                                   |
//! |----------|-------------------------------------------------|
//! | `Single` | its own bounds are met                          |
//! | `Multi`  | every category's sub-store is finished          |

use std::sync::Arc;

use rustc_hash::FxHashMap;

use acc_core::{CategoryId, ObjectId};

use crate::label::LabelArena;
use crate::projection::{self, AccessRecord, Candidate};
use crate::{SearchBounds, SearchError, SearchResult};

// ── SingleStore ───────────────────────────────────────────────────────────────

/// Best candidate per destination, plus the count and value sum of those
/// within the hard caps.
#[derive(Clone, Debug)]
pub struct SingleStore {
    bounds:    SearchBounds,
    best:      FxHashMap<ObjectId, Candidate>,
    admitted:  usize,
    value_sum: f64,
}

impl SingleStore {
    pub fn new(bounds: SearchBounds) -> Self {
        Self {
            bounds,
            best:      FxHashMap::default(),
            admitted:  0,
            value_sum: 0.0,
        }
    }

    pub fn bounds(&self) -> &SearchBounds {
        &self.bounds
    }

    /// Keep `candidate` if its destination is new or it beats the stored
    /// one.  Returns `true` if the store changed.
    pub fn add_result(&mut self, candidate: Candidate) -> bool {
        use std::collections::hash_map::Entry;

        let admits = |c: &Candidate| self.bounds.admits(c.travel_time, c.distance);
        let now = admits(&candidate);
        let was = match self.best.entry(candidate.destination) {
            Entry::Occupied(mut slot) => {
                if candidate.key >= slot.get().key {
                    return false;
                }
                let old = slot.insert(candidate);
                Some(admits(&old))
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
                None
            }
        };
        if was != Some(true) && now {
            self.admitted  += 1;
            self.value_sum += candidate.value;
        } else if was == Some(true) && !now {
            self.admitted  -= 1;
            self.value_sum -= candidate.value;
        }
        true
    }

    /// Count, value and shortest-only conditions, over destinations within
    /// the hard caps.
    pub fn finished(&self) -> bool {
        let count = self.admitted;
        (self.bounds.shortest_only && count > 0)
            || self.bounds.count_cap().is_some_and(|n| count >= n)
            || self.bounds.value_cap().is_some_and(|v| self.value_sum >= v)
    }

    /// Number of distinct destinations seen, capped or not.
    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Value of the destinations within the hard caps.
    pub fn value_sum(&self) -> f64 {
        self.value_sum
    }

    /// Candidates surviving the final filter, in output order.
    ///
    /// Hard caps first, then comparator order for the count and value
    /// truncation, then `shortest_only`, then travel time and destination id.
    pub fn selected(&self) -> Vec<&Candidate> {
        let mut picked: Vec<&Candidate> = self
            .best
            .values()
            .filter(|c| self.bounds.admits(c.travel_time, c.distance))
            .collect();
        picked.sort_by(|a, b| a.key.cmp(&b.key).then(a.destination.cmp(&b.destination)));

        if let Some(n) = self.bounds.count_cap() {
            picked.truncate(n);
        }
        if let Some(cap) = self.bounds.value_cap() {
            let mut acc  = 0.0;
            let mut keep = 0;
            for c in &picked {
                keep += 1;
                acc  += c.value;
                if acc >= cap {
                    break;
                }
            }
            picked.truncate(keep);
        }
        if self.bounds.shortest_only {
            picked.truncate(1);
        }

        picked.sort_by(|a, b| {
            a.travel_time
                .total_cmp(&b.travel_time)
                .then(a.destination.cmp(&b.destination))
        });
        picked
    }

    pub fn collect_results(
        &self,
        arena:    &LabelArena,
        origin:   ObjectId,
        category: Option<CategoryId>,
    ) -> Vec<AccessRecord> {
        self.selected()
            .into_iter()
            .map(|c| projection::finish(arena, c, origin, category))
            .collect()
    }
}

// ── DestinationCategories ─────────────────────────────────────────────────────

/// Destination → categories mapping with per-category bounds.
///
/// Shared read-only by all workers of a run.
#[derive(Clone, Debug, Default)]
pub struct DestinationCategories {
    /// Sorted by category id.
    categories: Vec<(CategoryId, SearchBounds)>,
    members:    FxHashMap<ObjectId, Vec<CategoryId>>,
}

impl DestinationCategories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, id: CategoryId, bounds: SearchBounds) -> SearchResult<()> {
        bounds.validate()?;
        match self.categories.binary_search_by_key(&id, |&(c, _)| c) {
            Ok(_) => Err(SearchError::DuplicateCategory(id)),
            Err(at) => {
                self.categories.insert(at, (id, bounds));
                Ok(())
            }
        }
    }

    /// Put `destination` into `category`.  A destination may belong to
    /// several categories.
    pub fn assign(&mut self, destination: ObjectId, category: CategoryId) -> SearchResult<()> {
        if self.slot(category).is_none() {
            return Err(SearchError::UnknownCategory(category));
        }
        let cats = self.members.entry(destination).or_default();
        if !cats.contains(&category) {
            cats.push(category);
        }
        Ok(())
    }

    pub fn categories_of(&self, destination: ObjectId) -> &[CategoryId] {
        self.members.get(&destination).map_or(&[], Vec::as_slice)
    }

    pub fn bounds_of(&self, category: CategoryId) -> Option<&SearchBounds> {
        self.slot(category).map(|i| &self.categories[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &SearchBounds)> + '_ {
        self.categories.iter().map(|(c, b)| (*c, b))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn slot(&self, category: CategoryId) -> Option<usize> {
        self.categories.binary_search_by_key(&category, |&(c, _)| c).ok()
    }
}

// ── MultiStore ────────────────────────────────────────────────────────────────

/// One [`SingleStore`] per category.
#[derive(Clone, Debug)]
pub struct MultiStore {
    plan:   Arc<DestinationCategories>,
    /// Parallel to `plan.categories`.
    stores: Vec<SingleStore>,
}

impl MultiStore {
    pub fn new(plan: Arc<DestinationCategories>) -> Self {
        let stores = plan.iter().map(|(_, b)| SingleStore::new(*b)).collect();
        Self { plan, stores }
    }

    /// Offer `candidate` to every category its destination belongs to.
    /// Destinations without a category are ignored.
    pub fn add_result(&mut self, candidate: Candidate) -> bool {
        let mut changed = false;
        for &cat in self.plan.categories_of(candidate.destination) {
            if let Some(i) = self.plan.slot(cat) {
                changed |= self.stores[i].add_result(candidate);
            }
        }
        changed
    }

    pub fn finished(&self) -> bool {
        !self.stores.is_empty() && self.stores.iter().all(SingleStore::finished)
    }

    pub fn category(&self, category: CategoryId) -> Option<&SingleStore> {
        self.plan.slot(category).map(|i| &self.stores[i])
    }

    pub fn collect_results(&self, arena: &LabelArena, origin: ObjectId) -> Vec<AccessRecord> {
        self.plan
            .iter()
            .zip(&self.stores)
            .flat_map(|((cat, _), store)| store.collect_results(arena, origin, Some(cat)))
            .collect()
    }
}

// ── DestinationStore ──────────────────────────────────────────────────────────

/// The store variant chosen for a run.
#[derive(Clone, Debug)]
pub enum DestinationStore {
    Single(SingleStore),
    Multi(MultiStore),
}

impl DestinationStore {
    pub fn single(bounds: SearchBounds) -> Self {
        DestinationStore::Single(SingleStore::new(bounds))
    }

    pub fn multi(plan: Arc<DestinationCategories>) -> Self {
        DestinationStore::Multi(MultiStore::new(plan))
    }

    pub fn add_result(&mut self, candidate: Candidate) -> bool {
        match self {
            DestinationStore::Single(s) => s.add_result(candidate),
            DestinationStore::Multi(m) => m.add_result(candidate),
        }
    }

    pub fn finished(&self) -> bool {
        match self {
            DestinationStore::Single(s) => s.finished(),
            DestinationStore::Multi(m) => m.finished(),
        }
    }

    pub fn collect_results(&self, arena: &LabelArena, origin: ObjectId) -> Vec<AccessRecord> {
        match self {
            DestinationStore::Single(s) => s.collect_results(arena, origin, None),
            DestinationStore::Multi(m) => m.collect_results(arena, origin),
        }
    }

    /// Travel-time and distance limits a search may prune with: the loosest
    /// over all sub-stores, `None` where any of them is unbounded.
    pub fn search_limits(&self) -> (Option<f64>, Option<f64>) {
        match self {
            DestinationStore::Single(s) => (s.bounds.travel_time_cap(), s.bounds.distance_cap()),
            DestinationStore::Multi(m) => {
                let loosest = |f: fn(&SearchBounds) -> Option<f64>| {
                    m.stores
                        .iter()
                        .map(|s| f(&s.bounds))
                        .try_fold(0.0_f64, |acc, cap| cap.map(|c| acc.max(c)))
                        .filter(|_| !m.stores.is_empty())
                };
                (loosest(SearchBounds::travel_time_cap), loosest(SearchBounds::distance_cap))
            }
        }
    }
}
