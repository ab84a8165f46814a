//! Registry module: priority tiers, dynamic registration, and the
//! mutation-tolerant cursor.

mod cursor;
mod tier;

pub use cursor::Cursor;
pub use tier::Tier;

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::{Priority, RegistryError};

pub(crate) type SharedTier<C> = Arc<RwLock<Tier<C>>>;

/// Ordered mapping from priority to tier.
///
/// Design:
/// - Built once at startup from the discovered components, then shared by
///   reference with the startup driver and with every action that may
///   register further components. Cloning is cheap and shares state.
/// - Tiers are created lazily and stay invisible (excluded from counts,
///   listings and enumeration) until they hold a component.
/// - Locks are only held inside these synchronous calls, never across an
///   `.await`.
pub struct Registry<C> {
    tiers: Arc<RwLock<BTreeMap<Priority, SharedTier<C>>>>,
}

impl<C> Clone for Registry<C> {
    fn clone(&self) -> Self {
        Self {
            tiers: Arc::clone(&self.tiers),
        }
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            tiers: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<C: Clone> Registry<C> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group components by priority in one pass.
    ///
    /// Iteration order becomes insertion order within each tier.
    pub fn from_components<I>(components: I) -> Self
    where
        I: IntoIterator<Item = (C, Priority)>,
    {
        let mut grouped: BTreeMap<Priority, Tier<C>> = BTreeMap::new();
        for (component, priority) in components {
            grouped.entry(priority).or_default().append(component);
        }
        let tiers = grouped
            .into_iter()
            .map(|(priority, tier)| (priority, Arc::new(RwLock::new(tier))))
            .collect();
        Self {
            tiers: Arc::new(RwLock::new(tiers)),
        }
    }

    /// Tier for `priority`, created empty if absent.
    pub fn tier_for(&self, priority: Priority) -> TierHandle<C> {
        if let Some(tier) = self.tiers.read().get(&priority) {
            return TierHandle::new(priority, Arc::clone(tier));
        }
        let mut tiers = self.tiers.write();
        let tier = tiers.entry(priority).or_insert_with(|| {
            tracing::trace!(%priority, "created tier");
            Arc::new(RwLock::new(Tier::new()))
        });
        TierHandle::new(priority, Arc::clone(tier))
    }

    /// Append `component` to the tier for `priority`.
    pub fn register(&self, priority: Priority, component: C) {
        self.tier_for(priority).append(component);
    }

    /// Number of tiers holding at least one component.
    pub fn visible_tier_count(&self) -> usize {
        self.tiers
            .read()
            .values()
            .filter(|tier| !tier.read().is_empty())
            .count()
    }

    /// Ascending priorities of the visible tiers.
    pub fn ordered_priorities(&self) -> Vec<Priority> {
        self.tiers
            .read()
            .iter()
            .filter(|(_, tier)| !tier.read().is_empty())
            .map(|(priority, _)| *priority)
            .collect()
    }

    /// Total number of visible components across all tiers.
    pub fn component_count(&self) -> usize {
        self.tiers
            .read()
            .values()
            .map(|tier| tier.read().visible_count())
            .sum()
    }

    /// Start a new traversal pass.
    pub fn enumerate(&self) -> Cursor<C> {
        Cursor::new(self.clone())
    }

    /// Per-tier component counts, for diagnostics.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let tiers = self
            .tiers
            .read()
            .iter()
            .filter_map(|(priority, tier)| {
                let count = tier.read().visible_count();
                (count > 0).then_some(TierSummary {
                    priority: *priority,
                    count,
                })
            })
            .collect();
        RegistrySnapshot { tiers }
    }

    /// First visible tier strictly after `after` (or the first overall).
    pub(crate) fn next_visible_after(
        &self,
        after: Option<Priority>,
    ) -> Option<(Priority, SharedTier<C>)> {
        let tiers = self.tiers.read();
        let mut range = match after {
            None => tiers.range::<Priority, _>(..),
            Some(p) => tiers.range((Bound::Excluded(p), Bound::Unbounded)),
        };
        range
            .find(|(_, tier)| !tier.read().is_empty())
            .map(|(priority, tier)| (*priority, Arc::clone(tier)))
    }
}

/// Write/read access to one tier, as handed out by `Registry::tier_for`.
pub struct TierHandle<C> {
    priority: Priority,
    tier: SharedTier<C>,
}

impl<C: Clone> TierHandle<C> {
    fn new(priority: Priority, tier: SharedTier<C>) -> Self {
        Self { priority, tier }
    }

    /// Priority of this tier.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Add to the end of the tier.
    pub fn append(&self, component: C) {
        self.tier.write().append(component);
    }

    /// Insert at logical position `index`. See `Tier::insert`.
    pub fn insert(&self, index: usize, component: C) -> Result<(), RegistryError> {
        self.tier.write().insert(index, component)
    }

    /// Number of components in the tier.
    pub fn visible_count(&self) -> usize {
        self.tier.read().visible_count()
    }

    /// Clone of the component at logical position `index`.
    pub fn at(&self, index: usize) -> Result<C, RegistryError> {
        self.tier.read().at(index).cloned()
    }
}

/// Diagnostic view of the visible tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub tiers: Vec<TierSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    pub priority: Priority,
    pub count: usize,
}
