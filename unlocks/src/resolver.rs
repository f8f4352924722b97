//! Availability resolution over the recipe graph.
//!
//! An item is *effectively unlocked* when it is directly unlocked, belongs to
//! a free tab, or can be crafted through some recipe whose ingredients are all
//! effectively unlocked themselves. Recipes may form cycles; each recursion
//! path carries its own set of in-progress ids and a node already on the path
//! is unsatisfiable there. This rejects some cycles that would otherwise
//! resolve, which is accepted.

use {
    bevy::{
        ecs::system::SystemParam,
        platform::collections::HashSet,
        prelude::*,
    },
    catalog_resources::{Catalog, ItemId},
    unlocks_resources::{AvailabilitySnapshot, FreeTabs, RestrictionSettings, UnlockLedger},
};

/// Borrowed view of everything availability depends on.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    ledger: &'a UnlockLedger,
    free_tabs: &'a FreeTabs,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog, ledger: &'a UnlockLedger, free_tabs: &'a FreeTabs) -> Self {
        Self {
            catalog,
            ledger,
            free_tabs,
        }
    }

    pub fn is_effectively_unlocked(&self, item_id: ItemId) -> bool {
        self.resolve(item_id, &HashSet::new())
    }

    fn resolve(&self, item_id: ItemId, path: &HashSet<ItemId>) -> bool {
        if self.ledger.is_unlocked(item_id) {
            return true;
        }

        let Some(item) = self.catalog.trackable(item_id) else {
            return false;
        };

        if self.free_tabs.covers(&item.tabs) {
            return true;
        }

        if path.contains(&item_id) {
            return false;
        }

        // Every branch below sees its own copy, siblings never share visits.
        let mut path = path.clone();
        path.insert(item_id);

        item.recipes.iter().any(|recipe| {
            recipe
                .ingredients()
                .iter()
                .all(|&ingredient| self.resolve(ingredient, &path))
        })
    }

    /// Recomputes every permitted id from scratch.
    pub fn recompute_closure(&self) -> AvailabilitySnapshot {
        let mut available = HashSet::new();

        for item in self.catalog.trackable_items() {
            if self.is_effectively_unlocked(item.primary_id) {
                available.extend(item.all_ids());
            }
        }

        for derived in self.catalog.derived_items() {
            if derived.is_inert() {
                continue;
            }

            if derived
                .dependencies
                .iter()
                .all(|&dependency| self.is_effectively_unlocked(dependency))
            {
                available.extend(derived.item_ids.iter().copied());
            }
        }

        debug!("Recalculated available items: {} total", available.len());
        AvailabilitySnapshot::new(available)
    }

    /// Names of the trackable items still blocking `item_id`.
    ///
    /// Trackable ids (or variants) explain themselves, derived ids list their
    /// missing dependencies in declaration order. Anything else is empty.
    pub fn explain_missing(&self, item_id: ItemId) -> Vec<String> {
        if let Some(primary_id) = self.catalog.primary_id_for(item_id) {
            return match self.catalog.trackable(primary_id) {
                Some(item) if !self.is_effectively_unlocked(primary_id) => vec![item.name.clone()],
                _ => Vec::new(),
            };
        }

        let Some(derived) = self.catalog.derived_for(item_id) else {
            return Vec::new();
        };

        derived
            .dependencies
            .iter()
            .filter(|&&dependency| !self.is_effectively_unlocked(dependency))
            .filter_map(|&dependency| self.catalog.name_of(dependency))
            .map(str::to_string)
            .collect()
    }
}

/// Unknown ids are never restricted.
pub fn is_available(catalog: &Catalog, snapshot: &AvailabilitySnapshot, item_id: ItemId) -> bool {
    !catalog.is_known(item_id) || snapshot.contains(item_id)
}

/// Read-only availability queries for systems that decide what to block.
#[derive(SystemParam)]
pub struct Availability<'w> {
    catalog: Res<'w, Catalog>,
    ledger: Res<'w, UnlockLedger>,
    settings: Res<'w, RestrictionSettings>,
    snapshot: Res<'w, AvailabilitySnapshot>,
}

impl Availability<'_> {
    pub fn is_available(&self, item_id: ItemId) -> bool {
        is_available(&self.catalog, &self.snapshot, item_id)
    }

    pub fn is_locked(&self, item_id: ItemId) -> bool {
        !self.is_available(item_id)
    }

    pub fn is_effectively_unlocked(&self, item_id: ItemId) -> bool {
        let free_tabs = self.settings.free_tabs();
        Resolver::new(&self.catalog, &self.ledger, &free_tabs).is_effectively_unlocked(item_id)
    }

    pub fn explain_missing(&self, item_id: ItemId) -> Vec<String> {
        let free_tabs = self.settings.free_tabs();
        Resolver::new(&self.catalog, &self.ledger, &free_tabs).explain_missing(item_id)
    }
}
