mod settings;

pub use settings::*;

use {
    bevy::{platform::collections::HashSet, prelude::*},
    catalog_resources::{Catalog, ItemId},
    std::{collections::BTreeSet, sync::Arc},
};

/// Per-player unlock state.
///
/// `unlocked` holds directly confirmed trackable primary ids. The two manual
/// sets record where the user overrode automatic detection:
/// `manually_added ⊆ unlocked` and `manually_locked ∩ unlocked = ∅`.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct UnlockLedger {
    unlocked: BTreeSet<ItemId>,
    manually_added: BTreeSet<ItemId>,
    manually_locked: BTreeSet<ItemId>,
}

/// Result of reconciling one page of detection results.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Items newly added to `unlocked`.
    pub new_unlocks: usize,
    /// Unlocked items reclassified as manual additions.
    pub migrated: usize,
    /// Manual additions now backed by detection.
    pub confirmed: usize,
}

impl SyncOutcome {
    pub fn changed(&self) -> bool {
        self.new_unlocks > 0 || self.migrated > 0 || self.confirmed > 0
    }
}

impl UnlockLedger {
    /// Rebuilds a ledger from persisted sets, restoring the set invariants.
    pub fn from_parts(
        unlocked: BTreeSet<ItemId>,
        manually_added: BTreeSet<ItemId>,
        manually_locked: BTreeSet<ItemId>,
    ) -> Self {
        let manually_added = manually_added.intersection(&unlocked).copied().collect();
        let manually_locked = manually_locked.difference(&unlocked).copied().collect();
        Self {
            unlocked,
            manually_added,
            manually_locked,
        }
    }

    /// Marks a trackable item as unlocked.
    ///
    /// A manual lock is cleared by any later unlock. Detection overriding a
    /// manual lock is not itself recorded as a manual addition.
    pub fn unlock(&mut self, catalog: &Catalog, item_id: ItemId, is_manual: bool) -> bool {
        if !catalog.is_trackable(item_id) || !self.unlocked.insert(item_id) {
            return false;
        }

        let was_manually_locked = self.manually_locked.remove(&item_id);
        if is_manual && !was_manually_locked {
            self.manually_added.insert(item_id);
        }
        true
    }

    /// Removes an unlock. Undoing a manual addition leaves no trace, locking a
    /// detected unlock is remembered as a manual lock.
    pub fn lock(&mut self, item_id: ItemId) -> bool {
        if !self.unlocked.remove(&item_id) {
            return false;
        }

        if !self.manually_added.remove(&item_id) {
            self.manually_locked.insert(item_id);
        }
        true
    }

    pub fn reset_all(&mut self) {
        self.unlocked.clear();
        self.manually_added.clear();
        self.manually_locked.clear();
    }

    /// Drops user overrides, restoring what detection alone produced.
    pub fn reset_manual_overrides(&mut self) {
        self.unlocked.append(&mut self.manually_locked);
        for item_id in std::mem::take(&mut self.manually_added) {
            self.unlocked.remove(&item_id);
        }
    }

    /// Reconciles detection results `(item_id, obtained)` for one page.
    pub fn sync_observed(
        &mut self,
        catalog: &Catalog,
        observations: impl IntoIterator<Item = (ItemId, bool)>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        for (item_id, obtained) in observations {
            if !catalog.is_trackable(item_id) {
                continue;
            }

            if obtained {
                // Manual locks win over detection.
                if self.manually_locked.contains(&item_id) {
                    continue;
                }
                if self.unlocked.insert(item_id) {
                    debug!(item_id, "found obtained item");
                    outcome.new_unlocks += 1;
                }
                if self.manually_added.remove(&item_id) {
                    outcome.confirmed += 1;
                }
            } else if self.unlocked.contains(&item_id) && self.manually_added.insert(item_id) {
                debug!(item_id, "migrated to manual unlock");
                outcome.migrated += 1;
            }
        }

        outcome
    }

    /// Direct membership only. Recipe-based availability lives in the resolver.
    pub fn is_unlocked(&self, item_id: ItemId) -> bool {
        self.unlocked.contains(&item_id)
    }

    pub fn unlocked(&self) -> &BTreeSet<ItemId> {
        &self.unlocked
    }

    pub fn manually_added(&self) -> &BTreeSet<ItemId> {
        &self.manually_added
    }

    pub fn manually_locked(&self) -> &BTreeSet<ItemId> {
        &self.manually_locked
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Copy of the unlocked ids, safe to hand to another thread.
    pub fn unlocked_ids(&self) -> BTreeSet<ItemId> {
        self.unlocked.clone()
    }

    /// Copies of `(unlocked, manually_added, manually_locked)`.
    pub fn snapshot_sets(&self) -> (BTreeSet<ItemId>, BTreeSet<ItemId>, BTreeSet<ItemId>) {
        (
            self.unlocked.clone(),
            self.manually_added.clone(),
            self.manually_locked.clone(),
        )
    }

    /// Display names of directly unlocked items, sorted case-insensitively.
    pub fn unlocked_names(&self, catalog: &Catalog) -> Vec<String> {
        let mut names: Vec<String> = self
            .unlocked
            .iter()
            .map(|&item_id| match catalog.name_of(item_id) {
                Some(name) => name.to_string(),
                None => format!("Unknown (ID: {item_id})"),
            })
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }
}

/// Every item id currently permitted. Replaced wholesale on recompute, never
/// patched, so a shared handle is always internally consistent.
#[derive(Resource, Debug, Clone, Default)]
pub struct AvailabilitySnapshot(Arc<HashSet<ItemId>>);

impl AvailabilitySnapshot {
    pub fn new(available: HashSet<ItemId>) -> Self {
        Self(Arc::new(available))
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.0.contains(&item_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Immutable handle for readers on other threads.
    pub fn share(&self) -> Arc<HashSet<ItemId>> {
        Arc::clone(&self.0)
    }
}

/// The player whose ledger is loaded, if any.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSession {
    player: Option<String>,
}

impl PlayerSession {
    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn begin(&mut self, player: impl Into<String>) {
        self.player = Some(player.into());
    }

    pub fn end(&mut self) {
        self.player = None;
    }
}
