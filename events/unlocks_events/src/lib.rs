use {bevy::prelude::*, catalog_resources::ItemId};

// ============================================================================
// Host -> engine
// ============================================================================

/// Detection confirmed a marker for this trackable item.
#[derive(Event, Debug, Clone)]
pub struct MarkerConfirmed {
    pub item_id: ItemId,
}

/// Detection reported a marker by display name (e.g., from a game message).
#[derive(Event, Debug, Clone)]
pub struct MarkerConfirmedByName {
    pub name: String,
}

/// The user asked to unlock an item by hand. Variant ids are accepted.
#[derive(Event, Debug, Clone)]
pub struct UnlockRequested {
    pub item_id: ItemId,
}

/// The user asked to lock an item by hand.
#[derive(Event, Debug, Clone)]
pub struct LockRequested {
    pub item_id: ItemId,
}

#[derive(Event, Debug, Clone, Default)]
pub struct ResetAllRequested;

/// Undo every manual override, keeping detected unlocks.
#[derive(Event, Debug, Clone, Default)]
pub struct ResetManualOverridesRequested;

/// One page of detection results: `(item_id, obtained)` pairs.
#[derive(Event, Debug, Clone, Default)]
pub struct CollectionPageScanned {
    pub observations: Vec<(ItemId, bool)>,
}

/// A player logged in; their ledger should be loaded.
#[derive(Event, Debug, Clone)]
pub struct SessionStarted {
    pub player: String,
}

/// The player logged out. In-memory state is dropped without saving.
#[derive(Event, Debug, Clone, Default)]
pub struct SessionEnded;

// ============================================================================
// Engine -> host
// ============================================================================

/// A trackable item became directly unlocked.
#[derive(Event, Debug, Clone)]
pub struct ItemUnlocked {
    pub item_id: ItemId,
    pub name: String,
}

/// Derived items that became available with the last change, sorted by name.
#[derive(Event, Debug, Clone)]
pub struct DerivedItemsAvailable {
    pub names: Vec<String>,
}

/// A scanned page changed the ledger.
#[derive(Event, Debug, Clone)]
pub struct CollectionSynced {
    pub new_unlocks: usize,
    pub migrated: usize,
}

/// The ledger changed and should be persisted.
#[derive(Event, Debug, Clone, Default)]
pub struct LedgerChanged;

/// A ledger was loaded from storage and replaced the in-memory one.
#[derive(Event, Debug, Clone)]
pub struct LedgerLoaded {
    pub player: String,
}
