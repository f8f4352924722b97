//! Persistence for the unlock ledger.
//!
//! Each ledger set is written under its own key, `<player>.<field>`, as a RON
//! sequence of ids. Loading never fails: missing values are empty and
//! malformed values are logged and treated as empty. Saving happens after
//! every ledger change and logs failures instead of blocking the caller.

mod store;

pub use store::*;

use {
    bevy::prelude::*,
    catalog_resources::ItemId,
    std::collections::BTreeSet,
    unlocks_events::{LedgerChanged, LedgerLoaded, SessionStarted},
    unlocks_resources::{PlayerSession, UnlockLedger},
};

pub const UNLOCKED_FIELD: &str = "unlocked";
pub const MANUALLY_ADDED_FIELD: &str = "manuallyAdded";
pub const MANUALLY_LOCKED_FIELD: &str = "manuallyLocked";

/// The store the ledger is saved into. Defaults to an in-memory store.
#[derive(Resource)]
pub struct LedgerStore(Box<dyn KeyValueStore>);

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl LedgerStore {
    pub fn new(store: impl KeyValueStore) -> Self {
        Self(Box::new(store))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.0.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.0.as_mut()
    }
}

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LedgerStore>()
            .init_resource::<UnlockLedger>()
            .init_resource::<PlayerSession>()
            .add_observer(load_on_session_start)
            .add_observer(save_on_ledger_change);
    }
}

pub fn storage_key(player: &str, field: &str) -> String {
    format!("{player}.{field}")
}

/// Writes all three ledger sets for `player`.
pub fn save_ledger(
    store: &mut dyn KeyValueStore,
    player: &str,
    ledger: &UnlockLedger,
) -> Result<(), PersistenceError> {
    let fields = [
        (UNLOCKED_FIELD, ledger.unlocked()),
        (MANUALLY_ADDED_FIELD, ledger.manually_added()),
        (MANUALLY_LOCKED_FIELD, ledger.manually_locked()),
    ];

    let entries = fields
        .into_iter()
        .map(|(field, ids)| Ok((storage_key(player, field), ron::to_string(ids)?)))
        .collect::<Result<Vec<_>, PersistenceError>>()?;

    store.set_many(entries)
}

/// Reads the ledger for `player`. Absent or unreadable fields are empty.
pub fn load_ledger(store: &dyn KeyValueStore, player: &str) -> UnlockLedger {
    UnlockLedger::from_parts(
        load_field(store, player, UNLOCKED_FIELD),
        load_field(store, player, MANUALLY_ADDED_FIELD),
        load_field(store, player, MANUALLY_LOCKED_FIELD),
    )
}

fn load_field(store: &dyn KeyValueStore, player: &str, field: &str) -> BTreeSet<ItemId> {
    let key = storage_key(player, field);
    let value = match store.get(&key) {
        Ok(Some(value)) if !value.trim().is_empty() => value,
        Ok(_) => return BTreeSet::new(),
        Err(e) => {
            error!(%key, "Failed to read stored unlocks: {}", e);
            return BTreeSet::new();
        }
    };

    ron::de::from_str(&value).unwrap_or_else(|e| {
        error!(%key, "Failed to parse stored unlocks: {}", e);
        BTreeSet::new()
    })
}

/// Observer that loads the player's ledger when a session starts.
fn load_on_session_start(
    trigger: On<SessionStarted>,
    store: Res<LedgerStore>,
    mut ledger: ResMut<UnlockLedger>,
    mut session: ResMut<PlayerSession>,
    mut commands: Commands,
) {
    let player = trigger.event().player.clone();
    *ledger = load_ledger(store.store(), &player);

    info!(
        "Loaded {} unlocked items ({} manual, {} locked) for player {}",
        ledger.unlocked_count(),
        ledger.manually_added().len(),
        ledger.manually_locked().len(),
        player
    );

    session.begin(player.clone());
    commands.trigger(LedgerLoaded { player });
}

/// Observer that saves the ledger after every change.
fn save_on_ledger_change(
    _trigger: On<LedgerChanged>,
    mut store: ResMut<LedgerStore>,
    ledger: Res<UnlockLedger>,
    session: Res<PlayerSession>,
) {
    let Some(player) = session.player() else {
        warn!("Cannot save unlocked items - no active player");
        return;
    };

    match save_ledger(store.store_mut(), player, &ledger) {
        Ok(()) => debug!(
            "Saved {} unlocked items ({} manual, {} locked) for {}",
            ledger.unlocked_count(),
            ledger.manually_added().len(),
            ledger.manually_locked().len(),
            player
        ),
        Err(e) => error!("Failed to save unlocked items for {}: {}", player, e),
    }
}
