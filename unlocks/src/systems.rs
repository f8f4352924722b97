use {
    crate::{
        notifier::{TransitionReport, apply_mutation_and_notify},
        resolver::Resolver,
    },
    bevy::{ecs::system::SystemParam, prelude::*},
    catalog_resources::{Catalog, ItemId},
    unlocks_events::*,
    unlocks_resources::{
        AvailabilitySnapshot, NotificationSettings, PlayerSession, RestrictionSettings,
        SyncOutcome, UnlockLedger,
    },
};

/// Mutable access to the ledger, always paired with the snapshot it feeds.
#[derive(SystemParam)]
pub struct LedgerAccess<'w> {
    catalog: Res<'w, Catalog>,
    settings: Res<'w, RestrictionSettings>,
    notifications: Res<'w, NotificationSettings>,
    ledger: ResMut<'w, UnlockLedger>,
    snapshot: ResMut<'w, AvailabilitySnapshot>,
}

impl LedgerAccess<'_> {
    /// Runs `mutation` through the notifier, then requests persistence and
    /// announces newly available derived items.
    fn apply(
        &mut self,
        commands: &mut Commands,
        mutation: impl FnOnce(&Catalog, &mut UnlockLedger) -> bool,
    ) -> TransitionReport {
        let catalog = self.catalog.clone();
        let free_tabs = self.settings.free_tabs();

        let report = apply_mutation_and_notify(
            &catalog,
            &free_tabs,
            &mut self.ledger,
            &mut self.snapshot,
            |ledger| mutation(&catalog, ledger),
        );

        if !report.changed {
            return report;
        }

        commands.trigger(LedgerChanged);

        if !report.newly_available.is_empty() {
            info!(names = ?report.newly_available, "derived items now available");
            if self.notifications.announce_newly_available {
                commands.trigger(DerivedItemsAvailable {
                    names: report.newly_available.clone(),
                });
            }
        }

        report
    }

    fn unlock(&mut self, commands: &mut Commands, item_id: ItemId, is_manual: bool) {
        let report = self.apply(commands, |catalog, ledger| {
            ledger.unlock(catalog, item_id, is_manual)
        });
        if !report.changed {
            return;
        }

        let name = self.catalog.name_of(item_id).unwrap_or_default().to_string();
        info!(item_id, %name, is_manual, "Unlocked item");

        if self.notifications.announce_unlocks {
            commands.trigger(ItemUnlocked { item_id, name });
        }
    }
}

/// Observer for detection-confirmed markers.
pub fn on_marker_confirmed(
    trigger: On<MarkerConfirmed>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    access.unlock(&mut commands, trigger.event().item_id, false);
}

/// Observer for markers reported by display name.
pub fn on_marker_confirmed_by_name(
    trigger: On<MarkerConfirmedByName>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let name = &trigger.event().name;
    let Some(item_id) = access.catalog.primary_id_by_name(name) else {
        warn!(%name, "Could not find item id for unlocked item");
        return;
    };

    access.unlock(&mut commands, item_id, false);
}

/// Observer for manual unlocks. Variant ids resolve to their primary item.
pub fn on_unlock_requested(
    trigger: On<UnlockRequested>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let requested = trigger.event().item_id;
    let Some(item_id) = access.catalog.primary_id_for(requested) else {
        warn!(item_id = requested, "Requested unlock of an item that is not tracked");
        return;
    };

    access.unlock(&mut commands, item_id, true);
}

/// Observer for manual locks.
pub fn on_lock_requested(
    trigger: On<LockRequested>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let requested = trigger.event().item_id;
    let item_id = access.catalog.primary_id_for(requested).unwrap_or(requested);

    let report = access.apply(&mut commands, |_, ledger| ledger.lock(item_id));
    if report.changed {
        let name = access.catalog.name_of(item_id).unwrap_or("Unknown");
        info!(item_id, %name, "Locked item");
    }
}

pub fn on_reset_all_requested(
    _trigger: On<ResetAllRequested>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let count = access.ledger.unlocked_count();
    access.apply(&mut commands, |_, ledger| {
        ledger.reset_all();
        true
    });
    info!("Reset all unlocks. Cleared {} items.", count);
}

pub fn on_reset_manual_overrides_requested(
    _trigger: On<ResetManualOverridesRequested>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let restored = access.ledger.manually_locked().len();
    let removed = access.ledger.manually_added().len();
    access.apply(&mut commands, |_, ledger| {
        ledger.reset_manual_overrides();
        true
    });
    info!(
        "Reset manual changes. Re-added {} locked items, removed {} manual additions.",
        restored, removed
    );
}

/// Observer that reconciles a scanned page with the ledger.
pub fn on_collection_page_scanned(
    trigger: On<CollectionPageScanned>,
    mut access: LedgerAccess,
    mut commands: Commands,
) {
    let observations = trigger.event().observations.iter().copied();
    let mut outcome = SyncOutcome::default();

    access.apply(&mut commands, |catalog, ledger| {
        outcome = ledger.sync_observed(catalog, observations);
        outcome.changed()
    });

    debug!(
        scanned = trigger.event().observations.len(),
        new_unlocks = outcome.new_unlocks,
        migrated = outcome.migrated,
        confirmed = outcome.confirmed,
        "Scanned collection page"
    );

    if outcome.changed() {
        info!(
            "Synced collection page: {} new unlocks, {} migrated (total: {})",
            outcome.new_unlocks,
            outcome.migrated,
            access.ledger.unlocked_count()
        );
        commands.trigger(CollectionSynced {
            new_unlocks: outcome.new_unlocks,
            migrated: outcome.migrated,
        });
    }
}

/// Drops in-memory state for the player without persisting it.
pub fn on_session_ended(
    _trigger: On<SessionEnded>,
    catalog: Res<Catalog>,
    settings: Res<RestrictionSettings>,
    mut ledger: ResMut<UnlockLedger>,
    mut snapshot: ResMut<AvailabilitySnapshot>,
    mut session: ResMut<PlayerSession>,
) {
    if let Some(player) = session.player() {
        info!(%player, "Session ended, clearing unlocks");
    }
    *ledger = UnlockLedger::default();
    // Free categories stay available without any unlocks.
    let free_tabs = settings.free_tabs();
    *snapshot = Resolver::new(&catalog, &ledger, &free_tabs).recompute_closure();
    session.end();
}

/// Rebuilds the snapshot after a ledger was loaded from storage.
pub fn on_ledger_loaded(
    trigger: On<LedgerLoaded>,
    catalog: Res<Catalog>,
    settings: Res<RestrictionSettings>,
    ledger: Res<UnlockLedger>,
    mut snapshot: ResMut<AvailabilitySnapshot>,
) {
    debug!(player = %trigger.event().player, "Refreshing availability for loaded ledger");
    let free_tabs = settings.free_tabs();
    *snapshot = Resolver::new(&catalog, &ledger, &free_tabs).recompute_closure();
}

/// Recomputes the snapshot when restrictions or the catalog change.
pub fn refresh_on_config_change(
    catalog: Res<Catalog>,
    settings: Res<RestrictionSettings>,
    ledger: Res<UnlockLedger>,
    mut snapshot: ResMut<AvailabilitySnapshot>,
) {
    if !settings.is_changed() && !catalog.is_changed() {
        return;
    }

    let free_tabs = settings.free_tabs();
    *snapshot = Resolver::new(&catalog, &ledger, &free_tabs).recompute_closure();
}
