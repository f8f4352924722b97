pub mod notifier;
pub mod resolver;
mod systems;

pub use notifier::{TransitionReport, apply_mutation_and_notify};
pub use resolver::{Availability, Resolver, is_available};

use bevy::prelude::*;
use catalog_resources::Catalog;
use systems::*;
use unlocks_resources::{
    AvailabilitySnapshot, NotificationSettings, PlayerSession, RestrictionSettings, UnlockLedger,
};

pub struct UnlocksPlugin;

impl Plugin for UnlocksPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<Catalog>()
            .init_resource::<UnlockLedger>()
            .init_resource::<AvailabilitySnapshot>()
            .init_resource::<RestrictionSettings>()
            .init_resource::<NotificationSettings>()
            .init_resource::<PlayerSession>()
            // Registration
            .register_type::<RestrictionSettings>()
            .register_type::<NotificationSettings>()
            // Configuration changes
            .add_systems(Update, refresh_on_config_change)
            // Host events
            .add_observer(on_marker_confirmed)
            .add_observer(on_marker_confirmed_by_name)
            .add_observer(on_unlock_requested)
            .add_observer(on_lock_requested)
            .add_observer(on_reset_all_requested)
            .add_observer(on_reset_manual_overrides_requested)
            .add_observer(on_collection_page_scanned)
            .add_observer(on_session_ended)
            .add_observer(on_ledger_loaded);
    }
}
