use bevy::prelude::*;
use loading::CatalogLoadingPlugin;
use save_load::SaveLoadPlugin;
use unlocks::UnlocksPlugin;

/// Installs the full engine: catalog loading, availability tracking and
/// ledger persistence.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((CatalogLoadingPlugin, UnlocksPlugin, SaveLoadPlugin))
            .add_systems(Startup, log_startup);
    }
}

fn log_startup() {
    info!("unlock tracker started");
}
