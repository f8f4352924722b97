use {
    bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*},
    core::CorePlugin,
    save_load::{LedgerStore, MemoryStore, RonFileStore},
    std::time::Duration,
    unlocks_events::{DerivedItemsAvailable, ItemUnlocked, SessionStarted},
};

const LEDGER_PATH: &str = "saves/ledger.ron";

#[derive(Resource)]
struct Player(String);

fn main() {
    let player = std::env::args().nth(1).unwrap_or_else(|| "local".to_string());

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 20.0,
            ))),
        )
        .add_plugins((
            LogPlugin {
                filter: "error,loading=debug,\
                    unlocks=info,\
                    save_load=debug,\
                    catalog_resources=info"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            },
            AssetPlugin::default(),
        ))
        .add_plugins(CorePlugin)
        .insert_resource(Player(player))
        .add_systems(Startup, (open_store, start_session).chain())
        .add_observer(announce_unlock)
        .add_observer(announce_newly_available)
        .run();
}

fn open_store(mut commands: Commands) {
    let store = match RonFileStore::open(LEDGER_PATH) {
        Ok(store) => LedgerStore::new(store),
        Err(e) => {
            error!("failed to open {}, unlocks will not be saved: {}", LEDGER_PATH, e);
            LedgerStore::new(MemoryStore::default())
        }
    };
    commands.insert_resource(store);
}

fn start_session(mut commands: Commands, player: Res<Player>) {
    commands.trigger(SessionStarted {
        player: player.0.clone(),
    });
}

fn announce_unlock(trigger: On<ItemUnlocked>) {
    info!("New item unlocked: {}", trigger.event().name);
}

fn announce_newly_available(trigger: On<DerivedItemsAvailable>) {
    info!("Now available: {}", trigger.event().names.join(", "));
}
