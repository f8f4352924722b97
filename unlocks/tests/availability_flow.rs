use {
    bevy::prelude::*,
    catalog_resources::{Catalog, ItemId},
    save_load::{KeyValueStore, LedgerStore, SaveLoadPlugin},
    unlocks::*,
    unlocks_events::*,
    unlocks_resources::{
        AvailabilitySnapshot, NotificationSettings, PlayerSession, RestrictionSettings,
        UnlockLedger,
    },
};

const CATALOG: &str = r#"(
    trackable_items: {
        1: (name: "Hammer", tabs: ["Other/Miscellaneous"]),
        2: (name: "Chisel", tabs: ["Other/Miscellaneous"], variant_ids: [20]),
        3: (name: "Ranger boots", tabs: ["Treasure Trails/Medium"]),
        4: (name: "Ornament kit", recipes: [[3]]),
    },
    derived_items: {
        "crafting_kit": (name: "Crafting kit", item_ids: [100], dependencies: [1, 2]),
        "spiked_boots": (name: "Spiked boots", item_ids: [101], dependencies: [3]),
    },
)"#;

#[derive(Resource, Default)]
struct Tracker {
    unlocked: Vec<ItemId>,
    newly_available: Vec<Vec<String>>,
    synced: Vec<(usize, usize)>,
    loaded: Vec<String>,
}

fn setup() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((UnlocksPlugin, SaveLoadPlugin))
        .insert_resource(Catalog::from_ron_str(CATALOG).unwrap())
        .init_resource::<Tracker>()
        .add_observer(|trigger: On<ItemUnlocked>, mut tracker: ResMut<Tracker>| {
            tracker.unlocked.push(trigger.event().item_id);
        })
        .add_observer(
            |trigger: On<DerivedItemsAvailable>, mut tracker: ResMut<Tracker>| {
                tracker.newly_available.push(trigger.event().names.clone());
            },
        )
        .add_observer(|trigger: On<CollectionSynced>, mut tracker: ResMut<Tracker>| {
            let event = trigger.event();
            tracker.synced.push((event.new_unlocks, event.migrated));
        })
        .add_observer(|trigger: On<LedgerLoaded>, mut tracker: ResMut<Tracker>| {
            tracker.loaded.push(trigger.event().player.clone());
        });

    app.update();
    app
}

fn start_session(app: &mut App, player: &str) {
    app.world_mut().trigger(SessionStarted {
        player: player.to_string(),
    });
    app.update();
}

fn trigger<'a, E: Event<Trigger<'a>: Default>>(app: &mut App, event: E) {
    app.world_mut().trigger(event);
    app.update();
}

fn stored(app: &App, key: &str) -> Option<String> {
    app.world()
        .resource::<LedgerStore>()
        .store()
        .get(key)
        .unwrap()
}

fn snapshot(app: &App) -> &AvailabilitySnapshot {
    app.world().resource::<AvailabilitySnapshot>()
}

fn ledger(app: &App) -> &UnlockLedger {
    app.world().resource::<UnlockLedger>()
}

#[test]
fn markers_unlock_items_and_announce_derived_items() {
    let mut app = setup();
    start_session(&mut app, "Zezima");
    assert_eq!(app.world().resource::<Tracker>().loaded, vec!["Zezima"]);

    trigger(&mut app, MarkerConfirmed { item_id: 1 });
    assert!(app.world().resource::<Tracker>().newly_available.is_empty());

    trigger(&mut app, MarkerConfirmed { item_id: 2 });

    let tracker = app.world().resource::<Tracker>();
    assert_eq!(tracker.unlocked, vec![1, 2]);
    assert_eq!(tracker.newly_available, vec![vec!["Crafting kit".to_string()]]);
    assert!(snapshot(&app).contains(100));
    assert!(snapshot(&app).contains(20));
    assert_eq!(stored(&app, "Zezima.unlocked").as_deref(), Some("[1,2]"));
}

#[test]
fn repeated_marker_is_a_no_op() {
    let mut app = setup();
    start_session(&mut app, "Zezima");

    trigger(&mut app, MarkerConfirmed { item_id: 1 });
    trigger(&mut app, MarkerConfirmed { item_id: 1 });

    assert_eq!(app.world().resource::<Tracker>().unlocked, vec![1]);
}

#[test]
fn markers_by_name_resolve_case_insensitively() {
    let mut app = setup();
    start_session(&mut app, "Zezima");

    trigger(
        &mut app,
        MarkerConfirmedByName {
            name: "  hammer ".to_string(),
        },
    );
    trigger(
        &mut app,
        MarkerConfirmedByName {
            name: "Dragon hammer".to_string(),
        },
    );

    assert_eq!(app.world().resource::<Tracker>().unlocked, vec![1]);
}

#[test]
fn manual_changes_persist_and_reset() {
    let mut app = setup();
    start_session(&mut app, "Zezima");

    trigger(&mut app, MarkerConfirmed { item_id: 1 });
    trigger(&mut app, UnlockRequested { item_id: 20 });
    assert!(ledger(&app).manually_added().contains(&2));

    trigger(&mut app, LockRequested { item_id: 1 });
    assert!(!snapshot(&app).contains(1));
    assert_eq!(stored(&app, "Zezima.manuallyLocked").as_deref(), Some("[1]"));
    assert_eq!(stored(&app, "Zezima.manuallyAdded").as_deref(), Some("[2]"));

    trigger(&mut app, ResetManualOverridesRequested);
    assert_eq!(ledger(&app).unlocked_ids().into_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(stored(&app, "Zezima.manuallyLocked").as_deref(), Some("[]"));

    trigger(&mut app, ResetAllRequested);
    assert_eq!(ledger(&app).unlocked_count(), 0);
    assert_eq!(stored(&app, "Zezima.unlocked").as_deref(), Some("[]"));
}

#[test]
fn scanned_pages_sync_and_migrate() {
    let mut app = setup();
    start_session(&mut app, "Zezima");

    trigger(&mut app, UnlockRequested { item_id: 1 });
    trigger(
        &mut app,
        CollectionPageScanned {
            observations: vec![(1, true), (2, true), (999, true)],
        },
    );
    assert!(ledger(&app).manually_added().is_empty());

    trigger(
        &mut app,
        CollectionPageScanned {
            observations: vec![(2, false)],
        },
    );

    assert_eq!(app.world().resource::<Tracker>().synced, vec![(1, 0), (0, 1)]);
    assert!(ledger(&app).manually_added().contains(&2));
}

#[test]
fn ledger_survives_a_new_session() {
    let mut app = setup();
    start_session(&mut app, "Zezima");
    trigger(&mut app, MarkerConfirmed { item_id: 3 });

    trigger(&mut app, SessionEnded);
    assert_eq!(ledger(&app).unlocked_count(), 0);
    assert!(snapshot(&app).is_empty());
    assert_eq!(app.world().resource::<PlayerSession>().player(), None);

    start_session(&mut app, "Zezima");
    assert!(ledger(&app).is_unlocked(3));
    assert!(snapshot(&app).contains(4));
    assert!(snapshot(&app).contains(101));

    start_session(&mut app, "Lynx Titan");
    assert_eq!(ledger(&app).unlocked_count(), 0);
}

#[test]
fn free_categories_stay_available_after_session_end() {
    let mut app = setup();
    app.world_mut()
        .resource_mut::<RestrictionSettings>()
        .restrict_clue_items = false;
    app.update();
    start_session(&mut app, "Zezima");
    trigger(&mut app, MarkerConfirmed { item_id: 1 });

    trigger(&mut app, SessionEnded);

    assert!(!snapshot(&app).contains(1));
    assert!(snapshot(&app).contains(3));
    assert!(snapshot(&app).contains(4));
    assert!(snapshot(&app).contains(101));
    assert!(is_available(
        app.world().resource::<Catalog>(),
        snapshot(&app),
        3
    ));
}

#[test]
fn changes_without_a_player_are_not_saved() {
    let mut app = setup();

    trigger(&mut app, MarkerConfirmed { item_id: 1 });

    assert!(ledger(&app).is_unlocked(1));
    assert_eq!(stored(&app, ".unlocked"), None);
}

#[test]
fn restriction_changes_recompute_availability() {
    let mut app = setup();
    start_session(&mut app, "Zezima");
    assert!(!snapshot(&app).contains(3));

    app.world_mut()
        .resource_mut::<RestrictionSettings>()
        .restrict_clue_items = false;
    app.update();

    assert!(snapshot(&app).contains(3));
    assert!(snapshot(&app).contains(4));
    assert!(snapshot(&app).contains(101));
    assert!(!ledger(&app).is_unlocked(3));
}

#[test]
fn disabled_notifications_are_silent() {
    let mut app = setup();
    start_session(&mut app, "Zezima");
    *app.world_mut().resource_mut::<NotificationSettings>() = NotificationSettings {
        announce_unlocks: false,
        announce_newly_available: false,
    };

    trigger(&mut app, MarkerConfirmed { item_id: 3 });

    let tracker = app.world().resource::<Tracker>();
    assert!(tracker.unlocked.is_empty());
    assert!(tracker.newly_available.is_empty());
    assert!(snapshot(&app).contains(101));
}

#[derive(Resource, Default)]
struct Queried {
    available: Vec<(ItemId, bool)>,
    missing: Vec<String>,
}

fn query_availability(availability: Availability, mut queried: ResMut<Queried>) {
    queried.available = [1, 2, 100, 424_242]
        .into_iter()
        .map(|id| (id, availability.is_available(id)))
        .collect();
    queried.missing = availability.explain_missing(100);
}

#[test]
fn availability_param_answers_queries() {
    let mut app = setup();
    app.init_resource::<Queried>()
        .add_systems(Update, query_availability);
    start_session(&mut app, "Zezima");
    trigger(&mut app, MarkerConfirmed { item_id: 1 });

    let queried = app.world().resource::<Queried>();
    assert_eq!(
        queried.available,
        vec![(1, true), (2, false), (100, false), (424_242, true)]
    );
    assert_eq!(queried.missing, vec!["Chisel"]);
}
