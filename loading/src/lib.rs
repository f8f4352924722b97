use {
    bevy::{asset::LoadState, prelude::*},
    catalog_assets::{CatalogAssetsPlugin, CatalogDefinition},
    catalog_resources::Catalog,
};

pub struct CatalogLoadingPlugin;

impl Plugin for CatalogLoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CatalogAssetsPlugin)
            .init_resource::<CatalogSource>()
            .init_resource::<Catalog>()
            .add_systems(Startup, start_loading)
            .add_systems(
                Update,
                hydrate_catalog.run_if(resource_exists::<CatalogHandle>),
            );
    }
}

/// Asset path of the catalog document, relative to the asset folder.
#[derive(Resource, Debug, Clone)]
pub struct CatalogSource {
    pub path: String,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            path: "items.catalog.ron".to_string(),
        }
    }
}

#[derive(Resource, Debug)]
struct CatalogHandle(Handle<CatalogDefinition>);

fn start_loading(mut cmd: Commands, asset_server: Res<AssetServer>, source: Res<CatalogSource>) {
    info!(path = %source.path, "started loading catalog");
    cmd.insert_resource(CatalogHandle(asset_server.load(source.path.clone())));
}

/// Publishes the `Catalog` resource once the document is loaded.
///
/// An invalid document leaves the empty catalog in place, which makes every
/// item available.
fn hydrate_catalog(
    mut cmd: Commands,
    handle: Res<CatalogHandle>,
    definitions: Res<Assets<CatalogDefinition>>,
    asset_server: Res<AssetServer>,
) {
    let Some(definition) = definitions.get(&handle.0) else {
        if let LoadState::Failed(err) = asset_server.load_state(&handle.0) {
            error!("failed to load catalog: {}", err);
            cmd.remove_resource::<CatalogHandle>();
        }
        return;
    };

    match Catalog::from_definition(definition) {
        Ok(catalog) => {
            info!(
                trackable = catalog.trackable_count(),
                derived = catalog.derived_items().len(),
                "catalog loaded"
            );
            cmd.insert_resource(catalog);
        }
        Err(e) => error!("invalid catalog, keeping previous one: {}", e),
    }

    cmd.remove_resource::<CatalogHandle>();
}

#[cfg(test)]
mod tests {
    use {super::*, catalog_assets::TrackableItemDefinition};

    fn app_with(definition: CatalogDefinition) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<CatalogDefinition>()
            .init_resource::<Catalog>()
            .add_systems(
                Update,
                hydrate_catalog.run_if(resource_exists::<CatalogHandle>),
            );

        let handle = app
            .world_mut()
            .resource_mut::<Assets<CatalogDefinition>>()
            .add(definition);
        app.insert_resource(CatalogHandle(handle));
        app
    }

    #[test]
    fn loaded_definition_becomes_the_catalog() {
        let mut definition = CatalogDefinition::default();
        definition.trackable_items.insert(
            1,
            TrackableItemDefinition {
                name: "Hammer".to_string(),
                ..default()
            },
        );
        let mut app = app_with(definition);

        app.update();

        assert!(app.world().resource::<Catalog>().is_trackable(1));
        assert!(!app.world().contains_resource::<CatalogHandle>());
    }

    #[test]
    fn invalid_definition_keeps_empty_catalog() {
        let mut definition = CatalogDefinition::default();
        definition.trackable_items.insert(
            1,
            TrackableItemDefinition {
                name: "Hammer".to_string(),
                recipes: vec![vec![404]],
                ..default()
            },
        );
        let mut app = app_with(definition);

        app.update();

        assert_eq!(app.world().resource::<Catalog>().trackable_count(), 0);
        assert!(!app.world().contains_resource::<CatalogHandle>());
    }
}
