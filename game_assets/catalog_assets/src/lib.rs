//! Catalog asset definitions.
//!
//! The catalog is loaded from a `.catalog.ron` file and lists every trackable
//! item (with its crafting recipes) and every derived item gated behind them.

use {
    bevy::prelude::*,
    bevy_common_assets::ron::RonAssetPlugin,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Identity of an item as reported by the host.
pub type ItemId = u32;

pub struct CatalogAssetsPlugin;

impl Plugin for CatalogAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<CatalogDefinition>::new(&["catalog.ron"]));
    }
}

/// The top-level catalog document.
#[derive(Asset, TypePath, Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogDefinition {
    /// Trackable items keyed by their primary id.
    #[serde(default)]
    pub trackable_items: BTreeMap<ItemId, TrackableItemDefinition>,
    /// Derived items keyed by a stable identifier (e.g., "amulet_of_fury").
    #[serde(default)]
    pub derived_items: BTreeMap<String, DerivedItemDefinition>,
}

/// An item whose possession is tracked directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackableItemDefinition {
    pub name: String,
    /// Category tags (e.g., "Treasure Trails/Elite"). Used for category-wide bypass.
    #[serde(default)]
    pub tabs: Vec<String>,
    /// Alternate ids representing the same item (charged, used, ornamented...).
    #[serde(default)]
    pub variant_ids: Vec<ItemId>,
    /// Alternative ways to obtain this item from other trackable items.
    /// Outer list is OR, inner list is AND.
    #[serde(default)]
    pub recipes: Vec<Vec<ItemId>>,
}

/// An item that is not tracked itself but requires trackable items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DerivedItemDefinition {
    pub name: String,
    /// Every item id governed by this entry. The first one is representative.
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
    /// Trackable primary ids that must all be unlocked.
    #[serde(default)]
    pub dependencies: Vec<ItemId>,
}
