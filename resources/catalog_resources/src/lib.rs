//! The item catalog: trackable items, derived items and their lookup indexes.
//!
//! A [`Catalog`] is built once from a [`CatalogDefinition`] and never mutated
//! afterwards. Cloning it only bumps a reference count, so every consumer
//! shares the same immutable data.

use {
    bevy::{
        platform::collections::{HashMap, HashSet},
        prelude::*,
    },
    catalog_assets::CatalogDefinition,
    std::{collections::BTreeMap, fs, io, path::Path, sync::Arc},
    thiserror::Error,
};

pub use catalog_assets::ItemId;

/// Why a catalog could not be built.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("catalog source not found: {0}")]
    Missing(String),
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("item {item} lists unknown recipe ingredient {ingredient}")]
    UnknownIngredient { item: ItemId, ingredient: ItemId },
    #[error("derived item '{derived}' depends on unknown item {dependency}")]
    UnknownDependency { derived: String, dependency: ItemId },
}

/// One way of obtaining a trackable item: every ingredient is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    ingredients: Vec<ItemId>,
}

impl Recipe {
    pub fn ingredients(&self) -> &[ItemId] {
        &self.ingredients
    }
}

/// An item whose possession is tracked by the unlock ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackableItem {
    pub primary_id: ItemId,
    pub name: String,
    pub tabs: Vec<String>,
    pub variant_ids: Vec<ItemId>,
    /// Alternatives in declaration order (OR across recipes).
    pub recipes: Vec<Recipe>,
}

impl TrackableItem {
    /// The primary id followed by every variant id.
    pub fn all_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::once(self.primary_id).chain(self.variant_ids.iter().copied())
    }
}

/// An item gated by a conjunction of trackable items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedItem {
    pub key: String,
    pub name: String,
    pub item_ids: Vec<ItemId>,
    pub dependencies: Vec<ItemId>,
}

impl DerivedItem {
    /// The id used to detect availability transitions.
    pub fn representative_id(&self) -> Option<ItemId> {
        self.item_ids.first().copied()
    }

    /// Entries without dependencies never gate anything.
    pub fn is_inert(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[derive(Debug, Default)]
struct CatalogData {
    trackable: BTreeMap<ItemId, TrackableItem>,
    derived: Vec<DerivedItem>,
    primary_by_name: HashMap<String, ItemId>,
    primary_by_item: HashMap<ItemId, ItemId>,
    derived_by_item: HashMap<ItemId, usize>,
}

/// Shared, read-only catalog. The default value is the empty catalog, which is
/// what the engine runs with when loading fails.
#[derive(Resource, Debug, Clone, Default)]
pub struct Catalog(Arc<CatalogData>);

impl Catalog {
    /// Builds the catalog and its indexes, validating every reference.
    pub fn from_definition(definition: &CatalogDefinition) -> Result<Self, DataError> {
        let mut trackable = BTreeMap::new();
        for (&primary_id, def) in &definition.trackable_items {
            let recipes = def
                .recipes
                .iter()
                .map(|ingredients| Recipe {
                    ingredients: dedup_ordered(ingredients),
                })
                .collect();

            trackable.insert(
                primary_id,
                TrackableItem {
                    primary_id,
                    name: def.name.clone(),
                    tabs: def.tabs.clone(),
                    variant_ids: dedup_ordered(&def.variant_ids),
                    recipes,
                },
            );
        }

        for item in trackable.values() {
            for recipe in &item.recipes {
                if let Some(&ingredient) = recipe
                    .ingredients
                    .iter()
                    .find(|id| !trackable.contains_key(*id))
                {
                    return Err(DataError::UnknownIngredient {
                        item: item.primary_id,
                        ingredient,
                    });
                }
            }
        }

        let mut derived = Vec::with_capacity(definition.derived_items.len());
        for (key, def) in &definition.derived_items {
            if let Some(&dependency) = def
                .dependencies
                .iter()
                .find(|id| !trackable.contains_key(*id))
            {
                return Err(DataError::UnknownDependency {
                    derived: key.clone(),
                    dependency,
                });
            }

            derived.push(DerivedItem {
                key: key.clone(),
                name: def.name.clone(),
                item_ids: dedup_ordered(&def.item_ids),
                dependencies: dedup_ordered(&def.dependencies),
            });
        }

        let mut primary_by_name = HashMap::new();
        let mut primary_by_item = HashMap::new();
        for (&primary_id, item) in &trackable {
            primary_by_item.insert(primary_id, primary_id);
            primary_by_name
                .entry(item.name.to_lowercase())
                .or_insert(primary_id);
        }
        for (&primary_id, item) in &trackable {
            for &variant in &item.variant_ids {
                let owner = *primary_by_item.entry(variant).or_insert(primary_id);
                if owner != primary_id {
                    warn!(
                        variant,
                        owner, primary_id, "variant id already mapped to another item"
                    );
                }
            }
        }

        let mut derived_by_item = HashMap::new();
        for (index, item) in derived.iter().enumerate() {
            for &id in &item.item_ids {
                derived_by_item.entry(id).or_insert(index);
            }
        }

        info!(
            "Loaded {} trackable items ({} id mappings)",
            trackable.len(),
            primary_by_item.len()
        );
        info!(
            "Loaded {} derived items ({} id mappings)",
            derived.len(),
            derived_by_item.len()
        );

        Ok(Self(Arc::new(CatalogData {
            trackable,
            derived,
            primary_by_name,
            primary_by_item,
            derived_by_item,
        })))
    }

    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let definition: CatalogDefinition = ron::de::from_str(source)?;
        Self::from_definition(&definition)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::Missing(path.display().to_string()));
        }

        let source = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn trackable(&self, primary_id: ItemId) -> Option<&TrackableItem> {
        self.0.trackable.get(&primary_id)
    }

    pub fn is_trackable(&self, primary_id: ItemId) -> bool {
        self.0.trackable.contains_key(&primary_id)
    }

    /// Trackable items in ascending primary id order.
    pub fn trackable_items(&self) -> impl Iterator<Item = &TrackableItem> {
        self.0.trackable.values()
    }

    pub fn trackable_count(&self) -> usize {
        self.0.trackable.len()
    }

    /// Derived items in key order.
    pub fn derived_items(&self) -> &[DerivedItem] {
        &self.0.derived
    }

    /// Maps a primary or variant id to the owning trackable item's primary id.
    pub fn primary_id_for(&self, item_id: ItemId) -> Option<ItemId> {
        self.0.primary_by_item.get(&item_id).copied()
    }

    /// Case-insensitive lookup by display name.
    pub fn primary_id_by_name(&self, name: &str) -> Option<ItemId> {
        self.0
            .primary_by_name
            .get(&name.trim().to_lowercase())
            .copied()
    }

    pub fn derived_for(&self, item_id: ItemId) -> Option<&DerivedItem> {
        self.0
            .derived_by_item
            .get(&item_id)
            .map(|&index| &self.0.derived[index])
    }

    /// Whether any index mentions this id. Unknown ids are never restricted.
    pub fn is_known(&self, item_id: ItemId) -> bool {
        self.0.primary_by_item.contains_key(&item_id)
            || self.0.derived_by_item.contains_key(&item_id)
    }

    pub fn name_of(&self, primary_id: ItemId) -> Option<&str> {
        self.trackable(primary_id).map(|item| item.name.as_str())
    }
}

fn dedup_ordered(ids: &[ItemId]) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
