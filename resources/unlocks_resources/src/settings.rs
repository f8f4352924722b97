use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
};

/// Tab marker shared by every clue reward category.
pub const CLUE_TAB_MARKER: &str = "Treasure Trail";

/// Which item categories are restricted at all.
///
/// Changing this resource makes the availability snapshot recompute.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct RestrictionSettings {
    /// When false, every item from a clue reward tab counts as unlocked.
    pub restrict_clue_items: bool,
    /// Additional tab markers whose items are never restricted.
    pub unrestricted_tabs: Vec<String>,
}

impl Default for RestrictionSettings {
    fn default() -> Self {
        Self {
            restrict_clue_items: true,
            unrestricted_tabs: Vec::new(),
        }
    }
}

impl RestrictionSettings {
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_str(source)
    }

    /// Tab markers that are currently always satisfied.
    pub fn free_tabs(&self) -> FreeTabs {
        let clue = (!self.restrict_clue_items).then(|| CLUE_TAB_MARKER.to_string());
        FreeTabs(
            clue.into_iter()
                .chain(self.unrestricted_tabs.iter().cloned())
                .collect(),
        )
    }
}

/// Set of tab markers treated as always satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeTabs(Vec<String>);

impl FreeTabs {
    pub fn new<S: Into<String>>(markers: impl IntoIterator<Item = S>) -> Self {
        Self(markers.into_iter().map(Into::into).collect())
    }

    /// True if any tab contains any free marker.
    pub fn covers(&self, tabs: &[String]) -> bool {
        self.0
            .iter()
            .any(|marker| tabs.iter().any(|tab| tab.contains(marker.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which outgoing notification events are emitted.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct NotificationSettings {
    pub announce_unlocks: bool,
    pub announce_newly_available: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            announce_unlocks: true,
            announce_newly_available: true,
        }
    }
}

impl NotificationSettings {
    pub fn from_ron_str(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::de::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clue_items_are_restricted_by_default() {
        let tabs = vec!["Treasure Trails/Hard".to_string()];

        assert!(!RestrictionSettings::default().free_tabs().covers(&tabs));
    }

    #[test]
    fn disabling_clue_restriction_frees_clue_tabs() {
        let settings = RestrictionSettings {
            restrict_clue_items: false,
            ..default()
        };
        let free = settings.free_tabs();

        assert!(free.covers(&["Treasure Trails/Hard".to_string()]));
        assert!(!free.covers(&["Bosses/Zulrah".to_string()]));
    }

    #[test]
    fn parses_partial_settings() {
        let settings =
            RestrictionSettings::from_ron_str("(unrestricted_tabs: [\"Minigames\"])").unwrap();

        assert!(settings.restrict_clue_items);
        assert!(settings.free_tabs().covers(&["Minigames/Barbarian Assault".to_string()]));
    }
}
