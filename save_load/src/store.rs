//! Key-value stores the ledger is persisted into.

use {
    bevy::prelude::*,
    std::{
        collections::BTreeMap,
        fs, io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed stored value: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] ron::Error),
}

/// A flat string-to-string store, such as a host's configuration manager.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError>;

    /// Writes several keys at once. Stores that can should apply all of them
    /// or none.
    fn set_many(&mut self, entries: Vec<(String, String)>) -> Result<(), PersistenceError> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and hosts that persist elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores every key in a single RON map file, rewritten on each `set`.
#[derive(Debug)]
pub struct RonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl RonFileStore {
    /// Opens the store. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => ron::de::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(io_error(&path, source)),
        };

        info!("Opened ledger store {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `values` to disk and only then adopts them, so a failed write
    /// leaves memory and file agreeing on the previous contents.
    fn commit(&mut self, values: BTreeMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }

        let serialized = ron::ser::to_string_pretty(&values, ron::ser::PrettyConfig::default())?;
        fs::write(&self.path, serialized).map_err(|source| io_error(&self.path, source))?;
        self.values = values;
        Ok(())
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.set_many(vec![(key.to_string(), value)])
    }

    fn set_many(&mut self, entries: Vec<(String, String)>) -> Result<(), PersistenceError> {
        let mut values = self.values.clone();
        values.extend(entries);
        self.commit(values)
    }
}

fn io_error(path: &Path, source: io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}
