//! Durable key-value slots for save snapshots.
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this.
///
/// Snapshots are opaque strings; the store owns their encoding.
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a snapshot, replacing whatever the slot held.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save_game(&self, save_name: &str, snapshot: &str) -> Result<(), Self::Error>;

    /// Load a snapshot, `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read.
    fn load_game(&self, save_name: &str) -> Result<Option<String>, Self::Error>;

    /// Delete a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// In-process storage. Clones share the same slots, so a caller can keep a
/// handle to inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saves: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot directly.
    pub fn insert(&self, save_name: &str, snapshot: impl Into<String>) {
        self.saves
            .borrow_mut()
            .insert(save_name.to_string(), snapshot.into());
    }

    #[must_use]
    pub fn get(&self, save_name: &str) -> Option<String> {
        self.saves.borrow().get(save_name).cloned()
    }
}

impl GameStorage for MemoryStorage {
    type Error = Infallible;

    fn save_game(&self, save_name: &str, snapshot: &str) -> Result<(), Self::Error> {
        self.insert(save_name, snapshot);
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.get(save_name))
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(save_name);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid save name {0:?}")]
    InvalidName(String),
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One `<save_name>.json` file per slot under `root`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, save_name: &str) -> Result<PathBuf, StorageError> {
        let valid = !save_name.is_empty()
            && save_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !save_name.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidName(save_name.to_string()));
        }
        Ok(self.root.join(format!("{save_name}.json")))
    }
}

fn io_err<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> StorageError + 'a {
    move |source| StorageError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

impl GameStorage for FileStorage {
    type Error = StorageError;

    fn save_game(&self, save_name: &str, snapshot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        fs::create_dir_all(&self.root).map_err(io_err("create", &self.root))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, snapshot).map_err(io_err("write", &tmp))?;
        fs::rename(&tmp, &path).map_err(io_err("replace", &path))?;
        Ok(())
    }

    fn load_game(&self, save_name: &str) -> Result<Option<String>, Self::Error> {
        let path = self.slot_path(save_name)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err("read", &path)(err)),
        }
    }

    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(save_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err("delete", &path)(err)),
        }
    }
}
