use std::collections::HashMap;

use crate::errors::CoreError;
#[cfg(not(target_arch = "wasm32"))]
use crate::models::settings::is_valid_slot_name;

/// A named-slot key-value store holding opaque string blobs.
///
/// In the browser this is backed by `localStorage`; natively by
/// [`FileStore`]. [`MemoryStore`] serves tests and embedders that persist
/// elsewhere.
pub trait SlotStore {
    /// Read the blob in `slot`, or `None` if the slot has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError>;

    /// Replace the blob in `slot`.
    fn write(&mut self, slot: &str, contents: &str) -> Result<(), CoreError>;

    /// Delete `slot`. Removing an absent slot is not an error.
    fn remove(&mut self, slot: &str) -> Result<(), CoreError>;
}

/// In-process slot store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot (e.g., with a blob exported from the browser).
    pub fn with_slot(mut self, slot: impl Into<String>, contents: impl Into<String>) -> Self {
        self.slots.insert(slot.into(), contents.into());
        self
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), CoreError> {
        self.slots.insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<(), CoreError> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// Slot store keeping one `<slot>.json` file per slot in a directory
/// (native only, not WASM).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Use `dir` as the store root, creating it if needed.
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, slot: &str) -> Result<std::path::PathBuf, CoreError> {
        if !is_valid_slot_name(slot) {
            return Err(CoreError::Storage(format!(
                "Invalid slot name '{slot}': use letters, digits, '-' or '_'"
            )));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SlotStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(slot)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, slot: &str, contents: &str) -> Result<(), CoreError> {
        let path = self.path_for(slot)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<(), CoreError> {
        let path = self.path_for(slot)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
