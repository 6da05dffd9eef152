use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::format;
use super::slot::SlotStore;

/// High-level storage operations: load/save the asset collection from/to a slot.
pub struct StorageManager;

impl StorageManager {
    /// Load the collection stored in `slot`.
    ///
    /// Fails open: an absent slot, a read error or a blob that does not parse
    /// as a list of assets all yield an empty portfolio.
    pub fn load<S: SlotStore + ?Sized>(store: &S, slot: &str) -> Portfolio {
        let blob = match store.read(slot) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!(slot, "slot empty, starting with no assets");
                return Portfolio::new();
            }
            Err(e) => {
                warn!(slot, error = %e, "failed to read slot, starting with no assets");
                return Portfolio::new();
            }
        };

        match format::decode(&blob) {
            Ok(portfolio) => {
                debug!(slot, assets = portfolio.len(), "loaded assets");
                portfolio
            }
            Err(e) => {
                warn!(slot, error = %e, "malformed slot content, starting with no assets");
                Portfolio::new()
            }
        }
    }

    /// Strict variant of [`StorageManager::load`]: surfaces read and decode errors.
    pub fn try_load<S: SlotStore + ?Sized>(store: &S, slot: &str) -> Result<Portfolio, CoreError> {
        match store.read(slot)? {
            Some(blob) => format::decode(&blob),
            None => Ok(Portfolio::new()),
        }
    }

    /// Write the whole collection to `slot`, replacing what was there.
    pub fn save<S: SlotStore + ?Sized>(
        store: &mut S,
        slot: &str,
        portfolio: &Portfolio,
    ) -> Result<(), CoreError> {
        let blob = format::encode(portfolio)?;
        store.write(slot, &blob)
    }
}
