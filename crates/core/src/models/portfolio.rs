use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::DigitalAsset;

/// The main data container: every tracked asset in insertion order.
///
/// Serialized transparently as a JSON array, which is exactly the blob kept
/// in the storage slot. Order is never changed after insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    pub assets: Vec<DigitalAsset>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_assets(assets: Vec<DigitalAsset>) -> Self {
        Self { assets }
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&DigitalAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.assets.iter().position(|a| a.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DigitalAsset> {
        self.assets.iter()
    }
}
