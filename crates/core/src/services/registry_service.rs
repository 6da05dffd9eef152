use tracing::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{DigitalAsset, LevelName};
use crate::models::portfolio::Portfolio;

/// Mutations of the asset collection: add, remove, record rung sale prices.
///
/// Pure business logic, no I/O. Unknown ids are a silent no-op reported
/// through the `bool` return value, never an error.
pub struct RegistryService;

impl RegistryService {
    pub fn new() -> Self {
        Self
    }

    /// Append a fully-formed asset. The percentage-sum invariant is checked
    /// when the asset is built, not here; only id uniqueness is enforced.
    pub fn add(&self, portfolio: &mut Portfolio, asset: DigitalAsset) -> Result<(), CoreError> {
        if portfolio.contains(asset.id) {
            return Err(CoreError::DuplicateAsset(asset.id.to_string()));
        }
        portfolio.assets.push(asset);
        Ok(())
    }

    /// Remove the asset with `id`. Returns `false` (and changes nothing)
    /// when no such asset exists.
    pub fn remove(&self, portfolio: &mut Portfolio, id: Uuid) -> bool {
        match portfolio.position(id) {
            Some(idx) => {
                portfolio.assets.remove(idx);
                true
            }
            None => {
                debug!(%id, "remove ignored: asset not found");
                false
            }
        }
    }

    /// Record the realized sale price of one rung.
    ///
    /// Only `price` changes; percentage, target price and quantity of the rung
    /// and every field of the asset stay as they are. Returns `Ok(false)` when
    /// the asset does not exist.
    pub fn set_level_price(
        &self,
        portfolio: &mut Portfolio,
        id: Uuid,
        level: LevelName,
        price: f64,
    ) -> Result<bool, CoreError> {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Sale price for {level} must be a non-negative number, got {price}"
            )));
        }
        Ok(self.write_level_price(portfolio, id, level, Some(price)))
    }

    /// Mark a rung as not sold again.
    pub fn clear_level_price(&self, portfolio: &mut Portfolio, id: Uuid, level: LevelName) -> bool {
        self.write_level_price(portfolio, id, level, None)
    }

    fn write_level_price(
        &self,
        portfolio: &mut Portfolio,
        id: Uuid,
        level: LevelName,
        price: Option<f64>,
    ) -> bool {
        match portfolio.assets.iter_mut().find(|a| a.id == id) {
            Some(asset) => {
                asset.take_profit_levels.get_mut(level).price = price;
                true
            }
            None => {
                debug!(%id, %level, "price update ignored: asset not found");
                false
            }
        }
    }
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new()
    }
}
