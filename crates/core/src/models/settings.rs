use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Flat tax applied to positive gains (17.2% social charges + 12.8% income tax).
pub const DEFAULT_TAX_RATE: f64 = 0.30;

/// Storage slot the asset collection lives in.
pub const DEFAULT_STORAGE_SLOT: &str = "crypto-assets";

/// How a realized price of exactly 0 is interpreted.
///
/// Blobs written by the browser front end store a cleared sale price as 0,
/// meaning "unsold". Load those with `NotSold`, otherwise the cleared rungs
/// count as total losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPricePolicy {
    /// 0 is a real sale at zero (a total loss on the rung)
    #[default]
    RealizedSale,
    /// 0 counts as "not sold", as the browser front end does
    NotSold,
}

/// Formula for the cost basis of the quantity sold on a rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasisFormula {
    /// `sold_quantity × entry_price`
    #[default]
    PerUnit,
    /// `(sold_quantity / quantity) × (entry_price × quantity)`.
    /// Algebraically identical, kept for bit-for-bit parity with stored reports.
    QuantityWeighted,
}

/// Engine and storage configuration.
///
/// Missing fields fall back to their defaults when parsed from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fraction of positive capital gains owed as tax (0..=1)
    pub tax_rate: f64,

    pub zero_price: ZeroPricePolicy,

    pub cost_basis: CostBasisFormula,

    /// Name of the storage slot holding the asset collection.
    /// Restricted to `[A-Za-z0-9_-]` so it can double as a file name.
    pub storage_slot: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            zero_price: ZeroPricePolicy::default(),
            cost_basis: CostBasisFormula::default(),
            storage_slot: DEFAULT_STORAGE_SLOT.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidSettings(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.tax_rate.is_finite() || !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(CoreError::InvalidSettings(format!(
                "tax_rate must be between 0 and 1, got {}",
                self.tax_rate
            )));
        }
        if !is_valid_slot_name(&self.storage_slot) {
            return Err(CoreError::InvalidSettings(format!(
                "storage_slot '{}' must be non-empty and use only letters, digits, '-' or '_'",
                self.storage_slot
            )));
        }
        Ok(())
    }
}

/// Slot names map to file names in [`crate::storage::slot::FileStore`], so only
/// `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_slot_name(slot: &str) -> bool {
    !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
