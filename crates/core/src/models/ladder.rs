use serde::{Deserialize, Serialize};

use super::asset::AssetCategory;

/// Default split of a new holding across the four rungs and the moonbag,
/// all in percent of the total quantity.
///
/// Looked up once when an asset is drafted; the values are copied into the
/// asset and never re-applied if the category changes later.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderTemplate {
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub tp4: f64,
    pub moonbag: f64,
}

impl LadderTemplate {
    const fn new(tp1: f64, tp2: f64, tp3: f64, tp4: f64, moonbag: f64) -> Self {
        Self { tp1, tp2, tp3, tp4, moonbag }
    }

    /// Every row must sum to exactly 100.
    pub fn for_category(category: AssetCategory) -> Self {
        match category {
            AssetCategory::HighRisk | AssetCategory::Airdrop => Self::new(30.0, 25.0, 10.0, 5.0, 30.0),
            AssetCategory::MidCap | AssetCategory::HighCap => Self::new(25.0, 20.0, 15.0, 10.0, 30.0),
            AssetCategory::BlueChips => Self::new(20.0, 15.0, 10.0, 10.0, 45.0),
            AssetCategory::Actions => Self::new(30.0, 25.0, 25.0, 10.0, 10.0),
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.tp1 + self.tp2 + self.tp3 + self.tp4 + self.moonbag
    }
}
