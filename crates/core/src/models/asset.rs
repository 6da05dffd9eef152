use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CoreError;

/// Thematic tag used to group assets in allocation views.
/// Carries no calculation weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Narrative {
    DeFi,
    Layer1,
    Layer2,
    GameFi,
    NFT,
    Metaverse,
    Web3,
}

impl Narrative {
    pub const ALL: [Narrative; 7] = [
        Narrative::DeFi,
        Narrative::Layer1,
        Narrative::Layer2,
        Narrative::GameFi,
        Narrative::NFT,
        Narrative::Metaverse,
        Narrative::Web3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Narrative::DeFi => "DeFi",
            Narrative::Layer1 => "Layer1",
            Narrative::Layer2 => "Layer2",
            Narrative::GameFi => "GameFi",
            Narrative::NFT => "NFT",
            Narrative::Metaverse => "Metaverse",
            Narrative::Web3 => "Web3",
        }
    }
}

impl std::fmt::Display for Narrative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Narrative {
    type Err = CoreError;

    /// Case-insensitive match on the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Narrative::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown narrative '{s}'")))
    }
}

/// Risk bucket of an asset. Selects the default take-profit ladder
/// when the asset is created (see [`crate::models::ladder::LadderTemplate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    HighRisk,
    Airdrop,
    MidCap,
    HighCap,
    BlueChips,
    Actions,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::HighRisk,
        AssetCategory::Airdrop,
        AssetCategory::MidCap,
        AssetCategory::HighCap,
        AssetCategory::BlueChips,
        AssetCategory::Actions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::HighRisk => "HighRisk",
            AssetCategory::Airdrop => "Airdrop",
            AssetCategory::MidCap => "MidCap",
            AssetCategory::HighCap => "HighCap",
            AssetCategory::BlueChips => "BlueChips",
            AssetCategory::Actions => "Actions",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AssetCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown category '{s}'")))
    }
}

/// Name of one rung of the take-profit ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelName {
    Tp1,
    Tp2,
    Tp3,
    Tp4,
}

impl LevelName {
    /// All rungs in ladder order.
    pub const ALL: [LevelName; 4] = [LevelName::Tp1, LevelName::Tp2, LevelName::Tp3, LevelName::Tp4];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelName::Tp1 => "tp1",
            LevelName::Tp2 => "tp2",
            LevelName::Tp3 => "tp3",
            LevelName::Tp4 => "tp4",
        }
    }
}

impl std::fmt::Display for LevelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LevelName::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown take-profit level '{s}'")))
    }
}

/// One rung of an exit ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeProfitLevel {
    /// Share (0–100) of the original holding earmarked for this rung
    pub percentage: f64,

    /// Planned exit price (informational only)
    #[serde(default)]
    pub target_price: f64,

    /// Units covered by this rung, fixed when the asset was created
    pub quantity: f64,

    /// Realized sale price, `None` while the rung has not been executed.
    /// Zero is a real price, not "unsold".
    #[serde(default)]
    pub price: Option<f64>,
}

impl TakeProfitLevel {
    /// Build an unsold rung, deriving its quantity from the holding.
    pub fn planned(holding_quantity: f64, percentage: f64, target_price: f64) -> Self {
        Self {
            percentage,
            target_price,
            quantity: holding_quantity * (percentage / 100.0),
            price: None,
        }
    }

    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.price.is_some()
    }
}

/// The four named rungs of an asset's take-profit ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitLevels {
    pub tp1: TakeProfitLevel,
    pub tp2: TakeProfitLevel,
    pub tp3: TakeProfitLevel,
    pub tp4: TakeProfitLevel,
}

impl TakeProfitLevels {
    pub fn get(&self, name: LevelName) -> &TakeProfitLevel {
        match name {
            LevelName::Tp1 => &self.tp1,
            LevelName::Tp2 => &self.tp2,
            LevelName::Tp3 => &self.tp3,
            LevelName::Tp4 => &self.tp4,
        }
    }

    pub fn get_mut(&mut self, name: LevelName) -> &mut TakeProfitLevel {
        match name {
            LevelName::Tp1 => &mut self.tp1,
            LevelName::Tp2 => &mut self.tp2,
            LevelName::Tp3 => &mut self.tp3,
            LevelName::Tp4 => &mut self.tp4,
        }
    }

    /// Rungs in ladder order.
    pub fn iter(&self) -> impl Iterator<Item = (LevelName, &TakeProfitLevel)> + '_ {
        LevelName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// Sum of the four rung percentages (moonbag excluded).
    #[must_use]
    pub fn percentage_total(&self) -> f64 {
        self.iter().map(|(_, level)| level.percentage).sum()
    }
}

/// Tolerance for the "percentages add up to 100" check.
pub const PERCENTAGE_SUM_TOLERANCE: f64 = 1e-9;

/// One tracked position.
///
/// Created whole by [`crate::models::draft::AssetDraft::build`]; afterwards only
/// the rung prices change. Serialized with camelCase field names, so blobs
/// written by the browser front end deserialize as-is.
///
/// The browser front end stores a cleared sale-price field as `0`, so in its
/// blobs a price of 0 means "unsold". Open those blobs with
/// [`crate::models::settings::ZeroPricePolicy::NotSold`]; the default policy
/// reads such rungs as sales at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalAsset {
    /// Opaque unique identifier, the only lookup/delete key
    pub id: Uuid,

    /// Free-text ticker label, stored as entered
    pub symbol: String,

    pub narrative: Narrative,

    pub category: AssetCategory,

    /// Cost basis per unit
    pub entry_price: f64,

    /// Total units held
    pub quantity: f64,

    pub take_profit_levels: TakeProfitLevels,

    /// Share not covered by any rung (informational)
    #[serde(default)]
    pub moonbag_percentage: f64,
}

impl DigitalAsset {
    /// Original cost of the whole holding (`entry_price × quantity`).
    #[must_use]
    pub fn position_cost(&self) -> f64 {
        self.entry_price * self.quantity
    }

    pub fn level(&self, name: LevelName) -> &TakeProfitLevel {
        self.take_profit_levels.get(name)
    }

    /// Check the invariants every stored asset must hold.
    ///
    /// Same rules as [`crate::models::draft::AssetDraft::validate`], plus
    /// rung quantities and realized prices must be finite and non-negative.
    /// Used for assets that arrive already built (imports).
    pub fn validate(&self) -> Result<(), CoreError> {
        check_symbol(&self.symbol)?;
        check_position(self.entry_price, self.quantity)?;

        for (name, level) in self.take_profit_levels.iter() {
            check_rung(name, level.percentage, level.target_price)?;
            if !level.quantity.is_finite() || level.quantity < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "{name} quantity must not be negative, got {}",
                    level.quantity
                )));
            }
            if let Some(price) = level.price {
                if !price.is_finite() || price < 0.0 {
                    return Err(CoreError::ValidationError(format!(
                        "{name} sale price must not be negative, got {price}"
                    )));
                }
            }
        }
        check_percentage("moonbag", self.moonbag_percentage)?;

        check_percentage_total(self.take_profit_levels.percentage_total() + self.moonbag_percentage)
    }
}

// ── Shared checks ───────────────────────────────────────────────────

pub(crate) fn check_symbol(symbol: &str) -> Result<(), CoreError> {
    if symbol.trim().is_empty() {
        return Err(CoreError::ValidationError("Symbol must not be empty".into()));
    }
    Ok(())
}

pub(crate) fn check_position(entry_price: f64, quantity: f64) -> Result<(), CoreError> {
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Entry price must be positive, got {entry_price}"
        )));
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

pub(crate) fn check_rung(name: LevelName, percentage: f64, target_price: f64) -> Result<(), CoreError> {
    check_percentage(name.as_str(), percentage)?;
    if !target_price.is_finite() || target_price < 0.0 {
        return Err(CoreError::ValidationError(format!(
            "{name} target price must not be negative, got {target_price}"
        )));
    }
    Ok(())
}

pub(crate) fn check_percentage(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CoreError::ValidationError(format!(
            "{field} percentage must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// The four rungs and the moonbag must add up to 100.
pub(crate) fn check_percentage_total(total: f64) -> Result<(), CoreError> {
    if (total - 100.0).abs() > PERCENTAGE_SUM_TOLERANCE {
        return Err(CoreError::ValidationError(format!(
            "Total percentage must equal 100%, got {total}%"
        )));
    }
    Ok(())
}
