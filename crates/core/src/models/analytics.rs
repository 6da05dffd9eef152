use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use uuid::Uuid;

use super::asset::{AssetCategory, LevelName, Narrative};

/// Outcome of one or more realized sales.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitResult {
    /// Capital gains minus taxes
    pub net_profit: f64,

    /// Revenue minus proportional cost basis (negative on a loss)
    pub capital_gains: f64,

    /// Tax owed on positive gains, never negative
    pub taxes: f64,
}

impl ProfitResult {
    pub const ZERO: ProfitResult = ProfitResult {
        net_profit: 0.0,
        capital_gains: 0.0,
        taxes: 0.0,
    };
}

impl Add for ProfitResult {
    type Output = ProfitResult;

    fn add(self, rhs: Self) -> Self::Output {
        ProfitResult {
            net_profit: self.net_profit + rhs.net_profit,
            capital_gains: self.capital_gains + rhs.capital_gains,
            taxes: self.taxes + rhs.taxes,
        }
    }
}

impl AddAssign for ProfitResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for ProfitResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ProfitResult::ZERO, |acc, p| acc + p)
    }
}

/// One take-profit cell of the asset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBreakdown {
    pub level: LevelName,
    pub percentage: f64,
    pub target_price: f64,
    pub quantity: f64,

    /// Realized sale price, if any
    pub price: Option<f64>,

    /// `None` while the rung counts as unsold
    pub profit: Option<ProfitResult>,
}

/// One row of the asset table: the asset's fields plus per-rung results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBreakdown {
    pub asset_id: Uuid,
    pub symbol: String,
    pub category: AssetCategory,
    pub narrative: Narrative,
    pub entry_price: f64,
    pub quantity: f64,
    pub moonbag_percentage: f64,

    /// Always four entries, tp1..tp4
    pub levels: Vec<LevelBreakdown>,

    /// Sum over the sold rungs
    pub total: ProfitResult,
}

/// Headline figures for the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub asset_count: usize,

    /// Original cost of every holding, not reduced by sales
    pub total_investment: f64,

    /// Gross profit across all realized rungs
    pub capital_gains: f64,

    pub net_profit: f64,

    /// Estimated taxes across all realized rungs
    pub taxes: f64,
}

/// Grouping used by the allocation chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// One slice per symbol
    #[default]
    Assets,
    /// One slice per narrative tag
    Narrative,
}

impl std::fmt::Display for ChartView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartView::Assets => write!(f, "assets"),
            ChartView::Narrative => write!(f, "narrative"),
        }
    }
}

/// One slice of the allocation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    /// Symbol or narrative name
    pub label: String,

    /// Summed `entry_price × quantity` of the matching assets
    pub value: f64,

    /// Fraction (0..=1) of total investment; 0 when nothing is invested
    pub share: f64,
}
