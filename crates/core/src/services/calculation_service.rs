use crate::models::analytics::{AssetBreakdown, LevelBreakdown, PortfolioSummary, ProfitResult};
use crate::models::asset::{DigitalAsset, TakeProfitLevel};
use crate::models::settings::{CostBasisFormula, Settings, ZeroPricePolicy};

/// Derives capital gains, taxes and net profit from realized rung prices,
/// plus portfolio-wide totals.
///
/// Stateless apart from its configuration: every call recomputes from the
/// assets passed in, nothing is cached and inputs are never mutated.
///
/// Taxes are computed per rung (flat tax on each sale event). A loss on one
/// rung never offsets the tax owed on another.
#[derive(Debug, Clone)]
pub struct CalculationService {
    tax_rate: f64,
    zero_price: ZeroPricePolicy,
    cost_basis: CostBasisFormula,
}

impl CalculationService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tax_rate: settings.tax_rate,
            zero_price: settings.zero_price,
            cost_basis: settings.cost_basis,
        }
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// The price a rung was sold at, or `None` if it counts as unsold.
    fn realized_price(&self, level: &TakeProfitLevel) -> Option<f64> {
        match (level.price, self.zero_price) {
            (Some(price), ZeroPricePolicy::NotSold) if price == 0.0 => None,
            (price, _) => price,
        }
    }

    /// Profit of a single rung, `None` while it is unsold.
    ///
    /// ```text
    /// cost_basis    = sold_quantity × entry_price
    /// revenue       = price × sold_quantity
    /// capital_gains = revenue − cost_basis
    /// taxes         = capital_gains × tax_rate   (only if capital_gains > 0)
    /// net_profit    = capital_gains − taxes
    /// ```
    #[must_use]
    pub fn profit_for_level(
        &self,
        asset: &DigitalAsset,
        level: &TakeProfitLevel,
    ) -> Option<ProfitResult> {
        let price = self.realized_price(level)?;

        let sold_quantity = level.quantity;
        let cost_basis = match self.cost_basis {
            CostBasisFormula::PerUnit => sold_quantity * asset.entry_price,
            CostBasisFormula::QuantityWeighted => {
                (sold_quantity / asset.quantity) * (asset.entry_price * asset.quantity)
            }
        };
        let revenue = price * sold_quantity;
        let capital_gains = revenue - cost_basis;
        let taxes = if capital_gains > 0.0 {
            capital_gains * self.tax_rate
        } else {
            0.0
        };

        Some(ProfitResult {
            net_profit: capital_gains - taxes,
            capital_gains,
            taxes,
        })
    }

    /// Original cost of every holding. Not reduced as rungs are sold.
    #[must_use]
    pub fn total_investment(&self, assets: &[DigitalAsset]) -> f64 {
        assets.iter().map(DigitalAsset::position_cost).sum()
    }

    /// Sum over the sold rungs of one asset.
    #[must_use]
    pub fn asset_profit(&self, asset: &DigitalAsset) -> ProfitResult {
        asset
            .take_profit_levels
            .iter()
            .filter_map(|(_, level)| self.profit_for_level(asset, level))
            .sum()
    }

    /// Sum over every sold rung of every asset. The three totals are
    /// independent running sums.
    #[must_use]
    pub fn total_profits(&self, assets: &[DigitalAsset]) -> ProfitResult {
        assets.iter().map(|asset| self.asset_profit(asset)).sum()
    }

    /// Per-rung detail of one asset, as shown in the asset table.
    #[must_use]
    pub fn asset_breakdown(&self, asset: &DigitalAsset) -> AssetBreakdown {
        let levels: Vec<LevelBreakdown> = asset
            .take_profit_levels
            .iter()
            .map(|(name, level)| LevelBreakdown {
                level: name,
                percentage: level.percentage,
                target_price: level.target_price,
                quantity: level.quantity,
                price: level.price,
                profit: self.profit_for_level(asset, level),
            })
            .collect();
        let total: ProfitResult = levels.iter().filter_map(|l| l.profit).sum();

        AssetBreakdown {
            asset_id: asset.id,
            symbol: asset.symbol.clone(),
            category: asset.category,
            narrative: asset.narrative,
            entry_price: asset.entry_price,
            quantity: asset.quantity,
            moonbag_percentage: asset.moonbag_percentage,
            levels,
            total,
        }
    }

    #[must_use]
    pub fn asset_breakdowns(&self, assets: &[DigitalAsset]) -> Vec<AssetBreakdown> {
        assets.iter().map(|a| self.asset_breakdown(a)).collect()
    }

    /// Headline figures: investment, gross profit, net profit, taxes.
    #[must_use]
    pub fn summary(&self, assets: &[DigitalAsset]) -> PortfolioSummary {
        let profits = self.total_profits(assets);
        PortfolioSummary {
            asset_count: assets.len(),
            total_investment: self.total_investment(assets),
            capital_gains: profits.capital_gains,
            net_profit: profits.net_profit,
            taxes: profits.taxes,
        }
    }
}

impl Default for CalculationService {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
