pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use models::{
    analytics::{AllocationSlice, AssetBreakdown, ChartView, PortfolioSummary, ProfitResult},
    asset::{AssetCategory, DigitalAsset, LevelName, Narrative},
    draft::{AssetDraft, RawAssetInput},
    portfolio::Portfolio,
    settings::Settings,
};
use services::{
    allocation_service::AllocationService, calculation_service::CalculationService,
    registry_service::RegistryService,
};
use storage::{format, manager::StorageManager, slot::SlotStore};
use tracing::{info, warn};
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the take-profit tracker core library.
///
/// Single owner of the asset collection. Every mutation builds the next
/// collection, swaps it in, then writes it to the slot store. Persistence is
/// fire-and-forget: a failed write is logged, leaves
/// [`TpTracker::has_unsaved_changes`] set, and is not retried (last write wins).
#[must_use]
pub struct TpTracker<S: SlotStore> {
    portfolio: Portfolio,
    settings: Settings,
    store: S,
    registry_service: RegistryService,
    calculation_service: CalculationService,
    allocation_service: AllocationService,
    /// Tracks whether the in-memory collection differs from the last successful write.
    dirty: bool,
}

impl<S: SlotStore> std::fmt::Debug for TpTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TpTracker")
            .field("assets", &self.portfolio.len())
            .field("settings", &self.settings)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl<S: SlotStore> TpTracker<S> {
    /// Open the tracker on `store`, loading the collection from the configured slot.
    /// Missing or malformed slot content yields an empty collection.
    pub fn open(store: S, settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let portfolio = StorageManager::load(&store, &settings.storage_slot);
        Ok(Self::build(portfolio, settings, store))
    }

    /// Open with default settings (30% tax, slot `crypto-assets`).
    pub fn with_defaults(store: S) -> Self {
        let settings = Settings::default();
        let portfolio = StorageManager::load(&store, &settings.storage_slot);
        Self::build(portfolio, settings, store)
    }

    /// Write the current collection to the slot.
    /// Clears the unsaved-changes flag on success.
    pub fn save(&mut self) -> Result<(), CoreError> {
        StorageManager::save(&mut self.store, &self.settings.storage_slot, &self.portfolio)?;
        self.dirty = false;
        Ok(())
    }

    /// Returns `true` if the latest mutation has not been written to the slot.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Asset Management ────────────────────────────────────────────

    /// Add an already-built asset. Fails only if its id is taken.
    pub fn add_asset(&mut self, asset: DigitalAsset) -> Result<Uuid, CoreError> {
        let id = asset.id;
        let mut next = self.portfolio.clone();
        self.registry_service.add(&mut next, asset)?;
        info!(%id, "asset added");
        self.commit(next);
        Ok(id)
    }

    /// Validate a draft, build the asset with a fresh id and add it.
    /// On validation failure nothing changes.
    pub fn create_asset(&mut self, draft: &AssetDraft) -> Result<Uuid, CoreError> {
        let asset = draft.build()?;
        self.add_asset(asset)
    }

    /// Parse raw form text, then behave like [`TpTracker::create_asset`].
    pub fn create_asset_from_input(&mut self, input: RawAssetInput) -> Result<Uuid, CoreError> {
        let draft = AssetDraft::try_from(input)?;
        self.create_asset(&draft)
    }

    /// Remove an asset by id. Unknown ids are ignored and return `false`.
    pub fn remove_asset(&mut self, id: Uuid) -> bool {
        let mut next = self.portfolio.clone();
        if !self.registry_service.remove(&mut next, id) {
            return false;
        }
        info!(%id, "asset removed");
        self.commit(next);
        true
    }

    /// Remove several assets. Returns how many were actually removed.
    pub fn remove_assets(&mut self, ids: &[Uuid]) -> usize {
        let mut next = self.portfolio.clone();
        let removed = ids
            .iter()
            .filter(|id| self.registry_service.remove(&mut next, **id))
            .count();
        if removed > 0 {
            self.commit(next);
        }
        removed
    }

    /// Remove every asset.
    pub fn clear(&mut self) {
        if !self.portfolio.is_empty() {
            self.commit(Portfolio::new());
        }
    }

    /// Record the sale price of one rung. Unknown ids return `Ok(false)`;
    /// a negative or non-finite price is rejected before anything changes.
    pub fn set_level_price(
        &mut self,
        id: Uuid,
        level: LevelName,
        price: f64,
    ) -> Result<bool, CoreError> {
        let mut next = self.portfolio.clone();
        let updated = self
            .registry_service
            .set_level_price(&mut next, id, level, price)?;
        if updated {
            self.commit(next);
        }
        Ok(updated)
    }

    /// Mark a rung as not sold. Unknown ids return `false`.
    pub fn clear_level_price(&mut self, id: Uuid, level: LevelName) -> bool {
        let mut next = self.portfolio.clone();
        let updated = self.registry_service.clear_level_price(&mut next, id, level);
        if updated {
            self.commit(next);
        }
        updated
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// All assets in insertion order.
    #[must_use]
    pub fn assets(&self) -> &[DigitalAsset] {
        &self.portfolio.assets
    }

    #[must_use]
    pub fn get_asset(&self, id: Uuid) -> Option<&DigitalAsset> {
        self.portfolio.get(id)
    }

    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.portfolio.len()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn assets_by_narrative(&self, narrative: Narrative) -> Vec<&DigitalAsset> {
        self.portfolio
            .iter()
            .filter(|a| a.narrative == narrative)
            .collect()
    }

    #[must_use]
    pub fn assets_by_category(&self, category: AssetCategory) -> Vec<&DigitalAsset> {
        self.portfolio
            .iter()
            .filter(|a| a.category == category)
            .collect()
    }

    /// Assets whose symbol contains `query` (case-insensitive).
    #[must_use]
    pub fn search_assets(&self, query: &str) -> Vec<&DigitalAsset> {
        let q = query.trim().to_lowercase();
        self.portfolio
            .iter()
            .filter(|a| a.symbol.to_lowercase().contains(&q))
            .collect()
    }

    // ── Calculations ────────────────────────────────────────────────

    /// Profit of one rung of one asset, `None` while the rung is unsold.
    pub fn profit_for_level(
        &self,
        id: Uuid,
        level: LevelName,
    ) -> Result<Option<ProfitResult>, CoreError> {
        let asset = self
            .portfolio
            .get(id)
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))?;
        Ok(self
            .calculation_service
            .profit_for_level(asset, asset.level(level)))
    }

    #[must_use]
    pub fn total_investment(&self) -> f64 {
        self.calculation_service
            .total_investment(&self.portfolio.assets)
    }

    #[must_use]
    pub fn total_profits(&self) -> ProfitResult {
        self.calculation_service.total_profits(&self.portfolio.assets)
    }

    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.calculation_service.summary(&self.portfolio.assets)
    }

    /// Asset table rows, in insertion order.
    #[must_use]
    pub fn asset_breakdowns(&self) -> Vec<AssetBreakdown> {
        self.calculation_service
            .asset_breakdowns(&self.portfolio.assets)
    }

    /// Allocation chart slices for the chosen grouping.
    #[must_use]
    pub fn allocation(&self, view: ChartView) -> Vec<AllocationSlice> {
        self.allocation_service
            .allocation(&self.portfolio.assets, view)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all assets as pretty JSON (same shape as the slot blob).
    pub fn export_assets_to_json(&self) -> Result<String, CoreError> {
        format::encode_pretty(&self.portfolio)
    }

    /// Import assets from a JSON array and append them.
    /// All-or-nothing: if any asset breaks an asset invariant (see
    /// [`DigitalAsset::validate`]) or reuses a taken id, none are added.
    /// Returns the number of assets imported.
    pub fn import_assets_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let imported = format::decode(json)?;
        let count = imported.len();

        let mut next = self.portfolio.clone();
        for asset in imported.assets {
            asset.validate()?;
            self.registry_service.add(&mut next, asset)?;
        }

        if count > 0 {
            info!(count, "assets imported");
            self.commit(next);
        }
        Ok(count)
    }

    /// Export the asset table as CSV.
    /// Columns: id, symbol, category, narrative, entry_price, quantity,
    /// then percentage / target_price / price for tp1..tp4, then moonbag_percentage.
    /// Unsold prices are left empty.
    #[must_use]
    pub fn export_assets_to_csv(&self) -> String {
        let mut csv = String::from("id,symbol,category,narrative,entry_price,quantity");
        for level in LevelName::ALL {
            csv.push_str(&format!(",{level}_percentage,{level}_target_price,{level}_price"));
        }
        csv.push_str(",moonbag_percentage\n");

        for asset in self.portfolio.iter() {
            // Escape CSV: quote symbols containing commas, quotes, or newlines
            let symbol = if asset.symbol.contains(',')
                || asset.symbol.contains('"')
                || asset.symbol.contains('\n')
            {
                format!("\"{}\"", asset.symbol.replace('"', "\"\""))
            } else {
                asset.symbol.clone()
            };
            csv.push_str(&format!(
                "{},{},{},{},{},{}",
                asset.id, symbol, asset.category, asset.narrative, asset.entry_price, asset.quantity,
            ));
            for (_, level) in asset.take_profit_levels.iter() {
                let price = level.price.map(|p| p.to_string()).unwrap_or_default();
                csv.push_str(&format!(
                    ",{},{},{}",
                    level.percentage, level.target_price, price
                ));
            }
            csv.push_str(&format!(",{}\n", asset.moonbag_percentage));
        }
        csv
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Swap in the next collection and persist it.
    fn commit(&mut self, next: Portfolio) {
        self.portfolio = next;
        self.dirty = true;
        if let Err(e) = self.save() {
            warn!(slot = %self.settings.storage_slot, error = %e, "failed to persist assets");
        }
    }

    fn build(portfolio: Portfolio, settings: Settings, store: S) -> Self {
        let calculation_service = CalculationService::new(&settings);

        Self {
            portfolio,
            settings,
            store,
            registry_service: RegistryService::new(),
            calculation_service,
            allocation_service: AllocationService::new(),
            dirty: false,
        }
    }
}
