use uuid::Uuid;

use tp_tracker_core::errors::CoreError;
use tp_tracker_core::models::analytics::{ChartView, ProfitResult};
use tp_tracker_core::models::asset::{AssetCategory, LevelName, Narrative};
use tp_tracker_core::models::draft::{AssetDraft, RawAssetInput, RawLevelInput};
use tp_tracker_core::models::settings::{CostBasisFormula, Settings, ZeroPricePolicy};
use tp_tracker_core::storage::format;
use tp_tracker_core::storage::slot::{FileStore, MemoryStore, SlotStore};
use tp_tracker_core::TpTracker;

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

const SLOT: &str = "crypto-assets";

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn tracker() -> TpTracker<MemoryStore> {
    TpTracker::with_defaults(MemoryStore::new())
}

fn draft(symbol: &str, narrative: Narrative, entry_price: f64, quantity: f64) -> AssetDraft {
    AssetDraft::new(symbol, narrative, AssetCategory::MidCap, entry_price, quantity)
}

/// Accepts reads, refuses every write.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl SlotStore for ReadOnlyStore {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError> {
        self.inner.read(slot)
    }

    fn write(&mut self, _slot: &str, _contents: &str) -> Result<(), CoreError> {
        Err(CoreError::Storage("storage is read-only".into()))
    }

    fn remove(&mut self, _slot: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

fn persisted_len(tracker: &TpTracker<MemoryStore>) -> usize {
    let blob = tracker.store().read(SLOT).unwrap().unwrap();
    format::decode(&blob).unwrap().len()
}

// ═══════════════════════════════════════════════════════════════════
// Opening
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_open_empty_store() {
    let t = tracker();
    assert_eq!(t.asset_count(), 0);
    assert!(!t.has_unsaved_changes());
    assert_eq!(t.total_investment(), 0.0);
    assert_eq!(t.total_profits(), ProfitResult::ZERO);
}

#[test]
fn test_open_malformed_slot_starts_empty() {
    let store = MemoryStore::new().with_slot(SLOT, "{ this is not an asset list");
    let t = TpTracker::with_defaults(store);
    assert_eq!(t.asset_count(), 0);
}

#[test]
fn test_open_rejects_invalid_settings() {
    let settings = Settings {
        tax_rate: -0.1,
        ..Settings::default()
    };
    let err = TpTracker::open(MemoryStore::new(), settings).unwrap_err();
    assert!(matches!(err, CoreError::InvalidSettings(_)));
}

#[test]
fn test_open_uses_configured_slot() {
    let settings = Settings {
        storage_slot: "other".into(),
        ..Settings::default()
    };
    let mut t = TpTracker::open(MemoryStore::new(), settings).unwrap();
    t.create_asset(&draft("ETH", Narrative::Layer1, 1.0, 1.0)).unwrap();

    assert!(t.store().read("other").unwrap().is_some());
    assert!(t.store().read(SLOT).unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════
// Mutations & persistence
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_create_asset_persists() {
    let mut t = tracker();
    let id = t.create_asset(&draft("ETH", Narrative::Layer1, 2500.0, 2.0)).unwrap();

    assert_eq!(t.asset_count(), 1);
    assert_eq!(t.get_asset(id).unwrap().symbol, "ETH");
    assert_eq!(persisted_len(&t), 1);
    assert!(!t.has_unsaved_changes());
}

#[test]
fn test_create_invalid_asset_changes_nothing() {
    let mut t = tracker();
    let bad = draft("ETH", Narrative::Layer1, 2500.0, 2.0).with_moonbag(90.0);

    let err = t.create_asset(&bad).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
    assert_eq!(t.asset_count(), 0);
    assert!(t.store().read(SLOT).unwrap().is_none());
}

#[test]
fn test_create_asset_from_text_input() {
    let mut t = tracker();
    let level = |p: &str, tp: &str| RawLevelInput {
        percentage: p.into(),
        target_price: tp.into(),
    };
    let input = RawAssetInput {
        symbol: "PEPE".into(),
        narrative: "Web3".into(),
        category: "HighRisk".into(),
        entry_price: "0.000001".into(),
        quantity: "1000000".into(),
        tp1: level("30", "0.000002"),
        tp2: level("25", "0.000004"),
        tp3: level("10", "0.00001"),
        tp4: level("5", "0.00002"),
        moonbag_percentage: "30".into(),
    };

    let id = t.create_asset_from_input(input).unwrap();
    let asset = t.get_asset(id).unwrap();
    assert_eq!(asset.category, AssetCategory::HighRisk);
    assert_close(asset.take_profit_levels.tp1.quantity, 300_000.0);
}

#[test]
fn test_create_asset_from_bad_text_input() {
    let mut t = tracker();
    let input = RawAssetInput {
        symbol: "PEPE".into(),
        narrative: "Web3".into(),
        category: "HighRisk".into(),
        entry_price: "cheap".into(),
        ..RawAssetInput::default()
    };
    assert!(t.create_asset_from_input(input).is_err());
    assert_eq!(t.asset_count(), 0);
}

#[test]
fn test_add_asset_duplicate_id() {
    let mut t = tracker();
    let asset = draft("ETH", Narrative::Layer1, 1.0, 1.0).build().unwrap();
    t.add_asset(asset.clone()).unwrap();
    assert!(matches!(t.add_asset(asset), Err(CoreError::DuplicateAsset(_))));
    assert_eq!(t.asset_count(), 1);
}

#[test]
fn test_insertion_order_preserved() {
    let mut t = tracker();
    for s in ["C", "A", "B"] {
        t.create_asset(&draft(s, Narrative::DeFi, 1.0, 1.0)).unwrap();
    }
    let symbols: Vec<&str> = t.assets().iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(symbols, ["C", "A", "B"]);
}

#[test]
fn test_remove_asset() {
    let mut t = tracker();
    let a = t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();
    let b = t.create_asset(&draft("B", Narrative::DeFi, 1.0, 1.0)).unwrap();

    assert!(t.remove_asset(a));
    assert_eq!(t.asset_count(), 1);
    assert!(t.get_asset(b).is_some());
    assert_eq!(persisted_len(&t), 1);
}

#[test]
fn test_remove_unknown_asset_is_noop() {
    let mut t = tracker();
    t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();
    let before = t.assets().to_vec();
    let blob_before = t.store().read(SLOT).unwrap();

    assert!(!t.remove_asset(Uuid::new_v4()));
    assert_eq!(t.assets(), before.as_slice());
    assert_eq!(t.store().read(SLOT).unwrap(), blob_before);
}

#[test]
fn test_remove_assets_counts_only_existing() {
    let mut t = tracker();
    let a = t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();
    let b = t.create_asset(&draft("B", Narrative::DeFi, 1.0, 1.0)).unwrap();
    t.create_asset(&draft("C", Narrative::DeFi, 1.0, 1.0)).unwrap();

    assert_eq!(t.remove_assets(&[a, Uuid::new_v4(), b]), 2);
    assert_eq!(t.asset_count(), 1);
    assert_eq!(t.assets()[0].symbol, "C");
}

#[test]
fn test_clear() {
    let mut t = tracker();
    t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();
    t.clear();
    assert_eq!(t.asset_count(), 0);
    assert_eq!(persisted_len(&t), 0);
}

#[test]
fn test_set_level_price_persists_and_updates_profit() {
    let mut t = tracker();
    let id = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();

    assert_eq!(t.profit_for_level(id, LevelName::Tp1).unwrap(), None);
    assert!(t.set_level_price(id, LevelName::Tp1, 15.0).unwrap());

    let profit = t.profit_for_level(id, LevelName::Tp1).unwrap().unwrap();
    assert_close(profit.net_profit, 87.5);

    let reloaded = TpTracker::with_defaults(t.into_store());
    assert_eq!(reloaded.get_asset(id).unwrap().take_profit_levels.tp1.price, Some(15.0));
}

#[test]
fn test_set_level_price_unknown_asset() {
    let mut t = tracker();
    assert!(!t.set_level_price(Uuid::new_v4(), LevelName::Tp1, 1.0).unwrap());
    assert!(t.store().read(SLOT).unwrap().is_none());
}

#[test]
fn test_set_level_price_negative_rejected() {
    let mut t = tracker();
    let id = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();
    assert!(t.set_level_price(id, LevelName::Tp1, -3.0).is_err());
    assert_eq!(t.get_asset(id).unwrap().take_profit_levels.tp1.price, None);
}

#[test]
fn test_clear_level_price() {
    let mut t = tracker();
    let id = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();
    t.set_level_price(id, LevelName::Tp2, 0.0).unwrap();
    assert!(t.profit_for_level(id, LevelName::Tp2).unwrap().is_some());

    assert!(t.clear_level_price(id, LevelName::Tp2));
    assert_eq!(t.profit_for_level(id, LevelName::Tp2).unwrap(), None);
}

#[test]
fn test_profit_for_level_unknown_asset() {
    let t = tracker();
    let err = t.profit_for_level(Uuid::new_v4(), LevelName::Tp1).unwrap_err();
    assert!(matches!(err, CoreError::AssetNotFound(_)));
}

#[test]
fn test_failed_write_keeps_mutation_and_flags_unsaved() {
    let mut t = TpTracker::with_defaults(ReadOnlyStore::default());
    let id = t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();

    assert!(t.get_asset(id).is_some());
    assert!(t.has_unsaved_changes());
    assert!(t.save().is_err());
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut t = TpTracker::with_defaults(FileStore::open(dir.path()).unwrap());
        let id = t.create_asset(&draft("SOL", Narrative::Layer1, 20.0, 10.0)).unwrap();
        t.set_level_price(id, LevelName::Tp3, 60.0).unwrap();
        id
    };

    let t = TpTracker::with_defaults(FileStore::open(dir.path()).unwrap());
    assert_eq!(t.asset_count(), 1);
    assert_eq!(t.get_asset(id).unwrap().take_profit_levels.tp3.price, Some(60.0));
}

// ═══════════════════════════════════════════════════════════════════
// Calculations through the facade
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_summary_end_to_end() {
    let mut t = tracker();
    let a = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();
    let b = t.create_asset(&draft("LOSS", Narrative::NFT, 10.0, 100.0)).unwrap();
    t.set_level_price(a, LevelName::Tp1, 15.0).unwrap();
    t.set_level_price(b, LevelName::Tp1, 5.0).unwrap();

    let summary = t.summary();
    assert_eq!(summary.asset_count, 2);
    assert_eq!(summary.total_investment, 2000.0);
    // +125 taxed at 30%, −125 untaxed, no netting
    assert_close(summary.capital_gains, 0.0);
    assert_close(summary.taxes, 37.5);
    assert_close(summary.net_profit, -37.5);
}

#[test]
fn test_zero_price_policy_through_facade() {
    let settings = Settings {
        zero_price: ZeroPricePolicy::NotSold,
        ..Settings::default()
    };
    let mut t = TpTracker::open(MemoryStore::new(), settings).unwrap();
    let id = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();
    t.set_level_price(id, LevelName::Tp1, 0.0).unwrap();

    assert_eq!(t.profit_for_level(id, LevelName::Tp1).unwrap(), None);
    assert_eq!(t.total_profits(), ProfitResult::ZERO);
}

#[test]
fn test_browser_blob_with_cleared_price() {
    let mut asset = draft("TKN", Narrative::DeFi, 10.0, 100.0).build().unwrap();
    asset.take_profit_levels.tp1.price = Some(0.0);
    let blob = serde_json::to_string(&vec![asset]).unwrap();

    let legacy = Settings {
        zero_price: ZeroPricePolicy::NotSold,
        ..Settings::default()
    };
    let t = TpTracker::open(MemoryStore::new().with_slot(SLOT, blob.clone()), legacy).unwrap();
    assert_eq!(t.total_profits(), ProfitResult::ZERO);

    let t = TpTracker::with_defaults(MemoryStore::new().with_slot(SLOT, blob));
    assert_close(t.total_profits().capital_gains, -250.0);
}

#[test]
fn test_asset_breakdowns_rows() {
    let mut t = tracker();
    let id = t.create_asset(&draft("TKN", Narrative::DeFi, 10.0, 100.0)).unwrap();
    t.set_level_price(id, LevelName::Tp4, 30.0).unwrap();

    let rows = t.asset_breakdowns();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].levels.len(), 4);
    assert!(rows[0].levels[3].profit.is_some());
    assert_close(rows[0].total.net_profit, 140.0);
}

#[test]
fn test_allocation_views() {
    let mut t = tracker();
    t.create_asset(&draft("UNI", Narrative::DeFi, 5.0, 20.0)).unwrap();
    t.create_asset(&draft("AAVE", Narrative::DeFi, 100.0, 1.0)).unwrap();
    t.create_asset(&draft("ARB", Narrative::Layer2, 1.0, 200.0)).unwrap();

    let by_asset = t.allocation(ChartView::Assets);
    assert_eq!(by_asset.len(), 3);
    assert_close(by_asset[2].share, 0.5);

    let by_narrative = t.allocation(ChartView::Narrative);
    assert_eq!(by_narrative.len(), 2);
    let defi = by_narrative.iter().find(|s| s.label == "DeFi").unwrap();
    assert_eq!(defi.value, 200.0);
    assert_close(defi.share, 0.5);
}

#[test]
fn test_allocation_empty_portfolio() {
    let t = tracker();
    assert!(t.allocation(ChartView::Assets).is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// Filtering & search
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_filters() {
    let mut t = tracker();
    t.create_asset(&draft("UNI", Narrative::DeFi, 1.0, 1.0)).unwrap();
    t.create_asset(
        &draft("BTC", Narrative::Layer1, 1.0, 1.0).with_category(AssetCategory::BlueChips),
    )
    .unwrap();
    t.create_asset(&draft("Sushi", Narrative::DeFi, 1.0, 1.0)).unwrap();

    assert_eq!(t.assets_by_narrative(Narrative::DeFi).len(), 2);
    assert_eq!(t.assets_by_narrative(Narrative::NFT).len(), 0);
    assert_eq!(t.assets_by_category(AssetCategory::BlueChips).len(), 1);
    assert_eq!(t.assets_by_category(AssetCategory::MidCap).len(), 2);

    let found = t.search_assets("su");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].symbol, "Sushi");
    assert_eq!(t.search_assets("").len(), 3);
}

// ═══════════════════════════════════════════════════════════════════
// Export / Import
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_json_export_import_round_trip() {
    let mut source = tracker();
    let id = source.create_asset(&draft("ETH", Narrative::Layer1, 2500.0, 2.0)).unwrap();
    source.set_level_price(id, LevelName::Tp1, 3000.0).unwrap();
    let json = source.export_assets_to_json().unwrap();

    let mut target = tracker();
    assert_eq!(target.import_assets_from_json(&json).unwrap(), 1);
    assert_eq!(target.assets(), source.assets());
    assert_eq!(persisted_len(&target), 1);
}

#[test]
fn test_import_is_all_or_nothing() {
    let mut t = tracker();
    let existing = draft("A", Narrative::DeFi, 1.0, 1.0).build().unwrap();
    t.add_asset(existing.clone()).unwrap();

    let fresh = draft("B", Narrative::DeFi, 1.0, 1.0).build().unwrap();
    let json = serde_json::to_string(&vec![fresh, existing]).unwrap();

    assert!(matches!(
        t.import_assets_from_json(&json),
        Err(CoreError::DuplicateAsset(_))
    ));
    assert_eq!(t.asset_count(), 1);
}

#[test]
fn test_import_rejects_assets_breaking_invariants() {
    let settings = Settings {
        cost_basis: CostBasisFormula::QuantityWeighted,
        ..Settings::default()
    };
    let mut t = TpTracker::open(MemoryStore::new(), settings).unwrap();
    t.create_asset(&draft("A", Narrative::DeFi, 1.0, 1.0)).unwrap();

    let good = draft("B", Narrative::DeFi, 1.0, 1.0).build().unwrap();
    let mut bad = draft("C", Narrative::DeFi, 1.0, 1.0).build().unwrap();
    bad.entry_price = -10.0;
    bad.quantity = 0.0;
    for name in LevelName::ALL {
        bad.take_profit_levels.get_mut(name).percentage = 90.0;
    }
    bad.take_profit_levels.tp1.price = Some(5.0);
    bad.moonbag_percentage = 90.0;
    let json = serde_json::to_string(&vec![good, bad]).unwrap();

    let err = t.import_assets_from_json(&json).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
    assert_eq!(t.asset_count(), 1);
    assert_eq!(persisted_len(&t), 1);
    assert!(!t.total_profits().net_profit.is_nan());
}

#[test]
fn test_import_rejects_percentages_not_summing_to_100() {
    let mut t = tracker();
    let mut asset = draft("B", Narrative::DeFi, 1.0, 1.0).build().unwrap();
    asset.moonbag_percentage = 0.0;
    let json = serde_json::to_string(&vec![asset]).unwrap();

    assert!(t.import_assets_from_json(&json).is_err());
    assert_eq!(t.asset_count(), 0);
}

#[test]
fn test_open_rejects_slot_unusable_by_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        storage_slot: "my slot".into(),
        ..Settings::default()
    };
    let err = TpTracker::open(FileStore::open(dir.path()).unwrap(), settings).unwrap_err();
    assert!(matches!(err, CoreError::InvalidSettings(_)));
}

#[test]
fn test_import_malformed_json() {
    let mut t = tracker();
    assert!(t.import_assets_from_json("[{]").is_err());
    assert_eq!(t.asset_count(), 0);
}

#[test]
fn test_csv_export() {
    let mut t = tracker();
    let id = t
        .create_asset(&draft("ETH, wrapped", Narrative::Layer1, 2500.0, 2.0))
        .unwrap();
    t.set_level_price(id, LevelName::Tp1, 3000.0).unwrap();

    let csv = t.export_assets_to_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,symbol,category,narrative,entry_price,quantity,tp1_percentage"));
    assert!(lines[0].ends_with("tp4_price,moonbag_percentage"));
    assert!(lines[1].contains("\"ETH, wrapped\""));
    assert!(lines[1].contains(",MidCap,Layer1,2500,2,25,0,3000,20,0,,"));
    assert!(lines[1].ends_with(",30"));
}
