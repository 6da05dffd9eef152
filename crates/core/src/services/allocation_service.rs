use crate::models::analytics::{AllocationSlice, ChartView};
use crate::models::asset::DigitalAsset;

/// Builds allocation chart data: invested capital grouped by symbol or
/// by narrative.
pub struct AllocationService;

impl AllocationService {
    pub fn new() -> Self {
        Self
    }

    /// Group `entry_price × quantity` by the label of `view`.
    ///
    /// Slices come out in first-seen order. Each share is the slice value over
    /// total investment, or 0 for every slice when nothing is invested.
    #[must_use]
    pub fn allocation(&self, assets: &[DigitalAsset], view: ChartView) -> Vec<AllocationSlice> {
        let mut slices: Vec<AllocationSlice> = Vec::new();

        for asset in assets {
            let label = match view {
                ChartView::Assets => asset.symbol.as_str(),
                ChartView::Narrative => asset.narrative.as_str(),
            };
            let value = asset.position_cost();
            match slices.iter_mut().find(|s| s.label == label) {
                Some(slice) => slice.value += value,
                None => slices.push(AllocationSlice {
                    label: label.to_string(),
                    value,
                    share: 0.0,
                }),
            }
        }

        let total: f64 = slices.iter().map(|s| s.value).sum();
        if total > 0.0 {
            for slice in &mut slices {
                slice.share = slice.value / total;
            }
        }

        slices
    }
}

impl Default for AllocationService {
    fn default() -> Self {
        Self::new()
    }
}
