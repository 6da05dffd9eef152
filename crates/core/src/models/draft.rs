use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

use super::asset::{
    check_percentage, check_percentage_total, check_position, check_rung, check_symbol,
    AssetCategory, DigitalAsset, LevelName, Narrative, TakeProfitLevel, TakeProfitLevels,
};
use super::ladder::LadderTemplate;

/// Percentage and planned exit price of one rung, before the asset exists.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDraft {
    pub percentage: f64,
    pub target_price: f64,
}

/// Everything needed to create a [`DigitalAsset`].
///
/// The ladder percentages start from the category's [`LadderTemplate`] and can
/// be overridden per rung. [`AssetDraft::build`] is the only place the
/// percentage-sum invariant is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub symbol: String,
    pub narrative: Narrative,
    pub category: AssetCategory,
    pub entry_price: f64,
    pub quantity: f64,
    pub tp1: LevelDraft,
    pub tp2: LevelDraft,
    pub tp3: LevelDraft,
    pub tp4: LevelDraft,
    pub moonbag_percentage: f64,
}

impl Default for AssetDraft {
    fn default() -> Self {
        Self::new("", Narrative::DeFi, AssetCategory::MidCap, 0.0, 0.0)
    }
}

impl AssetDraft {
    /// Start a draft with the default ladder of `category`. Target prices are 0.
    pub fn new(
        symbol: impl Into<String>,
        narrative: Narrative,
        category: AssetCategory,
        entry_price: f64,
        quantity: f64,
    ) -> Self {
        let mut draft = Self {
            symbol: symbol.into(),
            narrative,
            category,
            entry_price,
            quantity,
            tp1: LevelDraft::default(),
            tp2: LevelDraft::default(),
            tp3: LevelDraft::default(),
            tp4: LevelDraft::default(),
            moonbag_percentage: 0.0,
        };
        draft.apply_ladder(LadderTemplate::for_category(category));
        draft
    }

    /// Switch category and reset the four percentages and the moonbag
    /// to the new category's ladder. Target prices are kept.
    #[must_use]
    pub fn with_category(mut self, category: AssetCategory) -> Self {
        self.category = category;
        self.apply_ladder(LadderTemplate::for_category(category));
        self
    }

    #[must_use]
    pub fn with_level(mut self, name: LevelName, percentage: f64, target_price: f64) -> Self {
        *self.level_mut(name) = LevelDraft { percentage, target_price };
        self
    }

    #[must_use]
    pub fn with_target_price(mut self, name: LevelName, target_price: f64) -> Self {
        self.level_mut(name).target_price = target_price;
        self
    }

    #[must_use]
    pub fn with_moonbag(mut self, percentage: f64) -> Self {
        self.moonbag_percentage = percentage;
        self
    }

    pub fn level(&self, name: LevelName) -> &LevelDraft {
        match name {
            LevelName::Tp1 => &self.tp1,
            LevelName::Tp2 => &self.tp2,
            LevelName::Tp3 => &self.tp3,
            LevelName::Tp4 => &self.tp4,
        }
    }

    fn level_mut(&mut self, name: LevelName) -> &mut LevelDraft {
        match name {
            LevelName::Tp1 => &mut self.tp1,
            LevelName::Tp2 => &mut self.tp2,
            LevelName::Tp3 => &mut self.tp3,
            LevelName::Tp4 => &mut self.tp4,
        }
    }

    fn apply_ladder(&mut self, ladder: LadderTemplate) {
        self.tp1.percentage = ladder.tp1;
        self.tp2.percentage = ladder.tp2;
        self.tp3.percentage = ladder.tp3;
        self.tp4.percentage = ladder.tp4;
        self.moonbag_percentage = ladder.moonbag;
    }

    /// Four rungs plus moonbag.
    #[must_use]
    pub fn percentage_total(&self) -> f64 {
        LevelName::ALL
            .into_iter()
            .map(|name| self.level(name).percentage)
            .sum::<f64>()
            + self.moonbag_percentage
    }

    /// Check the draft before anything is created.
    ///
    /// Rules:
    /// - Symbol must not be blank
    /// - Entry price and quantity must be positive
    /// - Percentages within 0..=100, target prices non-negative
    /// - The four rungs and the moonbag must add up to 100
    pub fn validate(&self) -> Result<(), CoreError> {
        check_symbol(&self.symbol)?;
        check_position(self.entry_price, self.quantity)?;

        for name in LevelName::ALL {
            let level = self.level(name);
            check_rung(name, level.percentage, level.target_price)?;
        }
        check_percentage("moonbag", self.moonbag_percentage)?;

        check_percentage_total(self.percentage_total())
    }

    /// Validate and create the asset with a fresh random id.
    pub fn build(&self) -> Result<DigitalAsset, CoreError> {
        self.build_with_id(Uuid::new_v4())
    }

    /// Validate and create the asset with a caller-supplied id.
    /// Each rung's quantity is fixed here as `quantity × percentage / 100`.
    pub fn build_with_id(&self, id: Uuid) -> Result<DigitalAsset, CoreError> {
        self.validate()?;

        let rung = |name: LevelName| {
            let level = self.level(name);
            TakeProfitLevel::planned(self.quantity, level.percentage, level.target_price)
        };

        Ok(DigitalAsset {
            id,
            symbol: self.symbol.trim().to_string(),
            narrative: self.narrative,
            category: self.category,
            entry_price: self.entry_price,
            quantity: self.quantity,
            take_profit_levels: TakeProfitLevels {
                tp1: rung(LevelName::Tp1),
                tp2: rung(LevelName::Tp2),
                tp3: rung(LevelName::Tp3),
                tp4: rung(LevelName::Tp4),
            },
            moonbag_percentage: self.moonbag_percentage,
        })
    }
}

/// Raw text of one rung as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLevelInput {
    pub percentage: String,
    #[serde(default)]
    pub target_price: String,
}

/// Raw form input: numbers as decimal text, enums by name.
///
/// Converted with `AssetDraft::try_from`; anything that does not parse is a
/// validation failure naming the offending field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssetInput {
    pub symbol: String,
    pub narrative: String,
    pub category: String,
    pub entry_price: String,
    pub quantity: String,
    pub tp1: RawLevelInput,
    pub tp2: RawLevelInput,
    pub tp3: RawLevelInput,
    pub tp4: RawLevelInput,
    pub moonbag_percentage: String,
}

impl TryFrom<RawAssetInput> for AssetDraft {
    type Error = CoreError;

    fn try_from(raw: RawAssetInput) -> Result<Self, Self::Error> {
        let level = |name: &str, input: &RawLevelInput| -> Result<LevelDraft, CoreError> {
            let target_price = if input.target_price.trim().is_empty() {
                0.0
            } else {
                parse_decimal(&format!("{name} target price"), &input.target_price)?
            };
            Ok(LevelDraft {
                percentage: parse_decimal(&format!("{name} percentage"), &input.percentage)?,
                target_price,
            })
        };

        Ok(Self {
            symbol: raw.symbol,
            narrative: raw.narrative.parse()?,
            category: raw.category.parse()?,
            entry_price: parse_decimal("entry price", &raw.entry_price)?,
            quantity: parse_decimal("quantity", &raw.quantity)?,
            tp1: level("tp1", &raw.tp1)?,
            tp2: level("tp2", &raw.tp2)?,
            tp3: level("tp3", &raw.tp3)?,
            tp4: level("tp4", &raw.tp4)?,
            moonbag_percentage: parse_decimal("moonbag percentage", &raw.moonbag_percentage)?,
        })
    }
}

/// Parse a decimal number typed by the user. Surrounding whitespace is ignored;
/// empty, non-numeric, NaN and infinite input are rejected.
pub fn parse_decimal(field: &str, text: &str) -> Result<f64, CoreError> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        CoreError::ValidationError(format!("{field} must be a number, got '{text}'"))
    })?;
    if !value.is_finite() {
        return Err(CoreError::ValidationError(format!(
            "{field} must be a finite number, got '{text}'"
        )));
    }
    Ok(value)
}
