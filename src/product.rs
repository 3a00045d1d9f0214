//! The canonical food entity produced by both upstream parsers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream family a product was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    /// Unbranded foods keyed by numeric nutrient IDs (USDA FoodData Central)
    GenericFoods,
    /// Packaged goods with per-100g / per-serving fields (Open Food Facts)
    BrandedGoods,
}

impl fmt::Display for ProductSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductSource::GenericFoods => f.write_str("generic-foods"),
            ProductSource::BrandedGoods => f.write_str("branded-goods"),
        }
    }
}

/// Normalized nutrition information for one food.
///
/// Macro and calorie values are for one stated serving, not per 100 g.
/// Products are built once by a parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Upstream barcode, or a synthesized `fdc:<id>` for generic foods
    pub barcode: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    /// Free-text serving description as provided upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size_description: Option<String>,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    /// Milligrams per serving
    #[serde(default)]
    pub sodium: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Package-level quantity, e.g. "500 g" (branded goods only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub source: ProductSource,
}

impl Product {
    /// Key used when merging search results from different providers.
    ///
    /// The two upstream families rarely share barcodes for the same food,
    /// so search deduplication compares lowercased names instead.
    pub fn dedup_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Clamp a nutrient amount to a finite, non-negative value
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Round an energy amount to whole kilocalories
pub(crate) fn whole_calories(kcal: f64) -> u32 {
    non_negative(kcal).round() as u32
}
