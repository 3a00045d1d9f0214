//! Branded-goods provider (Open Food Facts style).
//!
//! Products carry nested `nutriments` with `<nutrient>_100g` and, when the
//! label states one, `<nutrient>_serving` fields. Per-serving values win;
//! otherwise the per-100g value is scaled by `serving_size / 100`.

use crate::error::{FoodError, Result};
use crate::product::{Product, ProductSource, non_negative, whole_calories};
use crate::serving::{parse_quantity, parse_serving_size};
use serde::{Deserialize, Deserializer};

/// Kilojoules per kilocalorie
pub const KJ_PER_KCAL: f64 = 4.184;

/// Name used when a scanned product has no name upstream
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Upstream status value meaning "product found"
const STATUS_FOUND: i64 = 1;

/// `GET /product/{barcode}` response body
#[derive(Debug, Clone, Deserialize)]
pub struct BarcodeResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub product: Option<BrandedProduct>,
}

/// `GET /search` response body
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<BrandedProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandedProduct {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_front_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serving_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
    #[serde(default)]
    pub nutrition_grades: Option<String>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub nutriments: Option<Nutriments>,
}

/// Nutrient fields; upstream sends numbers or numeric strings interchangeably
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Nutriments {
    #[serde(default, rename = "energy-kcal_serving", deserialize_with = "lenient_number")]
    pub energy_kcal_serving: Option<f64>,
    #[serde(default, rename = "energy-kcal_100g", deserialize_with = "lenient_number")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default, rename = "energy-kj_100g", deserialize_with = "lenient_number")]
    pub energy_kj_100g: Option<f64>,
    /// Unsuffixed energy is reported in kJ
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrates_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fiber_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fiber_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sugars_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sugars_100g: Option<f64>,
    /// Grams
    #[serde(default, deserialize_with = "lenient_number")]
    pub sodium_serving: Option<f64>,
    /// Grams
    #[serde(default, deserialize_with = "lenient_number")]
    pub sodium_100g: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_quantity(s.trim()),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse a barcode lookup body.
///
/// Any status other than "found", or a missing product record, is
/// [`FoodError::ProductNotFound`] rather than an empty product.
pub fn parse_barcode_response(barcode: &str, body: &[u8]) -> Result<Product> {
    let response: BarcodeResponse = serde_json::from_slice(body)?;

    match response.product {
        Some(product) if response.status == STATUS_FOUND => {
            let name = product_name(&product).unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string());
            Ok(normalize(&product, barcode.to_string(), name))
        }
        _ => Err(FoodError::ProductNotFound(barcode.to_string())),
    }
}

/// Parse a search body. Entries without a code or a name are dropped.
pub fn parse_search_response(body: &[u8]) -> Result<Vec<Product>> {
    let response: SearchResponse = serde_json::from_slice(body)?;

    Ok(response
        .products
        .iter()
        .filter_map(|product| {
            let code = non_blank(product.code.as_deref())?;
            let name = product_name(product)?;
            Some(normalize(product, code, name))
        })
        .collect())
}

fn normalize(product: &BrandedProduct, barcode: String, name: String) -> Product {
    let serving = parse_serving_size(product.serving_size.as_deref());
    let scale = serving.scale();
    let missing = Nutriments::default();
    let n = product.nutriments.as_ref().unwrap_or(&missing);

    let kcal = n
        .energy_kcal_serving
        .or_else(|| n.energy_kcal_100g.map(|kcal| kcal * scale))
        .or_else(|| {
            n.energy_kj_100g
                .or(n.energy_100g)
                .map(|kj| kj / KJ_PER_KCAL * scale)
        })
        .unwrap_or(0.0);

    Product {
        barcode,
        name,
        brand: product
            .brands
            .as_deref()
            .and_then(|brands| non_blank(brands.split(',').next())),
        image_url: non_blank(product.image_url.as_deref())
            .or_else(|| non_blank(product.image_front_url.as_deref())),
        serving_size: serving.size,
        serving_unit: serving.unit,
        serving_size_description: non_blank(product.serving_size.as_deref()),
        calories: whole_calories(kcal),
        protein: per_serving(n.proteins_serving, n.proteins_100g, scale),
        carbs: per_serving(n.carbohydrates_serving, n.carbohydrates_100g, scale),
        fat: per_serving(n.fat_serving, n.fat_100g, scale),
        fiber: per_serving(n.fiber_serving, n.fiber_100g, scale),
        sugar: per_serving(n.sugars_serving, n.sugars_100g, scale),
        sodium: per_serving(n.sodium_serving, n.sodium_100g, scale) * 1000.0,
        nutrition_grade: non_blank(product.nutrition_grades.as_deref())
            .or_else(|| non_blank(product.nutriscore_grade.as_deref()))
            .filter(|grade| !matches!(grade.as_str(), "unknown" | "not-applicable")),
        // Categories run from broad to specific; keep the most specific one
        category: product
            .categories
            .as_deref()
            .and_then(|categories| non_blank(categories.rsplit(',').next())),
        quantity: non_blank(product.quantity.as_deref()),
        source: ProductSource::BrandedGoods,
    }
}

fn per_serving(serving: Option<f64>, per_100g: Option<f64>, scale: f64) -> f64 {
    serving
        .or_else(|| per_100g.map(|value| value * scale))
        .map(non_negative)
        .unwrap_or(0.0)
}

fn product_name(product: &BrandedProduct) -> Option<String> {
    non_blank(product.product_name.as_deref())
        .or_else(|| non_blank(product.generic_name.as_deref()))
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
