//! Generic-foods provider (USDA FoodData Central style).
//!
//! Records carry a flat list of nutrients keyed by numeric nutrient IDs.
//! Amounts are per 100 g; they are scaled to the record's stated serving
//! when that serving is expressed in grams or millilitres.

use crate::error::Result;
use crate::product::{Product, ProductSource, non_negative, whole_calories};
use crate::serving::{DEFAULT_SERVING_SIZE, DEFAULT_SERVING_UNIT, ServingSize};
use serde::Deserialize;

/// Prefix for synthesized barcodes; generic foods have no physical barcode
pub const BARCODE_PREFIX: &str = "fdc:";

/// Trailing qualifiers stripped from descriptions before display
const NAME_SUFFIXES: &[&str] = &[", raw", ", nfs", ", ns as to form", ", not further specified"];

/// Semantic nutrient a numeric ID maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientField {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Sodium,
}

/// Every nutrient ID the parser recognizes. Anything else is ignored.
pub const NUTRIENT_TABLE: &[(u32, NutrientField)] = &[
    (1008, NutrientField::Calories), // Energy (kcal)
    (2047, NutrientField::Calories), // Energy (Atwater General Factors)
    (2048, NutrientField::Calories), // Energy (Atwater Specific Factors)
    (1003, NutrientField::Protein),
    (1005, NutrientField::Carbs), // Carbohydrate, by difference
    (1004, NutrientField::Fat),   // Total lipid (fat)
    (1079, NutrientField::Fiber), // Fiber, total dietary
    (2000, NutrientField::Sugar), // Sugars, total including NLEA
    (1093, NutrientField::Sodium), // Sodium, Na (mg)
];

/// Look up the semantic field for a nutrient ID
pub fn nutrient_field(id: u32) -> Option<NutrientField> {
    NUTRIENT_TABLE
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, field)| *field)
}

/// `GET /foods/search` response body
#[derive(Debug, Clone, Deserialize)]
pub struct FoodSearchResponse {
    #[serde(default)]
    pub foods: Vec<FoodRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    #[serde(default)]
    pub fdc_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub food_category: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
    #[serde(default)]
    pub serving_size: Option<f64>,
    #[serde(default)]
    pub serving_size_unit: Option<String>,
    #[serde(default)]
    pub household_serving_full_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    #[serde(default)]
    pub nutrient_id: Option<u32>,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Default)]
struct Nutrients {
    calories: Option<f64>,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    sugar: f64,
    sodium: f64,
}

impl Nutrients {
    fn collect(nutrients: &[FoodNutrient]) -> Self {
        let mut out = Self::default();
        for nutrient in nutrients {
            let (Some(field), Some(value)) =
                (nutrient.nutrient_id.and_then(nutrient_field), nutrient.value)
            else {
                continue;
            };
            match field {
                // First energy entry in the record wins
                NutrientField::Calories => {
                    out.calories.get_or_insert(value);
                }
                NutrientField::Protein => out.protein = value,
                NutrientField::Carbs => out.carbs = value,
                NutrientField::Fat => out.fat = value,
                NutrientField::Fiber => out.fiber = value,
                NutrientField::Sugar => out.sugar = value,
                NutrientField::Sodium => out.sodium = value,
            }
        }
        out
    }
}

/// Parse a search response body into normalized products.
///
/// Records without an ID or with an empty description are skipped.
pub fn parse_search_response(body: &[u8]) -> Result<Vec<Product>> {
    let response: FoodSearchResponse = serde_json::from_slice(body)?;
    Ok(response.foods.iter().filter_map(parse_record).collect())
}

/// Normalize one food record, or `None` if it has no ID or usable name
pub fn parse_record(record: &FoodRecord) -> Option<Product> {
    let fdc_id = record.fdc_id?;
    let name = clean_name(&record.description);
    if name.is_empty() {
        return None;
    }

    let serving = record_serving(record);
    // Amounts are per 100 g/ml; other units cannot be scaled meaningfully
    let scale = if serving.unit == "g" || serving.unit == "ml" {
        serving.scale()
    } else {
        1.0
    };

    let nutrients = Nutrients::collect(&record.food_nutrients);
    let brand = record
        .brand_name
        .as_deref()
        .or(record.brand_owner.as_deref())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string);

    Some(Product {
        barcode: format!("{BARCODE_PREFIX}{fdc_id}"),
        name,
        brand,
        image_url: None,
        serving_size: serving.size,
        serving_unit: serving.unit,
        serving_size_description: record
            .household_serving_full_text
            .clone()
            .filter(|text| !text.trim().is_empty()),
        calories: whole_calories(nutrients.calories.unwrap_or(0.0) * scale),
        protein: non_negative(nutrients.protein * scale),
        carbs: non_negative(nutrients.carbs * scale),
        fat: non_negative(nutrients.fat * scale),
        fiber: non_negative(nutrients.fiber * scale),
        sugar: non_negative(nutrients.sugar * scale),
        sodium: non_negative(nutrients.sodium * scale),
        nutrition_grade: None,
        category: record.food_category.clone(),
        quantity: None,
        source: ProductSource::GenericFoods,
    })
}

/// The record's own serving, or `100 g` when missing or non-positive
fn record_serving(record: &FoodRecord) -> ServingSize {
    match record.serving_size {
        Some(size) if size.is_finite() && size > 0.0 => {
            let unit = record
                .serving_size_unit
                .as_deref()
                .map(normalize_unit)
                .unwrap_or_else(|| DEFAULT_SERVING_UNIT.to_string());
            ServingSize::new(size, unit)
        }
        _ => ServingSize::new(DEFAULT_SERVING_SIZE, DEFAULT_SERVING_UNIT),
    }
}

/// Map upstream unit codes (`GRM`, `MLT`) to the short units used elsewhere
fn normalize_unit(unit: &str) -> String {
    match unit.trim().to_lowercase().as_str() {
        "grm" | "g" | "gram" | "grams" => "g".to_string(),
        "mlt" | "ml" | "milliliter" | "millilitre" => "ml".to_string(),
        "" => DEFAULT_SERVING_UNIT.to_string(),
        other => other.to_string(),
    }
}

/// Strip trailing qualifiers such as ", raw" and title-case the rest
pub fn clean_name(description: &str) -> String {
    let mut name = description.trim();
    while let Some(suffix) = NAME_SUFFIXES
        .iter()
        .find(|suffix| ends_with_ignore_case(name, suffix))
    {
        name = name[..name.len() - suffix.len()].trim_end();
    }
    title_case(name)
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    let Some(start) = text.len().checked_sub(suffix.len()) else {
        return false;
    };
    text.is_char_boundary(start) && text[start..].eq_ignore_ascii_case(suffix)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_table_enumerated() {
        let expected = [
            (1008, NutrientField::Calories),
            (2047, NutrientField::Calories),
            (2048, NutrientField::Calories),
            (1003, NutrientField::Protein),
            (1005, NutrientField::Carbs),
            (1004, NutrientField::Fat),
            (1079, NutrientField::Fiber),
            (2000, NutrientField::Sugar),
            (1093, NutrientField::Sodium),
        ];
        assert_eq!(NUTRIENT_TABLE.len(), expected.len());
        for (id, field) in expected {
            assert_eq!(nutrient_field(id), Some(field), "nutrient id {id}");
        }
        // Vitamin C, cholesterol: present upstream, deliberately unmapped
        assert_eq!(nutrient_field(1162), None);
        assert_eq!(nutrient_field(1253), None);
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("APPLES, RAW"), "Apples");
        assert_eq!(clean_name("Bananas, raw"), "Bananas");
        assert_eq!(clean_name("Rice, white, cooked, NFS"), "Rice, White, Cooked");
        assert_eq!(clean_name("Apples, raw, with skin"), "Apples, Raw, With Skin");
        assert_eq!(clean_name("  chicken breast  "), "Chicken Breast");
        assert_eq!(clean_name(", raw"), "");
    }

    #[test]
    fn test_parse_search_response() {
        let body = br#"{
            "totalHits": 2,
            "foods": [
                {
                    "fdcId": 171688,
                    "description": "Apples, raw",
                    "foodCategory": "Fruits and Fruit Juices",
                    "foodNutrients": [
                        {"nutrientId": 1008, "value": 52.0},
                        {"nutrientId": 1003, "value": 0.26},
                        {"nutrientId": 1004, "value": 0.17},
                        {"nutrientId": 1005, "value": 13.81},
                        {"nutrientId": 1079, "value": 2.4},
                        {"nutrientId": 2000, "value": 10.39},
                        {"nutrientId": 1093, "value": 1.0},
                        {"nutrientId": 1162, "value": 4.6}
                    ]
                },
                {
                    "fdcId": 1,
                    "description": "   ",
                    "foodNutrients": []
                }
            ]
        }"#;

        let products = parse_search_response(body).unwrap();
        assert_eq!(products.len(), 1);

        let apple = &products[0];
        assert_eq!(apple.barcode, "fdc:171688");
        assert_eq!(apple.name, "Apples");
        assert_eq!(apple.brand, None);
        assert_eq!(apple.serving_size, 100.0);
        assert_eq!(apple.serving_unit, "g");
        assert_eq!(apple.calories, 52);
        assert_eq!(apple.protein, 0.26);
        assert_eq!(apple.carbs, 13.81);
        assert_eq!(apple.fiber, 2.4);
        assert_eq!(apple.sodium, 1.0);
        assert_eq!(apple.category.as_deref(), Some("Fruits and Fruit Juices"));
        assert_eq!(apple.source, ProductSource::GenericFoods);
    }

    #[test]
    fn test_scales_to_gram_serving() {
        let body = br#"{"foods": [{
            "fdcId": 2001,
            "description": "GREEK YOGURT",
            "brandName": "Acme Dairy",
            "servingSize": 150.0,
            "servingSizeUnit": "GRM",
            "householdServingFullText": "1 container",
            "foodNutrients": [
                {"nutrientId": 1008, "value": 60.0},
                {"nutrientId": 1003, "value": 10.0}
            ]
        }]}"#;

        let products = parse_search_response(body).unwrap();
        let yogurt = &products[0];
        assert_eq!(yogurt.serving_unit, "g");
        assert_eq!(yogurt.serving_size, 150.0);
        assert_eq!(yogurt.calories, 90);
        assert_eq!(yogurt.protein, 15.0);
        assert_eq!(yogurt.brand.as_deref(), Some("Acme Dairy"));
        assert_eq!(
            yogurt.serving_size_description.as_deref(),
            Some("1 container")
        );
    }

    #[test]
    fn test_non_metric_serving_not_scaled() {
        let body = br#"{"foods": [{
            "fdcId": 7,
            "description": "Crackers",
            "servingSize": 5,
            "servingSizeUnit": "piece",
            "foodNutrients": [{"nutrientId": 1008, "value": 480.0}]
        }]}"#;

        let products = parse_search_response(body).unwrap();
        assert_eq!(products[0].serving_size, 5.0);
        assert_eq!(products[0].serving_unit, "piece");
        assert_eq!(products[0].calories, 480);
    }

    #[test]
    fn test_first_energy_entry_wins() {
        let body = br#"{"foods": [{
            "fdcId": 9,
            "description": "Oats",
            "foodNutrients": [
                {"nutrientId": 2047, "value": 379.0},
                {"nutrientId": 1008, "value": 389.0}
            ]
        }]}"#;

        let products = parse_search_response(body).unwrap();
        assert_eq!(products[0].calories, 379);
    }

    #[test]
    fn test_missing_nutrient_values_default_to_zero() {
        let body = br#"{"foods": [{
            "fdcId": 10,
            "description": "Water",
            "foodNutrients": [{"nutrientId": 1003}]
        }]}"#;

        let products = parse_search_response(body).unwrap();
        assert_eq!(products[0].calories, 0);
        assert_eq!(products[0].protein, 0.0);
        assert_eq!(products[0].sugar, 0.0);
    }

    #[test]
    fn test_record_without_id_is_skipped() {
        let body = br#"{"foods": [
            {
                "fdcId": 11,
                "description": "Lentils, raw",
                "foodNutrients": [{"value": 5.0}, {"nutrientId": 1003, "value": 24.6}]
            },
            {"description": "Orphan record", "foodNutrients": []}
        ]}"#;

        let products = parse_search_response(body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].barcode, "fdc:11");
        assert_eq!(products[0].protein, 24.6);
    }

    #[test]
    fn test_malformed_body_is_decoding_error() {
        let err = parse_search_response(b"<html>").unwrap_err();
        assert!(matches!(err, crate::error::FoodError::DecodingError(_)));
    }
}
