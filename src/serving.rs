//! Serving-size extraction from free-text descriptions.
//!
//! Grammar: `<number> [unit]`, where unit is one of `g`, `ml`, `oz`, `cup`,
//! `piece`, `slice`, `serving` (an optional plural `s` is accepted). Only the
//! first quantity in the text is honored, so `"1 cup (240ml)"` yields one cup
//! and the metric equivalent in parentheses is ignored.
//!
//! A comma followed only by three-digit groups is digit grouping (`"1,000 ml"`);
//! any other single comma is a decimal separator (`"12,5 g"`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_SERVING_SIZE: f64 = 100.0;
pub const DEFAULT_SERVING_UNIT: &str = "g";

static SERVING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:(g|ml|oz|cup|piece|slice|serving)s?\b)?")
        .expect("serving size pattern is valid")
});

/// A numeric quantity and its unit token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSize {
    pub size: f64,
    pub unit: String,
}

impl ServingSize {
    pub fn new(size: f64, unit: impl Into<String>) -> Self {
        Self {
            size,
            unit: unit.into(),
        }
    }

    /// Multiplier that converts a per-100 amount into a per-serving amount
    pub fn scale(&self) -> f64 {
        self.size / 100.0
    }
}

impl Default for ServingSize {
    fn default() -> Self {
        Self::new(DEFAULT_SERVING_SIZE, DEFAULT_SERVING_UNIT)
    }
}

/// Parse a serving description such as `"30g"` or `"1 cup (240ml)"`.
///
/// Absent input, text without a number, and non-positive quantities all
/// fall back to `100 g`. A number with no recognized unit is taken as grams.
pub fn parse_serving_size(description: Option<&str>) -> ServingSize {
    let Some(text) = description else {
        return ServingSize::default();
    };

    let Some(caps) = SERVING_PATTERN.captures(text) else {
        return ServingSize::default();
    };

    let size = caps
        .get(1)
        .and_then(|m| parse_quantity(m.as_str()))
        .filter(|size| size.is_finite() && *size > 0.0);

    match size {
        Some(size) => {
            let unit = caps
                .get(2)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_else(|| DEFAULT_SERVING_UNIT.to_string());
            ServingSize::new(size, unit)
        }
        None => ServingSize::default(),
    }
}

/// Read a numeric token that may use `,` for grouping or as the decimal mark
pub(crate) fn parse_quantity(raw: &str) -> Option<f64> {
    let normalized = match raw.split_once(',') {
        None => raw.to_string(),
        Some(_) if is_digit_grouped(raw) => raw.replace(',', ""),
        Some((whole, fraction)) if !fraction.contains([',', '.']) => {
            format!("{whole}.{fraction}")
        }
        Some(_) => return None,
    };
    normalized.parse().ok()
}

/// `1,000` or `12,345,678.5`: a short lead group, then three-digit groups
fn is_digit_grouped(raw: &str) -> bool {
    let integer = raw.split('.').next().unwrap_or(raw);
    let mut groups = integer.split(',');
    integer.contains(',')
        && groups
            .next()
            .is_some_and(|lead| (1..=3).contains(&lead.len()))
        && groups.all(|group| group.len() == 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_without_space() {
        assert_eq!(parse_serving_size(Some("30g")), ServingSize::new(30.0, "g"));
    }

    #[test]
    fn test_first_match_only() {
        assert_eq!(
            parse_serving_size(Some("1 cup (240ml)")),
            ServingSize::new(1.0, "cup")
        );
    }

    #[test]
    fn test_absent_defaults() {
        assert_eq!(parse_serving_size(None), ServingSize::new(100.0, "g"));
    }

    #[test]
    fn test_no_number_defaults() {
        assert_eq!(parse_serving_size(Some("one bar")), ServingSize::default());
        assert_eq!(parse_serving_size(Some("")), ServingSize::default());
    }

    #[test]
    fn test_number_without_unit_is_grams() {
        assert_eq!(parse_serving_size(Some("45")), ServingSize::new(45.0, "g"));
        assert_eq!(
            parse_serving_size(Some("2 tbsp")),
            ServingSize::new(2.0, "g")
        );
    }

    #[test]
    fn test_units_case_insensitive_and_plural() {
        assert_eq!(
            parse_serving_size(Some("2 Slices")),
            ServingSize::new(2.0, "slice")
        );
        assert_eq!(
            parse_serving_size(Some("250 ML")),
            ServingSize::new(250.0, "ml")
        );
        assert_eq!(
            parse_serving_size(Some("1 serving")),
            ServingSize::new(1.0, "serving")
        );
    }

    #[test]
    fn test_decimal_separators() {
        assert_eq!(
            parse_serving_size(Some("1.5 oz")),
            ServingSize::new(1.5, "oz")
        );
        assert_eq!(
            parse_serving_size(Some("12,5 g")),
            ServingSize::new(12.5, "g")
        );
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(
            parse_serving_size(Some("1,000 ml")),
            ServingSize::new(1000.0, "ml")
        );
        assert_eq!(
            parse_serving_size(Some("2,500.5 g")),
            ServingSize::new(2500.5, "g")
        );
        assert_eq!(ServingSize::new(1000.0, "ml").scale(), 10.0);
        // Not three digits after the comma, so still a decimal mark
        assert_eq!(
            parse_serving_size(Some("1,50 g")),
            ServingSize::new(1.5, "g")
        );
        assert_eq!(parse_serving_size(Some("1.000,5 g")), ServingSize::default());
    }

    #[test]
    fn test_unit_needs_word_boundary() {
        assert_eq!(
            parse_serving_size(Some("1 cupcake")),
            ServingSize::new(1.0, "g")
        );
        assert_eq!(
            parse_serving_size(Some("3 pieces")),
            ServingSize::new(3.0, "piece")
        );
    }

    #[test]
    fn test_zero_defaults() {
        assert_eq!(parse_serving_size(Some("0 g")), ServingSize::default());
    }

    #[test]
    fn test_scale() {
        assert_eq!(ServingSize::new(200.0, "g").scale(), 2.0);
        assert_eq!(ServingSize::default().scale(), 1.0);
    }
}
