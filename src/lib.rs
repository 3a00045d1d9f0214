//! Library interface for forage, a food-data resolver.
//!
//! Resolves nutrition facts by barcode or free-text search across a
//! generic-foods database and a branded-goods database, normalizing both
//! into one [`Product`] shape.

pub mod api;
pub mod branded;
pub mod cache;
pub mod config;
pub mod error;
pub mod generic;
pub mod product;
pub mod rank;
pub mod serving;

// Re-export commonly used types
pub use api::FoodApi;
pub use cache::ProductCache;
pub use config::Config;
pub use error::{FoodError, Result};
pub use product::{Product, ProductSource};
pub use rank::{dedup_by_name, normalize_query, rank};
pub use serving::{ServingSize, parse_serving_size};
