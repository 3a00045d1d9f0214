//! In-memory barcode cache with an enforced expiration window.
//!
//! Entries expire `ttl` after insertion; an expired entry is never returned
//! from [`ProductCache::get`], even before the background sweep reclaims it.
//! The cache lives for the owning client's lifetime and never touches disk.

use crate::product::Product;
use std::time::Duration;

/// One hour, the declared freshness window for resolved barcodes
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Longest accepted expiration window (one year)
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Barcode-keyed store of previously resolved products
#[derive(Clone)]
pub struct ProductCache {
    entries: moka::future::Cache<String, Product>,
}

impl ProductCache {
    /// `ttl` is capped at [`MAX_TTL`]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = moka::future::Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl.min(MAX_TTL))
            .build();

        Self { entries }
    }

    /// Fresh product for an exact (case-sensitive) barcode match
    pub async fn get(&self, barcode: &str) -> Option<Product> {
        self.entries.get(barcode).await
    }

    /// Store a product; a concurrent insert for the same barcode simply overwrites
    pub async fn insert(&self, barcode: String, product: Product) {
        self.entries.insert(barcode, product).await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Run pending maintenance now, evicting expired and invalidated entries
    pub async fn sweep(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Approximate entry count; call [`sweep`](Self::sweep) first for an exact figure
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProductCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
