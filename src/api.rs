//! Food-data client: barcode resolution and multi-provider search.
//!
//! This module provides [`FoodApi`], the single entry point into the two upstream
//! food databases. It owns the HTTP client, the provider endpoints and the barcode
//! cache, so independent instances never share state.
//!
//! # Features
//!
//! - **Barcode lookup**: one request to the branded-goods provider, memoized in an
//!   in-memory cache with a one-hour expiration window
//! - **Fan-out search**: both providers are queried concurrently and merged
//! - **Best-effort**: a failing search provider contributes no results instead of
//!   failing the whole search
//! - **Timeouts per call**: 15 seconds for a lookup, 10 seconds for each search call
//!
//! # Examples
//!
//! ```no_run
//! use forage::{Config, FoodApi};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = FoodApi::with_config(Config::from_env())?;
//!
//!     let product = api.lookup("3017620422003").await?;
//!     println!("{}: {} kcal per {} {}", product.name, product.calories,
//!         product.serving_size, product.serving_unit);
//!
//!     for hit in api.search("greek yogurt", 1).await {
//!         println!("{} ({})", hit.name, hit.source);
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::branded;
use crate::cache::ProductCache;
use crate::config::Config;
use crate::error::{FoodError, Result};
use crate::generic;
use crate::product::{Product, ProductSource};
use crate::rank::{dedup_by_name, normalize_query, rank};
use reqwest::{RequestBuilder, StatusCode, Url};
use std::time::Duration;

/// Food-data client with an owned barcode cache
#[derive(Clone)]
pub struct FoodApi {
    client: reqwest::Client,
    config: Config,
    branded_base: Url,
    generic_base: Url,
    cache: ProductCache,
}

impl FoodApi {
    /// Create a client configured from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::from_env())
    }

    /// Create a client for explicit endpoints and settings.
    ///
    /// # Errors
    ///
    /// Returns [`FoodError::InvalidConfig`] if a base URL, the page size or the
    /// cache TTL is unusable, and [`FoodError::ClientInit`] if the HTTP client
    /// cannot be built.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let branded_base = parse_base(&config.branded_base_url)?;
        let generic_base = parse_base(&config.generic_base_url)?;

        // Timeouts are set per request, not on the client
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(format!("forage/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FoodError::ClientInit)?;

        let cache = ProductCache::new(config.cache_capacity, config.cache_ttl);

        Ok(Self {
            client,
            config,
            branded_base,
            generic_base,
            cache,
        })
    }

    /// Resolve a single barcode (with in-memory caching).
    ///
    /// A fresh cached product is returned without touching the network. Otherwise
    /// one GET is issued to the branded-goods provider, bounded by the lookup
    /// timeout, and a successful result is cached under the barcode as given.
    ///
    /// # Errors
    ///
    /// - [`FoodError::InvalidBarcode`] for an empty barcode
    /// - [`FoodError::ProductNotFound`] on HTTP 404 or an upstream "not found" status
    /// - [`FoodError::ApiError`] on any other non-2xx status
    /// - [`FoodError::NetworkError`] on transport failure or timeout
    /// - [`FoodError::InvalidResponse`] if the body cannot be read
    /// - [`FoodError::DecodingError`] if the body is not the expected JSON
    pub async fn lookup(&self, barcode: &str) -> Result<Product> {
        if barcode.trim().is_empty() {
            return Err(FoodError::InvalidBarcode(barcode.to_string()));
        }

        if let Some(cached) = self.cache.get(barcode).await {
            tracing::debug!(barcode, "barcode cache hit");
            return Ok(cached);
        }

        let url = endpoint(&self.branded_base, &["product", barcode])
            .ok_or_else(|| FoodError::InvalidBarcode(barcode.to_string()))?;
        tracing::debug!(barcode, %url, "barcode cache miss, fetching");

        let response = self
            .client
            .get(url)
            .timeout(self.config.lookup_timeout)
            .send()
            .await
            .map_err(FoodError::NetworkError)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FoodError::ProductNotFound(barcode.to_string())),
            status if !status.is_success() => return Err(FoodError::ApiError(status.as_u16())),
            _ => {}
        }

        let body = read_body(response).await?;
        let product = branded::parse_barcode_response(barcode, &body)?;

        self.cache
            .insert(barcode.to_string(), product.clone())
            .await;

        Ok(product)
    }

    /// Search both providers for `query` and return merged, ranked results.
    ///
    /// Both calls run concurrently and are awaited together. Generic-foods results
    /// come before branded-goods results when deduplicating by lowercased name, so
    /// the generic entry wins a collision. A provider that fails is logged and
    /// contributes nothing; this method never returns an error. Results are never
    /// cached. `page` is 1-based; `0` is treated as `1`.
    pub async fn search(&self, query: &str, page: u32) -> Vec<Product> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        let page = page.max(1);

        let (generic, branded) = tokio::join!(
            self.search_generic(query, page),
            self.search_branded(query, page)
        );

        let mut merged = settle(ProductSource::GenericFoods, generic);
        merged.extend(settle(ProductSource::BrandedGoods, branded));

        let mut merged = dedup_by_name(merged);
        rank(&mut merged, &normalized);
        merged
    }

    /// Query the generic-foods provider alone.
    ///
    /// Without a configured credential this returns an empty list without a request.
    pub async fn search_generic(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        let Some(api_key) = self.config.generic_api_key.as_deref() else {
            tracing::debug!("no generic-foods API key configured, skipping provider");
            return Ok(Vec::new());
        };

        let url = endpoint(&self.generic_base, &["foods", "search"])
            .ok_or_else(|| FoodError::InvalidConfig(self.config.generic_base_url.clone()))?;
        let page_size = self.config.page_size.to_string();
        let page = page.to_string();
        let request = self.client.get(url).query(&[
            ("api_key", api_key),
            ("query", query),
            ("pageSize", page_size.as_str()),
            ("pageNumber", page.as_str()),
        ]);

        let body = self.fetch(request).await?;
        generic::parse_search_response(&body)
    }

    /// Query the branded-goods provider alone.
    pub async fn search_branded(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        let url = endpoint(&self.branded_base, &["search"])
            .ok_or_else(|| FoodError::InvalidConfig(self.config.branded_base_url.clone()))?;
        let page = page.to_string();
        let page_size = self.config.page_size.to_string();
        let request = self.client.get(url).query(&[
            ("search_terms", query),
            ("page", page.as_str()),
            ("page_size", page_size.as_str()),
        ]);

        let body = self.fetch(request).await?;
        branded::parse_search_response(&body)
    }

    /// Drop every cached barcode
    pub async fn clear_cache(&self) {
        self.cache.clear();
        self.cache.sweep().await;
    }

    /// Number of live cached barcodes
    pub async fn cache_len(&self) -> u64 {
        self.cache.sweep().await;
        self.cache.len()
    }

    /// Send a search request with the per-call search timeout.
    ///
    /// URLs are stripped from transport errors since they carry the API key.
    async fn fetch(&self, request: RequestBuilder) -> Result<bytes::Bytes> {
        let response = request
            .timeout(self.config.search_timeout)
            .send()
            .await
            .map_err(|e| FoodError::NetworkError(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FoodError::ApiError(status.as_u16()));
        }

        read_body(response).await
    }
}

/// Coerce one provider's outcome to a result list, logging the failure
fn settle(source: ProductSource, outcome: Result<Vec<Product>>) -> Vec<Product> {
    match outcome {
        Ok(products) => {
            tracing::debug!(
                provider = %source,
                count = products.len(),
                "search provider returned"
            );
            products
        }
        Err(err) => {
            tracing::warn!(
                provider = %source,
                error = %err,
                "search provider failed, contributing no results"
            );
            Vec::new()
        }
    }
}

async fn read_body(response: reqwest::Response) -> Result<bytes::Bytes> {
    response.bytes().await.map_err(|e| {
        let e = e.without_url();
        if e.is_timeout() {
            FoodError::NetworkError(e)
        } else {
            FoodError::InvalidResponse(e.to_string())
        }
    })
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| FoodError::InvalidConfig(format!("{raw}: {e}")))
}

/// Append path segments to a base URL; each segment is percent-encoded on its own,
/// so a segment containing `/` or `?` cannot change the request path
fn endpoint(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}
