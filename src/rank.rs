//! Merging and relevance ordering for multi-source search results.

use crate::product::Product;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Drop every product whose lowercased name was already seen.
///
/// The first occurrence wins, so callers control precedence through input order.
pub fn dedup_by_name(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::with_capacity(products.len());
    products
        .into_iter()
        .filter(|product| seen.insert(product.dedup_key()))
        .collect()
}

/// How well one name matches a normalized (lowercased, trimmed) query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Relevance {
    exact: bool,
    prefix: bool,
    first_word: bool,
    len: usize,
}

impl Relevance {
    fn of(name: &str, query: &str) -> Self {
        let name = name.to_lowercase();
        let first_word = name
            .split(|c: char| !c.is_alphanumeric())
            .find(|token| !token.is_empty())
            .is_some_and(|token| token.starts_with(query));

        Self {
            exact: name == query,
            prefix: name.starts_with(query),
            first_word,
            len: name.chars().count(),
        }
    }
}

impl Ord for Relevance {
    fn cmp(&self, other: &Self) -> Ordering {
        // `true` sorts first for the match clauses, then shorter names
        other
            .exact
            .cmp(&self.exact)
            .then_with(|| other.prefix.cmp(&self.prefix))
            .then_with(|| other.first_word.cmp(&self.first_word))
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl PartialOrd for Relevance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stable-sort products by relevance to `query`.
///
/// `query` is expected already normalized. Order: exact name match, then
/// name prefix, then first-word match, then shorter names. Equal products
/// keep their incoming order.
pub fn rank(products: &mut [Product], query: &str) {
    products.sort_by_cached_key(|product| Relevance::of(&product.name, query));
}

/// Lowercase and trim a raw query for ranking
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
