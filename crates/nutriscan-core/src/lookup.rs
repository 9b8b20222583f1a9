//! Product database capability.
//!
//! The [`ProductLookup`] trait describes what the app needs from an upstream
//! product database. Implementations must fail safe: a transport error or a
//! missing product surfaces as an empty list / `None`, never as an error, so
//! [`normalize`](crate::normalize::normalize) always receives well-formed
//! (if sparse) input.

use serde_json::Value;

/// Minimum length of an all-digit query treated as a barcode.
pub const MIN_BARCODE_DIGITS: usize = 8;

/// Read-only access to an upstream product database.
pub trait ProductLookup {
    /// Full-text search by product name. Empty on no match or failure.
    fn search_by_name(&self, query: &str, max_results: usize) -> Vec<Value>;

    /// Fetch one product by barcode. `None` on no match or failure.
    fn get_by_identifier(&self, code: &str) -> Option<Value>;
}

/// True when `code` can be used as a product identifier: non-empty and
/// ASCII digits only, so it is safe to place in a URL path.
pub fn is_product_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

/// True when `query` looks like a barcode (digits only, at least
/// [`MIN_BARCODE_DIGITS`] long).
pub fn looks_like_barcode(query: &str) -> bool {
    let query = query.trim();
    query.len() >= MIN_BARCODE_DIGITS && is_product_code(query)
}

/// Resolve a free-form query: barcodes go through
/// [`get_by_identifier`](ProductLookup::get_by_identifier), everything else
/// through [`search_by_name`](ProductLookup::search_by_name).
pub fn find_products(lookup: &dyn ProductLookup, query: &str, max_results: usize) -> Vec<Value> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    if looks_like_barcode(query) {
        lookup.get_by_identifier(query).into_iter().collect()
    } else {
        lookup.search_by_name(query, max_results)
    }
}
