//! Open Food Facts product lookup.
//!
//! Blocking HTTP implementation of [`ProductLookup`] against the public
//! Open Food Facts API:
//!
//! - search: `GET {base}/cgi/search.pl?search_terms=..&json=1&page_size=N`
//! - product: `GET {base}/api/v0/product/{code}.json`
//!
//! Failures never propagate past the trait: they are logged as warnings and
//! surface as an empty result list or `None`.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

use nutriscan_core::lookup::{is_product_code, ProductLookup};

use crate::config::LookupConfig;

pub struct OpenFoodFactsClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn try_search(&self, query: &str, page_size: usize) -> Result<Vec<Value>> {
        let page_size = page_size.to_string();
        let json: Value = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(parse_search_response(&json))
    }

    fn try_get(&self, code: &str) -> Result<Option<Value>> {
        if !is_product_code(code) {
            anyhow::bail!("not a product code: {:?}", code);
        }
        let json: Value = self
            .client
            .get(format!("{}/api/v0/product/{}.json", self.base_url, code))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(parse_product_response(&json))
    }
}

impl ProductLookup for OpenFoodFactsClient {
    fn search_by_name(&self, query: &str, max_results: usize) -> Vec<Value> {
        match self.try_search(query, max_results) {
            Ok(products) => {
                tracing::debug!(query, found = products.len(), "product search");
                products
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "product search failed");
                Vec::new()
            }
        }
    }

    fn get_by_identifier(&self, code: &str) -> Option<Value> {
        match self.try_get(code) {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!(code, error = %e, "product fetch failed");
                None
            }
        }
    }
}

/// Extract the `products` array from a search response.
pub fn parse_search_response(json: &Value) -> Vec<Value> {
    json.get("products")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Extract the product from a lookup response; `None` unless `status == 1`.
pub fn parse_product_response(json: &Value) -> Option<Value> {
    if json.get("status").and_then(Value::as_i64) != Some(1) {
        return None;
    }
    json.get("product").filter(|p| p.is_object()).cloned()
}
