//! `nutriscan inspect`: normalize a raw product record from disk.
//!
//! Accepts either a bare product object or the `{"status": 1, "product": {..}}`
//! envelope returned by the product endpoint. Works offline.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use nutriscan_core::grade::{grade_color, quality_ordinal, MAX_ORDINAL};
use nutriscan_core::models::ProductInfo;
use nutriscan_core::normalize::normalize;

/// Strip a `{"product": {..}}` envelope if present.
pub fn unwrap_envelope(raw: &Value) -> &Value {
    match raw.get("product") {
        Some(product) if product.is_object() => product,
        _ => raw,
    }
}

/// Human-readable summary printed after the JSON record.
pub fn summary(product: &ProductInfo) -> String {
    let mut out = format!(
        "Nutri-Score ordinal: {}/{} ({})\n",
        quality_ordinal(product.quality_grade),
        MAX_ORDINAL,
        grade_color(product.quality_grade)
    );

    let nutrients = &product.nutrients_per_100g;
    if !nutrients.is_empty() {
        out.push_str("Nutrients per 100g:\n");
        for (key, value) in nutrients.iter() {
            out.push_str(&format!("  {:<16} {:.2}\n", key.label(), value));
        }
    }

    let breakdown = nutrients.macronutrient_breakdown();
    if !breakdown.is_empty() {
        out.push_str("Composition per 100g:\n");
        for (key, value) in breakdown {
            out.push_str(&format!("  {:<14} {:.1} g\n", key.label(), value));
        }
    }
    out
}

pub fn run_inspect(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read product file: {}", path.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let product = normalize(unwrap_envelope(&raw));

    println!("{}", serde_json::to_string_pretty(&product)?);
    print!("{}", summary(&product));
    Ok(())
}
