//! Upstream record normalization.
//!
//! Converts a raw product record, as returned by the Open Food Facts API
//! (a loosely-typed JSON object where any field may be missing, `null`, or of
//! an unexpected type), into a fully-populated [`ProductInfo`].
//!
//! [`normalize`] is total: it never fails and never panics. Absent data is
//! expressed with the sentinels from [`crate::models`].
//!
//! # Grade resolution
//!
//! The Nutri-Score may arrive in two shapes:
//!
//! ```text
//! "nutriscore_grade": "e"
//! "nutriscore": { "2023": { "grade": "b" }, "2021": { "grade": "a" } }
//! ```
//!
//! Resolution order:
//! 1. the most recent edition year carrying a recognized grade, then older ones;
//! 2. a plain string grade;
//! 3. `N/A`.

use serde_json::{Map, Value};

use crate::models::{
    NutrientKey, Nutrients, ProcessingGroup, ProductInfo, QualityGrade, ALLERGENS_NOT_SPECIFIED,
    INGREDIENTS_NOT_AVAILABLE, UNKNOWN_BRAND, UNNAMED_PRODUCT,
};

/// Fields that may carry the grade, in lookup order.
const GRADE_FIELDS: [&str; 2] = ["nutriscore_grade", "nutriscore"];

/// Build a [`ProductInfo`] from a raw upstream record.
///
/// Non-object input is treated as an empty record.
///
/// ```rust
/// use nutriscan_core::normalize::normalize;
/// use nutriscan_core::models::QualityGrade;
///
/// let info = normalize(&serde_json::json!({ "nutriscore_grade": "a" }));
/// assert_eq!(info.quality_grade, QualityGrade::A);
/// assert_eq!(info.name, "unnamed product");
/// ```
pub fn normalize(raw: &Value) -> ProductInfo {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);

    ProductInfo {
        code: code_field(record),
        name: text_field(record, "product_name").unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
        brand: text_field(record, "brands").unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
        quality_grade: resolve_grade(record),
        processing_group: processing_group(record.get("nova_group")),
        image_url: text_field(record, "image_url").unwrap_or_default(),
        ingredients_text: text_field(record, "ingredients_text")
            .unwrap_or_else(|| INGREDIENTS_NOT_AVAILABLE.to_string()),
        allergens: text_field(record, "allergens")
            .unwrap_or_else(|| ALLERGENS_NOT_SPECIFIED.to_string()),
        nutrients_per_100g: nutrients(record.get("nutriments")),
        categories: text_field(record, "categories").unwrap_or_default(),
    }
}

/// Resolve the grade following the edition → plain string → `N/A` policy.
pub fn resolve_grade(record: &Map<String, Value>) -> QualityGrade {
    grade_values(record)
        .find_map(edition_grade)
        .or_else(|| {
            grade_values(record).find_map(|v| v.as_str().and_then(QualityGrade::recognize))
        })
        .unwrap_or(QualityGrade::NotAvailable)
}

fn grade_values(record: &Map<String, Value>) -> impl Iterator<Item = &Value> + '_ {
    GRADE_FIELDS.iter().filter_map(move |f| record.get(*f))
}

/// Grade from an object keyed by edition year, newest recognized edition first.
fn edition_grade(value: &Value) -> Option<QualityGrade> {
    let editions = value.as_object()?;

    let mut dated: Vec<(u32, &Value)> = editions
        .iter()
        .filter_map(|(year, edition)| year.trim().parse::<u32>().ok().map(|y| (y, edition)))
        .collect();
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    dated.into_iter().find_map(|(_, edition)| {
        edition
            .get("grade")
            .and_then(Value::as_str)
            .and_then(QualityGrade::recognize)
    })
}

/// Non-blank string field. Blank strings count as absent.
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Barcodes usually arrive as strings but some records carry a bare number.
fn code_field(record: &Map<String, Value>) -> String {
    match record.get("code") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn processing_group(value: Option<&Value>) -> ProcessingGroup {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(ProcessingGroup::Group)
            .unwrap_or(ProcessingGroup::NotAvailable),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(ProcessingGroup::Group)
            .unwrap_or(ProcessingGroup::NotAvailable),
        _ => ProcessingGroup::NotAvailable,
    }
}

fn nutrients(value: Option<&Value>) -> Nutrients {
    let mut out = Nutrients::new();
    let Some(source) = value.and_then(Value::as_object) else {
        return out;
    };

    for key in NutrientKey::ALL {
        if let Some(v) = source.get(key.source_field()).and_then(numeric) {
            out.insert(key, v);
        }
    }
    out
}

/// Numbers pass through; numeric strings are parsed; everything else is absent.
fn numeric(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
