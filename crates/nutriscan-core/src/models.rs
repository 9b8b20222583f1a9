//! Core data models used throughout NutriScan.
//!
//! These types represent the canonical product record produced by
//! [`normalize`](crate::normalize::normalize), its quality classification,
//! and the turns of an assistant conversation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Sentinel used when the upstream record has no product name.
pub const UNNAMED_PRODUCT: &str = "unnamed product";
/// Sentinel used when the upstream record has no brand.
pub const UNKNOWN_BRAND: &str = "unknown brand";
/// Sentinel used when the upstream record has no ingredient list.
pub const INGREDIENTS_NOT_AVAILABLE: &str = "not available";
/// Sentinel used when the upstream record has no allergen declaration.
pub const ALLERGENS_NOT_SPECIFIED: &str = "not specified";

/// Nutri-Score letter grade.
///
/// A closed set: anything the upstream database sends that is not a letter
/// `a`..`e` ends up as [`QualityGrade::NotAvailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    E,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl QualityGrade {
    /// All grades, best first.
    pub const ALL: [QualityGrade; 6] = [
        QualityGrade::A,
        QualityGrade::B,
        QualityGrade::C,
        QualityGrade::D,
        QualityGrade::E,
        QualityGrade::NotAvailable,
    ];

    /// Parse a grade letter leniently (case-insensitive, whitespace trimmed).
    ///
    /// Never fails: unrecognized input yields [`QualityGrade::NotAvailable`].
    ///
    /// ```rust
    /// use nutriscan_core::models::QualityGrade;
    ///
    /// assert_eq!(QualityGrade::parse(" b "), QualityGrade::B);
    /// assert_eq!(QualityGrade::parse("not-applicable"), QualityGrade::NotAvailable);
    /// ```
    pub fn parse(raw: &str) -> Self {
        Self::recognize(raw).unwrap_or(QualityGrade::NotAvailable)
    }

    /// Like [`parse`](Self::parse) but returns `None` for unrecognized input.
    ///
    /// `"N/A"` itself is not a recognized grade here, so callers resolving
    /// between several candidate fields can keep looking.
    pub fn recognize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(QualityGrade::A),
            "B" => Some(QualityGrade::B),
            "C" => Some(QualityGrade::C),
            "D" => Some(QualityGrade::D),
            "E" => Some(QualityGrade::E),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::E => "E",
            QualityGrade::NotAvailable => "N/A",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// NOVA processing group as reported upstream.
///
/// Passed through verbatim: a number (or numeric string) becomes `Group(n)`
/// without range checking, anything else is `NotAvailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingGroup {
    Group(i64),
    NotAvailable,
}

impl fmt::Display for ProcessingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingGroup::Group(n) => f.pad(&n.to_string()),
            ProcessingGroup::NotAvailable => f.pad("N/A"),
        }
    }
}

impl Serialize for ProcessingGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProcessingGroup::Group(n) => serializer.serialize_i64(*n),
            ProcessingGroup::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Nutrients tracked per 100 g of product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientKey {
    Calories,
    Fat,
    SaturatedFat,
    Sugars,
    Salt,
    Protein,
    Carbohydrates,
    Fiber,
    Sodium,
}

impl NutrientKey {
    pub const ALL: [NutrientKey; 9] = [
        NutrientKey::Calories,
        NutrientKey::Fat,
        NutrientKey::SaturatedFat,
        NutrientKey::Sugars,
        NutrientKey::Salt,
        NutrientKey::Protein,
        NutrientKey::Carbohydrates,
        NutrientKey::Fiber,
        NutrientKey::Sodium,
    ];

    /// Field name in the upstream `nutriments` object.
    pub fn source_field(&self) -> &'static str {
        match self {
            NutrientKey::Calories => "energy-kcal_100g",
            NutrientKey::Fat => "fat_100g",
            NutrientKey::SaturatedFat => "saturated-fat_100g",
            NutrientKey::Sugars => "sugars_100g",
            NutrientKey::Salt => "salt_100g",
            NutrientKey::Protein => "proteins_100g",
            NutrientKey::Carbohydrates => "carbohydrates_100g",
            NutrientKey::Fiber => "fiber_100g",
            NutrientKey::Sodium => "sodium_100g",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NutrientKey::Calories => "Calories (kcal)",
            NutrientKey::Fat => "Fat",
            NutrientKey::SaturatedFat => "Saturated fat",
            NutrientKey::Sugars => "Sugars",
            NutrientKey::Salt => "Salt",
            NutrientKey::Protein => "Protein",
            NutrientKey::Carbohydrates => "Carbohydrates",
            NutrientKey::Fiber => "Fiber",
            NutrientKey::Sodium => "Sodium",
        }
    }
}

/// Per-100 g nutrient values. Missing values stay absent, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Nutrients(BTreeMap<NutrientKey, f64>);

impl Nutrients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: NutrientKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: NutrientKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Present values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (NutrientKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Positive macronutrient values (protein, carbohydrates, fat, fiber),
    /// the slices a composition chart draws. Absent or zero values are skipped.
    pub fn macronutrient_breakdown(&self) -> Vec<(NutrientKey, f64)> {
        [
            NutrientKey::Protein,
            NutrientKey::Carbohydrates,
            NutrientKey::Fat,
            NutrientKey::Fiber,
        ]
        .into_iter()
        .filter_map(|key| self.get(key).filter(|v| *v > 0.0).map(|v| (key, v)))
        .collect()
    }
}

/// Canonical product record.
///
/// Built once by [`normalize`](crate::normalize::normalize) and never
/// mutated afterwards. Every field is populated; absence is expressed with
/// the sentinels defined in this module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInfo {
    pub code: String,
    pub name: String,
    pub brand: String,
    pub quality_grade: QualityGrade,
    pub processing_group: ProcessingGroup,
    pub image_url: String,
    pub ingredients_text: String,
    pub allergens: String,
    pub nutrients_per_100g: Nutrients,
    pub categories: String,
}

impl ProductInfo {
    /// `"<name> - <brand>"`, used when listing search results.
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.name, self.brand)
    }

    /// True when both products carry the same non-empty code.
    pub fn same_product(&self, other: &ProductInfo) -> bool {
        !self.code.is_empty() && self.code == other.code
    }

    /// First entry of the comma-separated category list, if any.
    pub fn primary_category(&self) -> Option<&str> {
        self.categories
            .split(',')
            .map(str::trim)
            .find(|c| !c.is_empty())
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in an assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
