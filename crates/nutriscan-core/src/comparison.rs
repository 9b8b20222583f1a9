//! Product comparison helpers.
//!
//! [`ComparisonSet`] is the caller-owned collection of products the user is
//! comparing. Membership is decided by product code alone.
//! [`better_alternatives`] filters candidate products down to genuine
//! improvements over a reference, going through the grade ordinal.

use crate::grade::{is_strictly_better, quality_ordinal};
use crate::models::{ProductInfo, QualityGrade};

/// Result of [`ComparisonSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Ordered set of products under comparison, keyed by product code.
///
/// Products with an empty code have no identity and are always accepted.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSet {
    products: Vec<ProductInfo>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: ProductInfo) -> AddOutcome {
        if self.contains(&product) {
            return AddOutcome::AlreadyPresent;
        }
        self.products.push(product);
        AddOutcome::Added
    }

    pub fn contains(&self, product: &ProductInfo) -> bool {
        self.products.iter().any(|p| p.same_product(product))
    }

    /// Remove the product at `index`, returning it if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<ProductInfo> {
        (index < self.products.len()).then(|| self.products.remove(index))
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn products(&self) -> &[ProductInfo] {
        &self.products
    }

    /// Best-graded product. Ties keep the earliest added.
    pub fn best(&self) -> Option<&ProductInfo> {
        self.products.iter().reduce(|best, p| {
            if is_strictly_better(p.quality_grade, best.quality_grade) {
                p
            } else {
                best
            }
        })
    }

    /// Chart series for the products in insertion order.
    pub fn grade_series(&self) -> Vec<GradePoint> {
        grade_series(&self.products)
    }
}

/// One bar of a grade comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GradePoint {
    pub label: String,
    pub grade: QualityGrade,
    pub ordinal: u8,
}

/// Longest product name a chart label keeps.
pub const LABEL_MAX_CHARS: usize = 30;

/// Map products to chart bars: truncated name, letter, ordinal height.
pub fn grade_series(products: &[ProductInfo]) -> Vec<GradePoint> {
    products
        .iter()
        .map(|p| GradePoint {
            label: p.name.chars().take(LABEL_MAX_CHARS).collect(),
            grade: p.quality_grade,
            ordinal: quality_ordinal(p.quality_grade),
        })
        .collect()
}

/// Candidates graded strictly better than `reference`, excluding the
/// reference product itself. Input order is preserved.
pub fn better_alternatives(
    reference: &ProductInfo,
    candidates: impl IntoIterator<Item = ProductInfo>,
) -> Vec<ProductInfo> {
    candidates
        .into_iter()
        .filter(|c| !c.same_product(reference))
        .filter(|c| is_strictly_better(c.quality_grade, reference.quality_grade))
        .collect()
}
