//! Ordinal scale for Nutri-Score grades.
//!
//! Charts and "is this alternative better" checks work on the ordinal, never
//! on the letter: comparing letters as strings would rank `"N/A"` by its
//! ASCII value instead of treating it as the bottom of the scale.
//!
//! | Grade | Ordinal |
//! |-------|---------|
//! | A | 5 |
//! | B | 4 |
//! | C | 3 |
//! | D | 2 |
//! | E | 1 |
//! | N/A | 0 |

use crate::models::QualityGrade;

/// Highest value [`quality_ordinal`] can return.
pub const MAX_ORDINAL: u8 = 5;

/// Map a grade onto `0..=5`, better grades strictly greater.
pub fn quality_ordinal(grade: QualityGrade) -> u8 {
    match grade {
        QualityGrade::A => 5,
        QualityGrade::B => 4,
        QualityGrade::C => 3,
        QualityGrade::D => 2,
        QualityGrade::E => 1,
        QualityGrade::NotAvailable => 0,
    }
}

/// True iff `candidate` ranks strictly above `reference` on the ordinal scale.
///
/// ```rust
/// use nutriscan_core::grade::is_strictly_better;
/// use nutriscan_core::models::QualityGrade;
///
/// assert!(is_strictly_better(QualityGrade::B, QualityGrade::E));
/// assert!(!is_strictly_better(QualityGrade::NotAvailable, QualityGrade::E));
/// ```
pub fn is_strictly_better(candidate: QualityGrade, reference: QualityGrade) -> bool {
    quality_ordinal(candidate) > quality_ordinal(reference)
}

/// Display color (hex) conventionally associated with each grade.
pub fn grade_color(grade: QualityGrade) -> &'static str {
    match grade {
        QualityGrade::A => "#22C55E",
        QualityGrade::B => "#84CC16",
        QualityGrade::C => "#FCD34D",
        QualityGrade::D => "#F59E0B",
        QualityGrade::E => "#EF4444",
        QualityGrade::NotAvailable => "#6B7280",
    }
}
