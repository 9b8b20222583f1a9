//! `nutriscan compare`: side-by-side Nutri-Score comparison of barcodes.

use anyhow::Result;

use nutriscan_core::comparison::{AddOutcome, ComparisonSet, GradePoint, LABEL_MAX_CHARS};
use nutriscan_core::grade::MAX_ORDINAL;
use nutriscan_core::lookup::{is_product_code, ProductLookup};
use nutriscan_core::normalize::normalize;
use nutriscan_core::prompt::comparison_prompt;

use crate::config::Config;
use crate::openfoodfacts::OpenFoodFactsClient;
use crate::providers::{build_assistant, ProviderFlags};

/// What happened to each requested code while filling the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    Added,
    Duplicate,
    NotFound,
    /// Not a digits-only barcode; never sent upstream.
    Invalid,
}

/// Fetch each code and add the normalized product to `set`, in order.
pub fn collect_products(
    lookup: &dyn ProductLookup,
    codes: &[String],
    set: &mut ComparisonSet,
) -> Vec<(String, CodeOutcome)> {
    codes
        .iter()
        .map(|code| {
            let trimmed = code.trim();
            if !is_product_code(trimmed) {
                return (code.clone(), CodeOutcome::Invalid);
            }
            let outcome = match lookup.get_by_identifier(trimmed) {
                None => CodeOutcome::NotFound,
                Some(raw) => match set.add(normalize(&raw)) {
                    AddOutcome::Added => CodeOutcome::Added,
                    AddOutcome::AlreadyPresent => CodeOutcome::Duplicate,
                },
            };
            (code.clone(), outcome)
        })
        .collect()
}

/// Text bar chart: one row per product, bar length equal to the ordinal.
pub fn render_grade_table(series: &[GradePoint]) -> String {
    series
        .iter()
        .map(|point| {
            let filled = usize::from(point.ordinal);
            let empty = usize::from(MAX_ORDINAL) - filled;
            format!(
                "{:<width$}  {:<3}  {}{} {}/{}\n",
                point.label,
                point.grade,
                "█".repeat(filled),
                "·".repeat(empty),
                point.ordinal,
                MAX_ORDINAL,
                width = LABEL_MAX_CHARS,
            )
        })
        .collect()
}

/// Run the compare command and print the table (plus an AI verdict with
/// `--analyze`).
pub fn run_compare(
    config: &Config,
    flags: ProviderFlags<'_>,
    codes: &[String],
    analyze: bool,
) -> Result<()> {
    let client = OpenFoodFactsClient::new(&config.lookup)?;
    let mut set = ComparisonSet::new();

    for (code, outcome) in collect_products(&client, codes, &mut set) {
        match outcome {
            CodeOutcome::Added => {}
            CodeOutcome::Duplicate => println!("{}: already in the comparison, skipped", code),
            CodeOutcome::NotFound => println!("{}: product not found", code),
            CodeOutcome::Invalid => println!("{}: not a barcode, skipped", code),
        }
    }

    if set.is_empty() {
        println!("No products to compare.");
        return Ok(());
    }

    println!();
    print!("{}", render_grade_table(&set.grade_series()));

    if let Some(best) = set.best() {
        println!();
        println!("Best grade: {} ({})", best.display_label(), best.quality_grade);
    }

    if analyze {
        let mut assistant = build_assistant(config, flags)?;
        println!();
        println!("{}", assistant.chat(&comparison_prompt(set.products()), ""));
    }

    Ok(())
}
