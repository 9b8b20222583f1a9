//! `nutriscan search`: product lookup, analysis and better alternatives.
//!
//! A query of at least eight digits is treated as a barcode; anything else
//! is a name search. Results are normalized before display, so missing
//! upstream fields show up as their sentinels rather than blanks.

use anyhow::{bail, Result};

use nutriscan_core::assistant::{NutritionAssistant, Reply};
use nutriscan_core::comparison::better_alternatives;
use nutriscan_core::lookup::{find_products, ProductLookup};
use nutriscan_core::models::ProductInfo;
use nutriscan_core::normalize::normalize;
use nutriscan_core::prompt::{product_context, MAX_ALTERNATIVES};

use crate::config::{Config, MAX_PAGE_SIZE};
use crate::openfoodfacts::OpenFoodFactsClient;
use crate::providers::{build_assistant, ProviderFlags};

/// Candidates fetched when looking for alternatives.
pub const ALTERNATIVE_SEARCH_SIZE: usize = 5;

/// Options for `nutriscan search`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub analyze: bool,
    pub alternatives: bool,
    /// Question about the first result, sent with the product as context.
    pub ask: Option<String>,
}

/// One result line: code, grade, NOVA group, `name - brand`.
pub fn format_product_line(product: &ProductInfo) -> String {
    let code = if product.code.is_empty() {
        "-"
    } else {
        product.code.as_str()
    };
    format!(
        "{:<14} {:<4} NOVA {:<4} {}",
        code,
        product.quality_grade,
        product.processing_group,
        product.display_label()
    )
}

/// Result count for a search: `--limit` when given, else the configured
/// page size. Bounded like `lookup.page_size`.
pub fn resolve_limit(limit: Option<usize>, page_size: usize) -> Result<usize> {
    match limit {
        None => Ok(page_size),
        Some(n) if (1..=MAX_PAGE_SIZE).contains(&n) => Ok(n),
        Some(n) => bail!("--limit must be in [1, {}], got {}", MAX_PAGE_SIZE, n),
    }
}

/// Query used to look for alternatives: the product's first category, or
/// the first word of its name when it has no categories.
pub fn alternative_query(product: &ProductInfo) -> Option<String> {
    product
        .primary_category()
        .or_else(|| product.name.split_whitespace().next())
        .map(str::to_string)
}

/// Up to [`MAX_ALTERNATIVES`] products graded strictly better than `product`.
pub fn find_alternatives(lookup: &dyn ProductLookup, product: &ProductInfo) -> Vec<ProductInfo> {
    let Some(query) = alternative_query(product) else {
        return Vec::new();
    };
    tracing::debug!(query = %query, "searching alternatives");

    let raw = lookup.search_by_name(&query, ALTERNATIVE_SEARCH_SIZE);
    better_alternatives(product, raw.iter().map(normalize))
        .into_iter()
        .take(MAX_ALTERNATIVES)
        .collect()
}

/// Ask a free-form question about `product` in the running conversation.
pub fn ask_about(
    assistant: &mut NutritionAssistant,
    product: &ProductInfo,
    question: &str,
) -> Reply {
    assistant.chat(question, &product_context(product))
}

/// Run the search command against Open Food Facts and print the results.
pub fn run_search(
    config: &Config,
    flags: ProviderFlags<'_>,
    query: &str,
    options: &SearchOptions,
) -> Result<()> {
    let limit = resolve_limit(options.limit, config.lookup.page_size)?;
    let client = OpenFoodFactsClient::new(&config.lookup)?;

    let products: Vec<ProductInfo> = find_products(&client, query, limit)
        .iter()
        .map(normalize)
        .collect();

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    println!("{} product(s):", products.len());
    for product in &products {
        println!("  {}", format_product_line(product));
    }

    if !options.analyze && !options.alternatives && options.ask.is_none() {
        return Ok(());
    }

    let first = &products[0];
    let mut assistant = build_assistant(config, flags)?;

    if options.analyze {
        println!();
        println!("Analysis of {}:", first.display_label());
        println!("{}", assistant.analyze_product(first));
    }

    if options.alternatives {
        println!();
        let alternatives = find_alternatives(&client, first);
        if alternatives.is_empty() {
            println!("No alternative with a better Nutri-Score found.");
        } else {
            println!("Better alternatives:");
            for alt in &alternatives {
                println!("  {}", format_product_line(alt));
            }
            println!();
            println!("{}", assistant.suggest_alternatives(first, &alternatives));
        }
    }

    if let Some(question) = options.ask.as_deref() {
        println!();
        println!("{}", ask_about(&mut assistant, first, question));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriscan_core::models::QualityGrade;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    struct CannedLookup {
        results: Vec<Value>,
        queries: RefCell<Vec<(String, usize)>>,
    }

    impl CannedLookup {
        fn new(results: Vec<Value>) -> Self {
            Self {
                results,
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProductLookup for CannedLookup {
        fn search_by_name(&self, query: &str, max_results: usize) -> Vec<Value> {
            self.queries.borrow_mut().push((query.to_string(), max_results));
            self.results.clone()
        }

        fn get_by_identifier(&self, _code: &str) -> Option<Value> {
            None
        }
    }

    fn spread() -> ProductInfo {
        normalize(&json!({
            "code": "3017620422003",
            "product_name": "Nutella",
            "brands": "Ferrero",
            "nutriscore_grade": "e",
            "nova_group": 4,
            "categories": "Spreads, Sweet spreads, Hazelnut spreads"
        }))
    }

    #[test]
    fn test_format_product_line() {
        let line = format_product_line(&spread());
        assert!(line.starts_with("3017620422003"));
        assert!(line.contains(" E "));
        assert!(line.contains("NOVA 4"));
        assert!(line.ends_with("Nutella - Ferrero"));
    }

    #[test]
    fn test_format_product_line_without_code() {
        let line = format_product_line(&normalize(&json!({})));
        assert!(line.starts_with("-"));
        assert!(line.contains("N/A"));
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None, 10).unwrap(), 10);
        assert_eq!(resolve_limit(Some(1), 10).unwrap(), 1);
        assert_eq!(resolve_limit(Some(MAX_PAGE_SIZE), 10).unwrap(), MAX_PAGE_SIZE);
        assert!(resolve_limit(Some(0), 10).is_err());
        assert!(resolve_limit(Some(100_000), 10).is_err());
    }

    #[test]
    fn test_alternative_query_prefers_category() {
        assert_eq!(alternative_query(&spread()).as_deref(), Some("Spreads"));
    }

    #[test]
    fn test_alternative_query_falls_back_to_name() {
        let product = normalize(&json!({ "product_name": "Chocolate biscuits" }));
        assert_eq!(alternative_query(&product).as_deref(), Some("Chocolate"));
    }

    #[test]
    fn test_find_alternatives_filters_and_limits() {
        let lookup = CannedLookup::new(vec![
            json!({ "code": "3017620422003", "product_name": "Nutella", "nutriscore_grade": "e" }),
            json!({ "code": "1", "product_name": "Spread A", "nutriscore_grade": "a" }),
            json!({ "code": "2", "product_name": "Spread E", "nutriscore_grade": "e" }),
            json!({ "code": "3", "product_name": "Spread unknown", "nutriscore_grade": "unknown" }),
            json!({ "code": "4", "product_name": "Spread C", "nutriscore_grade": "c" }),
            json!({ "code": "5", "product_name": "Spread B", "nutriscore_grade": "b" }),
            json!({ "code": "6", "product_name": "Spread D", "nutriscore_grade": "d" }),
        ]);

        let alternatives = find_alternatives(&lookup, &spread());
        let names: Vec<&str> = alternatives.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Spread A", "Spread C", "Spread B"]);
        assert!(alternatives
            .iter()
            .all(|p| p.quality_grade != QualityGrade::E));

        let queries = lookup.queries.borrow();
        assert_eq!(queries.as_slice(), &[("Spreads".to_string(), ALTERNATIVE_SEARCH_SIZE)]);
    }

    #[test]
    fn test_ask_about_sends_product_context() {
        use nutriscan_core::generation::{GenerationRequest, TextGeneration};
        use nutriscan_core::provider::ProviderSettings;

        /// Answers with the content of the last message it receives.
        struct Mirror;

        impl TextGeneration for Mirror {
            fn name(&self) -> &str {
                "mirror"
            }

            fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
                Ok(request.messages.last().map(|m| m.content.clone()).unwrap_or_default())
            }
        }

        let mut assistant = NutritionAssistant::from_settings(
            &ProviderSettings::explicit(Some("openai"), None),
            Box::new(Mirror),
        );
        let reply = ask_about(&mut assistant, &spread(), "Is it fine for breakfast?");

        assert!(!reply.is_failure());
        assert!(reply
            .text()
            .starts_with("Product: Nutella (Ferrero, Nutri-Score E, NOVA 4)"));
        assert!(reply.text().ends_with("Question: Is it fine for breakfast?"));
        assert_eq!(assistant.history().len(), 2);
    }

    #[test]
    fn test_find_alternatives_none_better() {
        let lookup = CannedLookup::new(vec![json!({ "code": "9", "nutriscore_grade": "e" })]);
        assert!(find_alternatives(&lookup, &spread()).is_empty());
    }
}
