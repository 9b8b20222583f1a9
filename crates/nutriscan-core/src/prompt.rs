//! Deterministic prompt construction.
//!
//! The same inputs always produce the same prompt text; sampling randomness
//! lives entirely in the backend.

use crate::models::ProductInfo;

/// System instruction prepended to every chat dispatch.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a kind and pedagogical nutrition assistant. Answer clearly and cite \
     Nutri-Score and NOVA concepts when they help.";

/// Ingredients are cut to this many characters before going into a prompt.
pub const INGREDIENTS_PREFIX_CHARS: usize = 500;

/// At most this many alternatives are described to the model.
pub const MAX_ALTERNATIVES: usize = 3;

/// Prompt asking for a three-part analysis of one product.
pub fn analysis_prompt(product: &ProductInfo) -> String {
    let ingredients: String = product
        .ingredients_text
        .chars()
        .take(INGREDIENTS_PREFIX_CHARS)
        .collect();

    format!(
        "You are an expert nutritionist. Analyze this food product and give clear advice.\n\
         \n\
         Product: {name} ({brand})\n\
         Nutri-Score: {grade}\n\
         NOVA: {nova}\n\
         Ingredients: {ingredients}\n\
         \n\
         Answer in 3 parts:\n\
         1. Nutritional quality (2-3 sentences)\n\
         2. Points of attention (additives, allergens, ultra-processing)\n\
         3. Recommendation (consume occasionally / regularly / avoid)\n\
         \n\
         Stay concise and educational.",
        name = product.name,
        brand = product.brand,
        grade = product.quality_grade,
        nova = product.processing_group,
        ingredients = ingredients,
    )
}

/// Prompt asking why the first [`MAX_ALTERNATIVES`] candidates beat `current`.
pub fn alternatives_prompt(current: &ProductInfo, candidates: &[ProductInfo]) -> String {
    let listed = candidates
        .iter()
        .take(MAX_ALTERNATIVES)
        .map(|alt| format!("- {} (Nutri-Score: {})", alt.name, alt.quality_grade))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Current product: {name} (Nutri-Score {grade})\n\
         \n\
         Alternatives found:\n\
         {listed}\n\
         \n\
         Explain in 2-3 sentences why these alternatives are better and what sets them apart.",
        name = current.name,
        grade = current.quality_grade,
        listed = listed,
    )
}

/// Chat message asking which of the compared products is the best choice.
pub fn comparison_prompt(products: &[ProductInfo]) -> String {
    let listed = products
        .iter()
        .map(|p| {
            format!(
                "- {} (Nutri-Score {}, NOVA {})",
                p.name, p.quality_grade, p.processing_group
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Compare these products and say which one is the best nutritional choice:\n{}",
        listed
    )
}

/// Context line describing a product, suitable for [`chat`](crate::assistant::NutritionAssistant::chat).
pub fn product_context(product: &ProductInfo) -> String {
    format!(
        "Product: {} ({}, Nutri-Score {}, NOVA {})",
        product.name, product.brand, product.quality_grade, product.processing_group
    )
}

/// User-turn content for a chat message, optionally prefixed with context.
pub fn chat_user_content(message: &str, context: &str) -> String {
    if context.is_empty() {
        message.to_string()
    } else {
        format!("{}\n\nQuestion: {}", context, message)
    }
}
