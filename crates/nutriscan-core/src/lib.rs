//! # NutriScan Core
//!
//! Pure logic for NutriScan: product normalization, Nutri-Score ordinals,
//! comparison helpers, provider resolution, prompt construction, and the
//! conversational assistant.
//!
//! This crate performs no I/O. Upstream product lookup and text generation
//! are consumed through the [`lookup::ProductLookup`] and
//! [`generation::TextGeneration`] traits; HTTP implementations live in the
//! `nutriscan` app crate.

pub mod assistant;
pub mod comparison;
pub mod generation;
pub mod grade;
pub mod lookup;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod provider;
