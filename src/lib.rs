//! # NutriScan
//!
//! Look up packaged food on Open Food Facts, read its Nutri-Score, compare
//! products, and ask an AI nutrition assistant.
//!
//! The pure logic (normalization, grade scale, prompts, conversation state,
//! provider resolution) lives in [`nutriscan_core`]. This crate adds the
//! I/O around it: configuration, HTTP clients and the CLI commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ Open Food     │──▶│  normalize  │──▶│ NutritionAssistant│
//! │ Facts (HTTP)  │   │ ProductInfo │   │  chat / analyze   │
//! └───────────────┘   └─────────────┘   └────────┬─────────┘
//!                                                │
//!                                  ┌─────────────┼─────────────┐
//!                                  ▼             ▼             ▼
//!                               OpenAI        Gemini        Ollama
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`openfoodfacts`] | Product database client |
//! | [`backends`] | Text-generation backends |
//! | [`providers`] | Provider resolution and assistant construction |
//! | [`search`] | `search` command |
//! | [`compare`] | `compare` command |
//! | [`chat`] | `chat` command |
//! | [`inspect`] | `inspect` command |

pub mod backends;
pub mod chat;
pub mod compare;
pub mod config;
pub mod inspect;
pub mod logging;
pub mod openfoodfacts;
pub mod providers;
pub mod search;
