//! Core traits and types for Gujarati transliteration
//!
//! This crate provides foundational types used across the other crates:
//! - The `TransliterationEngine` trait every backend implements
//! - The `EngineLoader` trait used to construct engines lazily
//! - Language and script definitions
//! - Error types

pub mod error;
pub mod language;
pub mod traits;

pub use error::{Error, Result};
pub use language::{contains_script, Language, Script};
pub use traits::{EngineLoader, TransliterationEngine};
