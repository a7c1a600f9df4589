//! Core traits for the transliteration system
//!
//! ```text
//! EngineLoader ──load()──▶ Arc<dyn TransliterationEngine>
//!                               │
//!                               └─ translit_sentence(text, lang) → Vec<String>
//! ```
//!
//! Backends (local model, remote APIs, fallback chains) implement
//! `TransliterationEngine`; the adapter only ever sees the trait object.

mod transliteration;

pub use transliteration::{EngineLoader, TransliterationEngine};
