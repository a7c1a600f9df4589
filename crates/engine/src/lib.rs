//! Gujarati transliteration adapter
//!
//! This crate provides:
//! - **Adapter**: `Transliterator`, a never-failing front over a lazily
//!   constructed engine that reports which path each call took
//! - **Backends**: local IndicXlit model (ONNX), AI4Bharat xlit API,
//!   Google Input Tools, and an ordered fallback chain
//! - **Detection**: script and Roman-Gujarati heuristics
//! - **Pipeline**: routes input by kind before transliterating
//! - **Bridge**: synchronous `transliterate` / `batch_transliterate` for host bindings
//! - **Export**: checkpoint conversion to a safetensors artifact
//!
//! # Example
//!
//! ```ignore
//! use gu_xlit_engine::{SettingsLoader, Transliterator};
//!
//! let loader = SettingsLoader::new(settings.engine.clone());
//! let xlit = Transliterator::new(Arc::new(loader), Language::Gujarati);
//!
//! let text = xlit.transliterate("  kem cho  ").await;
//! // "કેમ છો", or "kem cho" when no engine could be loaded
//! ```

pub mod adapter;
pub mod backends;
pub mod bridge;
pub mod detect;
#[cfg(feature = "export")]
pub mod export;
pub mod loader;
pub mod pipeline;

mod cache;

pub use adapter::{EngineStatus, PassThroughReason, TransliterationOutcome, Transliterator};
pub use backends::{
    FallbackEngine, InputToolsConfig, InputToolsEngine, OnnxXlitConfig, OnnxXlitEngine,
    XlitApiConfig, XlitApiEngine,
};
pub use detect::{contains_gujarati, RomanGujaratiDetector};
#[cfg(feature = "export")]
pub use export::{export_model, export_tensors, ExportError, ExportReport};
pub use loader::{create_engine, SettingsLoader};
pub use pipeline::{ConversionPipeline, InputKind, ProcessedText};
