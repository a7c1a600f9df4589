//! Transliteration traits

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Language, Result};

/// A loaded transliteration model or service
///
/// Implementations:
/// - `OnnxXlitEngine` - exported IndicXlit model via ONNX Runtime
/// - `InputToolsEngine` - Google Input Tools endpoint
/// - `XlitApiEngine` - AI4Bharat xlit REST API
/// - `FallbackEngine` - ordered chain of the above
///
/// # Example
///
/// ```ignore
/// let engine: Arc<dyn TransliterationEngine> = loader.load().await?;
/// let suggestions = engine.translit_sentence("kem cho", Language::Gujarati).await?;
/// // ["કેમ છો"]
/// ```
#[async_trait]
pub trait TransliterationEngine: Send + Sync + 'static {
    /// Transliterate a romanized sentence into the native script of `language`
    ///
    /// Returns the engine's suggestion list. An empty list means the engine
    /// had nothing to offer, not an error.
    async fn translit_sentence(&self, text: &str, language: Language) -> Result<Vec<String>>;

    /// Check if the engine can produce `language`
    fn supports_language(&self, language: Language) -> bool {
        language != Language::English
    }

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Constructs an engine on demand
///
/// The adapter calls `load` at most once; a failure is final for the
/// adapter's lifetime.
#[async_trait]
pub trait EngineLoader: Send + Sync + 'static {
    async fn load(&self) -> Result<Arc<dyn TransliterationEngine>>;

    /// Loader description for logging
    fn describe(&self) -> String {
        "engine-loader".to_string()
    }
}

/// Any shared engine can act as a loader that hands out itself
#[async_trait]
impl EngineLoader for Arc<dyn TransliterationEngine> {
    async fn load(&self) -> Result<Arc<dyn TransliterationEngine>> {
        Ok(Arc::clone(self))
    }

    fn describe(&self) -> String {
        format!("preloaded:{}", self.name())
    }
}
