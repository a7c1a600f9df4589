//! Ordered chain of engines
//!
//! Each engine is tried in turn. A result is accepted as soon as it contains
//! native script; the last engine's successful result is accepted as is so that
//! a chain always ends with the best effort available.

use async_trait::async_trait;
use std::sync::Arc;

use gu_xlit_core::{contains_script, Error, Language, Result, TransliterationEngine};

pub struct FallbackEngine {
    engines: Vec<Arc<dyn TransliterationEngine>>,
    name: String,
}

impl FallbackEngine {
    pub fn new(engines: Vec<Arc<dyn TransliterationEngine>>) -> Self {
        let name = format!(
            "fallback({})",
            engines
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join("→")
        );
        Self { engines, name }
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[async_trait]
impl TransliterationEngine for FallbackEngine {
    async fn translit_sentence(&self, text: &str, language: Language) -> Result<Vec<String>> {
        let script = language.script();
        let mut last_error = None;

        for (i, engine) in self.engines.iter().enumerate() {
            let is_last = i + 1 == self.engines.len();

            if !engine.supports_language(language) {
                last_error = Some(Error::UnsupportedLanguage(language));
                continue;
            }

            match engine.translit_sentence(text, language).await {
                Ok(parts) if is_last || parts.iter().any(|p| contains_script(p, script)) => {
                    tracing::debug!(engine = engine.name(), "Transliteration accepted");
                    return Ok(parts);
                },
                Ok(_) => {
                    tracing::debug!(
                        engine = engine.name(),
                        "Result has no native script, trying next engine"
                    );
                },
                Err(e) => {
                    tracing::warn!(
                        engine = engine.name(),
                        error = %e,
                        transient = e.is_transient(),
                        "Engine failed, trying next"
                    );
                    last_error = Some(e);
                },
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Unavailable("no engines in chain".to_string())))
    }

    fn supports_language(&self, language: Language) -> bool {
        self.engines.iter().any(|e| e.supports_language(language))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
