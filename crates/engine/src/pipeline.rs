//! Input routing
//!
//! Text that is already Gujarati, or that is not romanized Gujarati at all,
//! is returned unchanged. Only Roman Gujarati reaches the adapter.

use serde::Serialize;
use std::sync::Arc;

use crate::adapter::{TransliterationOutcome, Transliterator};
use crate::detect::{contains_gujarati, RomanGujaratiDetector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Empty,
    GujaratiScript,
    RomanGujarati,
    Other,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::GujaratiScript => "gujarati_script",
            Self::RomanGujarati => "roman_gujarati",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// Result of routing one input
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedText {
    pub original: String,
    pub converted: String,
    pub detected: InputKind,
    /// Adapter outcome; present only for Roman Gujarati input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TransliterationOutcome>,
}

impl ProcessedText {
    fn unchanged(text: &str, detected: InputKind) -> Self {
        Self {
            original: text.to_string(),
            converted: text.to_string(),
            detected,
            outcome: None,
        }
    }
}

pub struct ConversionPipeline {
    xlit: Arc<Transliterator>,
    detector: RomanGujaratiDetector,
}

impl ConversionPipeline {
    pub fn new(xlit: Arc<Transliterator>) -> Self {
        Self::with_detector(xlit, RomanGujaratiDetector::default())
    }

    pub fn with_detector(xlit: Arc<Transliterator>, detector: RomanGujaratiDetector) -> Self {
        Self { xlit, detector }
    }

    /// Classify without transliterating
    pub fn classify(&self, text: &str) -> InputKind {
        if text.trim().is_empty() {
            InputKind::Empty
        } else if contains_gujarati(text) {
            InputKind::GujaratiScript
        } else if self.detector.is_roman_gujarati(text) {
            InputKind::RomanGujarati
        } else {
            InputKind::Other
        }
    }

    pub async fn process(&self, text: &str) -> ProcessedText {
        let detected = self.classify(text);
        tracing::debug!(kind = %detected, "Routing input");

        if detected != InputKind::RomanGujarati {
            return ProcessedText::unchanged(text, detected);
        }

        let outcome = self.xlit.transliterate_detailed(text).await;
        ProcessedText {
            original: text.to_string(),
            converted: outcome.text().to_string(),
            detected,
            outcome: Some(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gu_xlit_core::{Language, Result, TransliterationEngine};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEngine {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TransliterationEngine for CountingEngine {
        async fn translit_sentence(&self, _text: &str, _language: Language) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["નમસ્તે તમે કેમ છો".to_string()])
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn pipeline() -> (ConversionPipeline, Arc<CountingEngine>) {
        let engine = Arc::new(CountingEngine::default());
        let xlit = Transliterator::with_engine(engine.clone(), Language::Gujarati);
        (ConversionPipeline::new(Arc::new(xlit)), engine)
    }

    #[tokio::test]
    async fn test_roman_gujarati_is_transliterated() {
        let (pipeline, engine) = pipeline();
        let result = pipeline.process("namaste tame kem cho").await;

        assert_eq!(result.detected, InputKind::RomanGujarati);
        assert_eq!(result.converted, "નમસ્તે તમે કેમ છો");
        assert!(result.outcome.as_ref().is_some_and(|o| o.is_transliterated()));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_inputs_unchanged() {
        let (pipeline, engine) = pipeline();

        let gujarati = pipeline.process("કેમ છો").await;
        assert_eq!(gujarati.detected, InputKind::GujaratiScript);
        assert_eq!(gujarati.converted, "કેમ છો");

        let english = pipeline.process("hello world").await;
        assert_eq!(english.detected, InputKind::Other);
        assert_eq!(english.converted, "hello world");
        assert!(english.outcome.is_none());

        let empty = pipeline.process("   ").await;
        assert_eq!(empty.detected, InputKind::Empty);

        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_processed_text_json() {
        let result = ProcessedText::unchanged("hello", InputKind::Other);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["detected"], "other");
        assert!(json.get("outcome").is_none());
    }
}
