//! Inference adapter
//!
//! `Transliterator` owns an injected [`EngineLoader`] and constructs the
//! engine on first use. Construction runs at most once even under concurrent
//! first calls; a failed construction is remembered and never retried.
//!
//! No call ever fails outward. Every failure mode collapses into echoing the
//! trimmed input, and [`TransliterationOutcome`] records which path ran.

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::OnceCell;

use gu_xlit_core::{EngineLoader, Language, TransliterationEngine};

/// Why the input was returned unchanged while an engine was available
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassThroughReason {
    /// Input was empty after trimming; the engine was not consulted
    EmptyInput,
    /// The engine raised for this call
    EngineError(String),
    /// The engine returned an empty suggestion list
    NoSuggestions,
}

/// Result of a single adapter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransliterationOutcome {
    Transliterated { text: String, engine: String },
    PassedThrough { text: String, reason: PassThroughReason },
    /// Engine construction failed; permanent for this adapter
    Unavailable { text: String, reason: String },
}

impl TransliterationOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Transliterated { text, .. }
            | Self::PassedThrough { text, .. }
            | Self::Unavailable { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Transliterated { text, .. }
            | Self::PassedThrough { text, .. }
            | Self::Unavailable { text, .. } => text,
        }
    }

    pub fn is_transliterated(&self) -> bool {
        matches!(self, Self::Transliterated { .. })
    }
}

/// Engine lifecycle as seen by the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum EngineStatus {
    NotInitialized,
    Ready(String),
    Unavailable(String),
}

enum EngineSlot {
    Ready(Arc<dyn TransliterationEngine>),
    Failed(String),
}

/// Never-failing transliteration front
pub struct Transliterator {
    loader: Arc<dyn EngineLoader>,
    language: Language,
    engine: OnceCell<EngineSlot>,
}

impl Transliterator {
    /// Create an adapter that loads its engine on first use
    pub fn new(loader: Arc<dyn EngineLoader>, language: Language) -> Self {
        Self {
            loader,
            language,
            engine: OnceCell::new(),
        }
    }

    /// Create an adapter around an already constructed engine
    pub fn with_engine(engine: Arc<dyn TransliterationEngine>, language: Language) -> Self {
        Self {
            loader: Arc::new(Arc::clone(&engine)),
            language,
            engine: OnceCell::new_with(Some(EngineSlot::Ready(engine))),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Current engine state without triggering construction
    pub fn status(&self) -> EngineStatus {
        match self.engine.get() {
            None => EngineStatus::NotInitialized,
            Some(EngineSlot::Ready(engine)) => EngineStatus::Ready(engine.name().to_string()),
            Some(EngineSlot::Failed(reason)) => EngineStatus::Unavailable(reason.clone()),
        }
    }

    /// Construct the engine now instead of on the first call
    pub async fn warm_up(&self) -> EngineStatus {
        self.slot().await;
        self.status()
    }

    async fn slot(&self) -> &EngineSlot {
        self.engine
            .get_or_init(|| async move {
                let loader = self.loader.describe();
                tracing::debug!(loader = %loader, "Initializing transliteration engine");

                match AssertUnwindSafe(self.loader.load()).catch_unwind().await {
                    Ok(Ok(engine)) => {
                        if !engine.supports_language(self.language) {
                            let reason = format!(
                                "engine '{}' does not support {}",
                                engine.name(),
                                self.language
                            );
                            tracing::error!(reason = %reason, "Transliteration engine unusable");
                            return EngineSlot::Failed(reason);
                        }
                        tracing::info!(
                            engine = %engine.name(),
                            language = %self.language,
                            "Transliteration engine ready"
                        );
                        EngineSlot::Ready(engine)
                    },
                    Ok(Err(e)) => {
                        tracing::error!(
                            loader = %loader,
                            error = %e,
                            "Failed to initialize transliteration engine, passing input through"
                        );
                        EngineSlot::Failed(e.to_string())
                    },
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        tracing::error!(
                            loader = %loader,
                            panic = %reason,
                            "Transliteration engine construction panicked"
                        );
                        EngineSlot::Failed(reason)
                    },
                }
            })
            .await
    }

    /// Transliterate and report which path executed
    pub async fn transliterate_detailed(&self, text: &str) -> TransliterationOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return TransliterationOutcome::PassedThrough {
                text: trimmed.to_string(),
                reason: PassThroughReason::EmptyInput,
            };
        }

        let engine = match self.slot().await {
            EngineSlot::Ready(engine) => engine,
            EngineSlot::Failed(reason) => {
                return TransliterationOutcome::Unavailable {
                    text: trimmed.to_string(),
                    reason: reason.clone(),
                };
            },
        };

        let call = engine.translit_sentence(trimmed, self.language);
        let reason = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(suggestions)) => match collapse(suggestions) {
                Some(text) => {
                    tracing::trace!(engine = %engine.name(), "Transliterated");
                    return TransliterationOutcome::Transliterated {
                        text,
                        engine: engine.name().to_string(),
                    };
                },
                None => PassThroughReason::NoSuggestions,
            },
            Ok(Err(e)) => {
                tracing::warn!(
                    engine = %engine.name(),
                    error = %e,
                    "Transliteration failed, returning original text"
                );
                PassThroughReason::EngineError(e.to_string())
            },
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(
                    engine = %engine.name(),
                    panic = %message,
                    "Transliteration panicked, returning original text"
                );
                PassThroughReason::EngineError(message)
            },
        };

        TransliterationOutcome::PassedThrough {
            text: trimmed.to_string(),
            reason,
        }
    }

    /// Transliterate a sentence; returns the trimmed input on any failure
    pub async fn transliterate(&self, text: &str) -> String {
        self.transliterate_detailed(text).await.into_text()
    }

    /// Same contract as [`Self::transliterate`]; reserved for batched requests
    pub async fn batch_transliterate(&self, text: &str) -> String {
        self.transliterate(text).await
    }
}

/// One suggestion is returned as is, several are joined by single spaces
fn collapse(suggestions: Vec<String>) -> Option<String> {
    match suggestions.len() {
        0 => None,
        1 => suggestions.into_iter().next(),
        _ => Some(suggestions.join(" ")),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "engine panicked".to_string()
    }
}
