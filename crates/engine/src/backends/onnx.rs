//! Local IndicXlit model through ONNX Runtime
//!
//! IndicXlit is AI4Bharat's character-level transformer for Roman → Indic
//! transliteration. The exported model directory for a language holds:
//! - `encoder.onnx` - `input_ids [1, src_len]` → `last_hidden_state [1, src_len, dim]`
//! - `decoder.onnx` - `input_ids [1, tgt_len]`, `encoder_hidden_states` → `logits [1, tgt_len, vocab]`
//! - `dict.en.txt`, `dict.<lang>.txt` - fairseq character dictionaries
//!
//! Words are decoded independently with greedy search. Decoding starts from
//! `</s>`, following fairseq's shifted target convention.

use async_trait::async_trait;
use std::path::PathBuf;

use gu_xlit_config::EngineSettings;
use gu_xlit_core::{Error, Language, Result, TransliterationEngine};

use crate::cache::WordCache;

/// IndicXlit ONNX configuration
#[derive(Debug, Clone)]
pub struct OnnxXlitConfig {
    /// Language-specific model directory
    pub model_dir: PathBuf,
    /// Maximum decoded characters per word
    pub max_decode_len: usize,
    /// Number of inference threads
    pub num_threads: usize,
    /// Maximum cache entries; 0 disables the cache
    pub cache_size: usize,
}

impl Default for OnnxXlitConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/xlit/gu"),
            max_decode_len: 64,
            num_threads: 1,
            cache_size: 1000,
        }
    }
}

impl OnnxXlitConfig {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            model_dir: settings.language_model_dir(),
            max_decode_len: settings.max_decode_len,
            num_threads: settings.num_threads,
            ..Default::default()
        }
    }

    fn encoder_path(&self) -> PathBuf {
        self.model_dir.join("encoder.onnx")
    }

    fn decoder_path(&self) -> PathBuf {
        self.model_dir.join("decoder.onnx")
    }

    fn source_dict_path(&self) -> PathBuf {
        self.model_dir.join("dict.en.txt")
    }

    fn target_dict_path(&self, language: Language) -> PathBuf {
        self.model_dir.join(format!("dict.{}.txt", language.code()))
    }
}

/// Transliterate word by word, reusing cached words, and join with single spaces
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
fn translit_words<F>(
    text: &str,
    language: Language,
    cache: &WordCache,
    mut word_fn: F,
) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        if let Some(cached) = cache.get(word, language) {
            tracing::trace!(word = %word, "Word cache hit");
            out.push(cached);
            continue;
        }
        let native = word_fn(word)?;
        cache.insert(word, language, native.clone());
        out.push(native);
    }

    if out.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![out.join(" ")])
}

/// Run CPU-bound inference off the async scheduler
///
/// On a multi-thread runtime the worker's other tasks move to a fresh thread
/// while `f` runs. A current-thread runtime cannot hand off, so `f` runs inline.
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};

    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        },
        _ => f(),
    }
}

// ============================================================================
// ONNX Implementation (feature-gated)
// ============================================================================

#[cfg(feature = "onnx")]
mod onnx_impl {
    use super::*;
    use crate::backends::vocab::Dictionary;
    use ort::{session::builder::GraphOptimizationLevel, session::Session, value::Tensor};
    use parking_lot::Mutex;

    /// IndicXlit ONNX-based engine
    pub struct OnnxXlitEngine {
        encoder: Mutex<Session>,
        decoder: Mutex<Session>,
        source_dict: Dictionary,
        target_dict: Dictionary,
        language: Language,
        config: OnnxXlitConfig,
        cache: WordCache,
    }

    fn load_session(path: &std::path::Path, threads: usize) -> Result<Session> {
        Session::builder()
            .map_err(|e| Error::Model(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Model(e.to_string()))?
            .with_intra_threads(threads)
            .map_err(|e| Error::Model(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| Error::Model(format!("Failed to load {}: {}", path.display(), e)))
    }

    impl OnnxXlitEngine {
        pub fn new(config: OnnxXlitConfig, language: Language) -> Result<Self> {
            if language == Language::English {
                return Err(Error::UnsupportedLanguage(language));
            }

            let encoder = load_session(&config.encoder_path(), config.num_threads)?;
            let decoder = load_session(&config.decoder_path(), config.num_threads)?;
            let source_dict = Dictionary::load(&config.source_dict_path())?;
            let target_dict = Dictionary::load(&config.target_dict_path(language))?;

            tracing::info!(
                model_dir = %config.model_dir.display(),
                source_vocab = source_dict.len(),
                target_vocab = target_dict.len(),
                "Loaded IndicXlit ONNX model"
            );

            Ok(Self {
                encoder: Mutex::new(encoder),
                decoder: Mutex::new(decoder),
                source_dict,
                target_dict,
                language,
                cache: WordCache::new(config.cache_size),
                config,
            })
        }

        fn translit_word(&self, word: &str) -> Result<String> {
            let input_ids = self.source_dict.encode_word(word, self.language);
            let src_len = input_ids.len();
            let input_array = ndarray::Array2::from_shape_vec((1, src_len), input_ids)
                .map_err(|e| Error::Model(format!("Array creation failed: {}", e)))?;
            let input_tensor = Tensor::from_array(input_array)
                .map_err(|e| Error::Model(format!("Tensor creation failed: {}", e)))?;

            let encoder_hidden = {
                let mut encoder = self.encoder.lock();
                let outputs = encoder
                    .run(ort::inputs![
                        "input_ids" => input_tensor,
                    ])
                    .map_err(|e| Error::Model(format!("Encoder inference failed: {}", e)))?;

                let (shape, data) = outputs
                    .get("last_hidden_state")
                    .ok_or_else(|| Error::Model("Missing encoder output".to_string()))?
                    .try_extract_tensor::<f32>()
                    .map_err(|e| Error::Model(format!("Failed to extract encoder output: {}", e)))?;

                let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
                if dims.len() != 3 {
                    return Err(Error::Model(format!("Unexpected encoder shape: {:?}", dims)));
                }
                ndarray::Array3::from_shape_vec((dims[0], dims[1], dims[2]), data.to_vec())
                    .map_err(|e| Error::Model(format!("Encoder array creation failed: {}", e)))?
            };

            let eos = self.target_dict.eos();
            let mut output_ids = vec![eos];
            let max_len = self.config.max_decode_len.min(src_len * 4 + 8);

            let mut decoder = self.decoder.lock();
            for _ in 0..max_len {
                let decoder_input =
                    ndarray::Array2::from_shape_vec((1, output_ids.len()), output_ids.clone())
                        .map_err(|e| Error::Model(format!("Decoder input creation failed: {}", e)))?;

                let decoder_input_tensor = Tensor::from_array(decoder_input)
                    .map_err(|e| Error::Model(format!("Tensor creation failed: {}", e)))?;
                let encoder_hidden_tensor = Tensor::from_array(encoder_hidden.clone())
                    .map_err(|e| Error::Model(format!("Tensor creation failed: {}", e)))?;

                let outputs = decoder
                    .run(ort::inputs![
                        "input_ids" => decoder_input_tensor,
                        "encoder_hidden_states" => encoder_hidden_tensor,
                    ])
                    .map_err(|e| Error::Model(format!("Decoder inference failed: {}", e)))?;

                let (shape, logits) = outputs
                    .get("logits")
                    .ok_or_else(|| Error::Model("Missing decoder logits".to_string()))?
                    .try_extract_tensor::<f32>()
                    .map_err(|e| Error::Model(format!("Failed to extract logits: {}", e)))?;

                // Logits shape is [batch=1, tgt_len, vocab]; argmax of the last position
                let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
                let next = if dims.len() == 3 && dims[1] > 0 {
                    let vocab = dims[2];
                    let start = (dims[1] - 1) * vocab;
                    let end = (start + vocab).min(logits.len());
                    logits[start..end]
                        .iter()
                        .enumerate()
                        .max_by(|(_, a), (_, b)| a.total_cmp(b))
                        .map(|(idx, _)| idx as i64)
                        .unwrap_or(eos)
                } else {
                    eos
                };

                if next == eos {
                    break;
                }
                output_ids.push(next);
            }

            Ok(self.target_dict.decode(&output_ids))
        }
    }

    #[async_trait]
    impl TransliterationEngine for OnnxXlitEngine {
        async fn translit_sentence(&self, text: &str, language: Language) -> Result<Vec<String>> {
            if language != self.language {
                return Err(Error::UnsupportedLanguage(language));
            }
            run_blocking(|| {
                translit_words(text, language, &self.cache, |word| self.translit_word(word))
            })
        }

        fn supports_language(&self, language: Language) -> bool {
            language == self.language
        }

        fn name(&self) -> &str {
            "indicxlit-onnx"
        }
    }
}

// ============================================================================
// Stub Implementation (when ONNX feature is disabled)
// ============================================================================

#[cfg(not(feature = "onnx"))]
mod stub_impl {
    use super::*;

    /// Stub IndicXlit engine (ONNX feature not enabled)
    ///
    /// Construction always fails so that chains skip straight to the next backend.
    pub struct OnnxXlitEngine {
        _private: (),
    }

    impl OnnxXlitEngine {
        pub fn new(config: OnnxXlitConfig, _language: Language) -> Result<Self> {
            tracing::debug!(
                model_dir = %config.model_dir.display(),
                "IndicXlit ONNX feature not enabled"
            );
            Err(Error::Unavailable("onnx feature not enabled".to_string()))
        }
    }

    #[async_trait]
    impl TransliterationEngine for OnnxXlitEngine {
        async fn translit_sentence(&self, _text: &str, _language: Language) -> Result<Vec<String>> {
            Err(Error::Unavailable("onnx feature not enabled".to_string()))
        }

        fn name(&self) -> &str {
            "indicxlit-stub"
        }
    }
}

#[cfg(feature = "onnx")]
pub use onnx_impl::OnnxXlitEngine;

#[cfg(not(feature = "onnx"))]
pub use stub_impl::OnnxXlitEngine;
