//! AI4Bharat xlit REST API backend
//!
//! Two endpoints are used:
//! - `POST {base}/transliterate` - batch request, one entry per word
//! - `GET {base}/tl/{lang}/{word}` - single word, used when the batch call fails
//!
//! Words the API cannot handle keep their original spelling.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use gu_xlit_core::{Error, Language, Result, TransliterationEngine};

use super::{http_client, network_error};
use crate::cache::WordCache;

/// xlit API configuration
#[derive(Debug, Clone)]
pub struct XlitApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Word cache entries; 0 disables the cache
    pub cache_size: usize,
}

impl Default for XlitApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://xlit-api.ai4bharat.org/".to_string(),
            timeout: Duration::from_secs(5),
            cache_size: 1000,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    input: Vec<BatchInput<'a>>,
    config: BatchConfig,
}

#[derive(Debug, Serialize)]
struct BatchInput<'a> {
    source: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchConfig {
    language: LanguagePair,
    is_sentence: bool,
    num_suggestions: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguagePair {
    source_language: &'static str,
    target_language: &'static str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    output: Vec<BatchOutput>,
}

#[derive(Debug, Deserialize)]
struct BatchOutput {
    source: String,
    #[serde(default)]
    target: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WordResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    error: Option<String>,
}

/// Remote transliteration through the AI4Bharat xlit API
pub struct XlitApiEngine {
    client: reqwest::Client,
    base_url: Url,
    cache: WordCache,
}

impl XlitApiEngine {
    pub fn new(config: XlitApiConfig) -> Result<Self> {
        // A base without a trailing slash would lose its last segment on join
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Configuration(format!("Invalid xlit API URL '{}': {}", base, e)))?;

        Ok(Self {
            client: http_client(config.timeout)?,
            base_url,
            cache: WordCache::new(config.cache_size),
        })
    }

    fn batch_url(&self) -> Result<Url> {
        self.base_url
            .join("transliterate")
            .map_err(|e| Error::Configuration(e.to_string()))
    }

    fn word_url(&self, word: &str, language: Language) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("xlit API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["tl", language.code(), word]);
        Ok(url)
    }

    async fn transliterate_batch(&self, words: &[&str], language: Language) -> Result<Vec<String>> {
        let request = BatchRequest {
            input: words.iter().map(|w| BatchInput { source: w }).collect(),
            config: BatchConfig {
                language: LanguagePair {
                    source_language: Language::English.code(),
                    target_language: language.code(),
                },
                is_sentence: false,
                num_suggestions: 1,
            },
        };

        let response = self
            .client
            .post(self.batch_url()?)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: BatchResponse = response.json().await.map_err(network_error)?;
        collect_batch(body, words.len())
    }

    async fn transliterate_word(&self, word: &str, language: Language) -> Result<String> {
        let response = self
            .client
            .get(self.word_url(word, language)?)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(format!("HTTP {}", status)));
        }

        let body: WordResponse = response.json().await.map_err(network_error)?;
        first_word_option(body, language)
    }

    async fn transliterate_word_by_word(
        &self,
        words: &[&str],
        language: Language,
    ) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(words.len());
        let mut failures = 0;
        let mut last_error = None;

        for word in words {
            if let Some(cached) = self.cache.get(word, language) {
                out.push(cached);
                continue;
            }

            match self.transliterate_word(word, language).await {
                Ok(native) => {
                    self.cache.insert(word, language, native.clone());
                    out.push(native);
                },
                Err(e) => {
                    tracing::warn!(word = %word, error = %e, "Failed to transliterate word");
                    out.push(word.to_string());
                    failures += 1;
                    last_error = Some(e);
                },
            }
        }

        // Every word failing means the service is down
        match last_error {
            Some(e) if failures == words.len() => Err(e),
            _ => Ok(out),
        }
    }
}

#[async_trait]
impl TransliterationEngine for XlitApiEngine {
    async fn translit_sentence(&self, text: &str, language: Language) -> Result<Vec<String>> {
        if !self.supports_language(language) {
            return Err(Error::UnsupportedLanguage(language));
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let native = match self.transliterate_batch(&words, language).await {
            Ok(native) => {
                for (word, out) in words.iter().zip(&native) {
                    self.cache.insert(word, language, out.clone());
                }
                native
            },
            Err(e) => {
                tracing::warn!(error = %e, "Batch API failed, trying word-by-word API");
                self.transliterate_word_by_word(&words, language).await?
            },
        };

        Ok(vec![native.join(" ")])
    }

    fn name(&self) -> &str {
        "xlit-api"
    }
}

/// Each output contributes its first target, or its source when there is none.
/// The response must carry exactly one output per requested word.
fn collect_batch(body: BatchResponse, expected: usize) -> Result<Vec<String>> {
    if body.output.len() != expected {
        return Err(Error::InvalidResponse(format!(
            "batch returned {} outputs for {} words",
            body.output.len(),
            expected
        )));
    }

    Ok(body
        .output
        .into_iter()
        .map(|output| output.target.into_iter().next().unwrap_or(output.source))
        .collect())
}

fn first_word_option(body: WordResponse, language: Language) -> Result<String> {
    if !body.success {
        return Err(Error::Api(
            body.error
                .unwrap_or_else(|| "xlit API reported failure".to_string()),
        ));
    }

    body.result
        .and_then(|mut result| result.remove(language.code()))
        .and_then(|options| options.into_iter().next())
        .ok_or_else(|| Error::InvalidResponse(format!("no {} options", language.code())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_shape() {
        let request = BatchRequest {
            input: vec![BatchInput { source: "kem" }, BatchInput { source: "cho" }],
            config: BatchConfig {
                language: LanguagePair {
                    source_language: "en",
                    target_language: "gu",
                },
                is_sentence: false,
                num_suggestions: 1,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"][1]["source"], "cho");
        assert_eq!(json["config"]["language"]["targetLanguage"], "gu");
        assert_eq!(json["config"]["isSentence"], false);
        assert_eq!(json["config"]["numSuggestions"], 1);
    }

    #[test]
    fn test_collect_batch_falls_back_to_source() {
        let body: BatchResponse = serde_json::from_str(
            r#"{"output":[
                {"source":"kem","target":["કેમ","કૅમ"]},
                {"source":"xyz","target":[]},
                {"source":"cho"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(collect_batch(body, 3).unwrap(), vec!["કેમ", "xyz", "cho"]);
    }

    #[test]
    fn test_collect_batch_rejects_count_mismatch() {
        let empty: BatchResponse = serde_json::from_str(r#"{"output":[]}"#).unwrap();
        assert!(matches!(
            collect_batch(empty, 2),
            Err(Error::InvalidResponse(_))
        ));

        let short: BatchResponse =
            serde_json::from_str(r#"{"output":[{"source":"kem","target":["કેમ"]}]}"#).unwrap();
        assert!(collect_batch(short, 3).is_err());
    }

    #[test]
    fn test_word_response() {
        let body: WordResponse =
            serde_json::from_str(r#"{"success":true,"result":{"gu":["નમસ્તે","નમસ્તે"]}}"#).unwrap();
        assert_eq!(first_word_option(body, Language::Gujarati).unwrap(), "નમસ્તે");

        let body: WordResponse =
            serde_json::from_str(r#"{"success":false,"error":"rate limited"}"#).unwrap();
        let err = first_word_option(body, Language::Gujarati).unwrap_err();
        assert!(err.to_string().contains("rate limited"));

        let body: WordResponse =
            serde_json::from_str(r#"{"success":true,"result":{"hi":["नमस्ते"]}}"#).unwrap();
        assert!(first_word_option(body, Language::Gujarati).is_err());
    }

    #[test]
    fn test_urls() {
        let engine = XlitApiEngine::new(XlitApiConfig {
            base_url: "https://xlit-api.ai4bharat.org".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            engine.batch_url().unwrap().as_str(),
            "https://xlit-api.ai4bharat.org/transliterate"
        );
        assert_eq!(
            engine.word_url("kem cho", Language::Gujarati).unwrap().as_str(),
            "https://xlit-api.ai4bharat.org/tl/gu/kem%20cho"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = XlitApiEngine::new(XlitApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
