//! Google Input Tools backend
//!
//! Endpoint: `POST https://inputtools.google.com/request?itc=gu-t-i0-und&num=1&cp=0&cs=1&ie=utf-8&oe=utf-8`
//! with form body `text=<query>`.
//!
//! Response sample:
//! ```text
//! ["SUCCESS",[["kem cho",["કેમ છો"],[],{"candidate_type":[0]}]]]
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use gu_xlit_core::{Error, Language, Result, TransliterationEngine};

use super::{http_client, network_error};

/// Input Tools configuration
#[derive(Debug, Clone)]
pub struct InputToolsConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for InputToolsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://inputtools.google.com/request".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Remote transliteration through Google Input Tools
pub struct InputToolsEngine {
    client: reqwest::Client,
    config: InputToolsConfig,
}

impl InputToolsEngine {
    pub fn new(config: InputToolsConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl TransliterationEngine for InputToolsEngine {
    async fn translit_sentence(&self, text: &str, language: Language) -> Result<Vec<String>> {
        let itc = language
            .input_tools_code()
            .ok_or(Error::UnsupportedLanguage(language))?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[
                ("itc", itc.as_str()),
                ("num", "1"),
                ("cp", "0"),
                ("cs", "1"),
                ("ie", "utf-8"),
                ("oe", "utf-8"),
            ])
            .form(&[("text", text)])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Input Tools HTTP error");
            return Err(Error::Api(format!("HTTP {}", status)));
        }

        let raw = response.text().await.map_err(network_error)?;
        parse_response(&raw).map(|best| vec![best])
    }

    fn name(&self) -> &str {
        "input-tools"
    }
}

/// Extract the best candidate from an Input Tools response body
///
/// Structure: `[status, [[original, [candidates...], ...], ...]]`
fn parse_response(raw: &str) -> Result<String> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| Error::InvalidResponse(format!("Input Tools JSON: {}", e)))?;

    let root = root
        .as_array()
        .filter(|items| items.len() >= 2)
        .ok_or_else(|| Error::InvalidResponse("expected [status, data]".to_string()))?;

    let status = root[0].as_str().unwrap_or_default();
    if status != "SUCCESS" {
        return Err(Error::Api(format!("Input Tools status '{}'", status)));
    }

    root[1]
        .as_array()
        .and_then(|data| data.first())
        .and_then(Value::as_array)
        .and_then(|entry| entry.get(1))
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidResponse("no candidates".to_string()))
}
