//! Transliteration engine backends
//!
//! - `OnnxXlitEngine` - exported IndicXlit model (local, `onnx` feature)
//! - `XlitApiEngine` - AI4Bharat xlit REST API
//! - `InputToolsEngine` - Google Input Tools endpoint
//! - `FallbackEngine` - ordered chain accepting the first native-script result

mod fallback;
mod input_tools;
mod onnx;
mod vocab;
mod xlit_api;

pub use fallback::FallbackEngine;
pub use input_tools::{InputToolsConfig, InputToolsEngine};
pub use onnx::{OnnxXlitConfig, OnnxXlitEngine};
pub use vocab::Dictionary;
pub use xlit_api::{XlitApiConfig, XlitApiEngine};

use std::time::Duration;

use gu_xlit_core::{Error, Result};

/// HTTP client with connect and overall request timeouts
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {}", e)))
}

fn network_error(err: reqwest::Error) -> Error {
    if err.is_decode() {
        Error::InvalidResponse(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}
