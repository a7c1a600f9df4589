//! Engine construction from settings

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use gu_xlit_config::{EngineProvider, EngineSettings};
use gu_xlit_core::{EngineLoader, Error, Result, TransliterationEngine};

use crate::backends::{
    FallbackEngine, InputToolsConfig, InputToolsEngine, OnnxXlitConfig, OnnxXlitEngine,
    XlitApiConfig, XlitApiEngine,
};

/// Build a single concrete backend
fn create_backend(
    provider: EngineProvider,
    settings: &EngineSettings,
) -> Result<Arc<dyn TransliterationEngine>> {
    let timeout = Duration::from_millis(settings.timeout_ms);

    match provider {
        EngineProvider::Onnx => {
            let config = OnnxXlitConfig::from_settings(settings);
            Ok(Arc::new(OnnxXlitEngine::new(config, settings.language)?))
        },
        EngineProvider::XlitApi => Ok(Arc::new(XlitApiEngine::new(XlitApiConfig {
            base_url: settings.xlit_api_base_url.clone(),
            timeout,
            ..Default::default()
        })?)),
        EngineProvider::InputTools => Ok(Arc::new(InputToolsEngine::new(InputToolsConfig {
            endpoint: settings.input_tools_endpoint.clone(),
            timeout,
        })?)),
        EngineProvider::Chain | EngineProvider::Disabled => Err(Error::Configuration(format!(
            "{:?} is not a concrete backend",
            provider
        ))),
    }
}

/// Create the engine described by `settings`
///
/// For a chain, backends that fail to build are skipped with a warning. The
/// chain fails only when none of them can be built.
pub fn create_engine(settings: &EngineSettings) -> Result<Arc<dyn TransliterationEngine>> {
    match settings.provider {
        EngineProvider::Disabled => Err(Error::Unavailable(
            "transliteration disabled by configuration".to_string(),
        )),
        EngineProvider::Chain => {
            let mut engines = Vec::with_capacity(settings.chain.len());
            let mut last_error = None;

            for &provider in &settings.chain {
                match create_backend(provider, settings) {
                    Ok(engine) => {
                        tracing::info!(engine = engine.name(), "Chain backend ready");
                        engines.push(engine);
                    },
                    Err(e) => {
                        tracing::warn!(
                            provider = ?provider,
                            error = %e,
                            "Failed to build chain backend, skipping"
                        );
                        last_error = Some(e);
                    },
                }
            }

            match engines.len() {
                0 => Err(Error::Unavailable(format!(
                    "no chain backend could be built{}",
                    last_error
                        .map(|e| format!(": {}", e))
                        .unwrap_or_default()
                ))),
                1 => Ok(engines.remove(0)),
                _ => Ok(Arc::new(FallbackEngine::new(engines))),
            }
        },
        provider => create_backend(provider, settings),
    }
}

/// Loader that builds the configured engine on first use
pub struct SettingsLoader {
    settings: EngineSettings,
}

impl SettingsLoader {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl EngineLoader for SettingsLoader {
    async fn load(&self) -> Result<Arc<dyn TransliterationEngine>> {
        // ONNX session creation reads model files synchronously
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || create_engine(&settings))
            .await
            .map_err(|e| Error::other(format!("engine construction task failed: {}", e)))?
    }

    fn describe(&self) -> String {
        format!("settings:{:?}", self.settings.provider).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gu_xlit_core::Language;

    #[test]
    fn test_disabled_fails() {
        let settings = EngineSettings {
            provider: EngineProvider::Disabled,
            ..Default::default()
        };
        assert!(matches!(create_engine(&settings), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_single_provider() {
        let settings = EngineSettings {
            provider: EngineProvider::InputTools,
            ..Default::default()
        };
        let engine = create_engine(&settings).unwrap();
        assert_eq!(engine.name(), "input-tools");
    }

    #[test]
    fn test_chain_skips_unbuildable_backends() {
        // No model directory, so the local backend cannot be built
        let settings = EngineSettings {
            provider: EngineProvider::Chain,
            chain: vec![EngineProvider::Onnx, EngineProvider::InputTools],
            model_dir: "/nonexistent/models".into(),
            ..Default::default()
        };
        let engine = create_engine(&settings).unwrap();
        assert_eq!(engine.name(), "input-tools");
    }

    #[test]
    fn test_chain_of_remote_backends() {
        let settings = EngineSettings {
            provider: EngineProvider::Chain,
            chain: vec![EngineProvider::XlitApi, EngineProvider::InputTools],
            ..Default::default()
        };
        let engine = create_engine(&settings).unwrap();
        assert_eq!(engine.name(), "fallback(xlit-api→input-tools)");
    }

    #[test]
    fn test_chain_with_nothing_buildable() {
        let settings = EngineSettings {
            provider: EngineProvider::Chain,
            chain: vec![EngineProvider::Onnx],
            model_dir: "/nonexistent/models".into(),
            ..Default::default()
        };
        assert!(matches!(create_engine(&settings), Err(Error::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_settings_loader() {
        let loader = SettingsLoader::new(EngineSettings {
            provider: EngineProvider::XlitApi,
            language: Language::Gujarati,
            ..Default::default()
        });
        assert_eq!(loader.describe(), "settings:xlitapi");
        let engine = loader.load().await.unwrap();
        assert_eq!(engine.name(), "xlit-api");
    }
}
