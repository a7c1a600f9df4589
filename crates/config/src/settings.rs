//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use gu_xlit_core::Language;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - missing model files are warnings only
    #[default]
    Development,
    /// Production mode - configured model files must exist
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Transliteration engine configuration
    #[serde(default)]
    pub engine: EngineSettings,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Model export configuration
    #[serde(default)]
    pub export: ExportSettings,
}

/// Transliteration backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineProvider {
    /// Exported IndicXlit model run through ONNX Runtime
    Onnx,
    /// AI4Bharat xlit REST API
    #[serde(alias = "ai4bharat")]
    XlitApi,
    /// Google Input Tools endpoint
    #[serde(alias = "google")]
    InputTools,
    /// Ordered chain from `engine.chain`
    #[default]
    Chain,
    /// No engine; every call passes input through
    Disabled,
}

impl std::str::FromStr for EngineProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onnx" => Ok(Self::Onnx),
            "xlit_api" | "xlit-api" | "ai4bharat" => Ok(Self::XlitApi),
            "input_tools" | "input-tools" | "google" => Ok(Self::InputTools),
            "chain" => Ok(Self::Chain),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(ConfigError::InvalidValue {
                field: "engine.provider".to_string(),
                message: format!("unknown provider '{}'", other),
            }),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Which backend to construct
    #[serde(default)]
    pub provider: EngineProvider,

    /// Target language, fixed for the lifetime of an adapter
    #[serde(default)]
    pub language: Language,

    /// Backends tried in order when `provider = "chain"`
    #[serde(default = "default_chain")]
    pub chain: Vec<EngineProvider>,

    /// Directory holding `<lang>/encoder.onnx`, `<lang>/decoder.onnx` and dictionaries
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Maximum decoded characters per word
    #[serde(default = "default_max_decode_len")]
    pub max_decode_len: usize,

    /// ONNX Runtime intra-op threads
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,

    #[serde(default = "default_input_tools_endpoint")]
    pub input_tools_endpoint: String,

    #[serde(default = "default_xlit_api_base_url")]
    pub xlit_api_base_url: String,

    /// HTTP connect and read timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_chain() -> Vec<EngineProvider> {
    vec![EngineProvider::Onnx, EngineProvider::XlitApi]
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models/xlit")
}

fn default_max_decode_len() -> usize {
    64
}

fn default_num_threads() -> usize {
    1
}

fn default_input_tools_endpoint() -> String {
    "https://inputtools.google.com/request".to_string()
}

fn default_xlit_api_base_url() -> String {
    "https://xlit-api.ai4bharat.org/".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            provider: EngineProvider::default(),
            language: Language::Gujarati,
            chain: default_chain(),
            model_dir: default_model_dir(),
            max_decode_len: default_max_decode_len(),
            num_threads: default_num_threads(),
            input_tools_endpoint: default_input_tools_endpoint(),
            xlit_api_base_url: default_xlit_api_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl EngineSettings {
    /// Model files for the configured language
    pub fn language_model_dir(&self) -> PathBuf {
        self.model_dir.join(self.language.code())
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Model export configuration
///
/// `example_shape` mirrors the input used when the model was first traced.
/// It is a guess at the tokenizer's layout, not a verified contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// PyTorch checkpoint; defaults to `<model_dir>/<lang>/model.pt`
    #[serde(default)]
    pub checkpoint: Option<PathBuf>,

    /// Key of the state dict inside the checkpoint
    #[serde(default = "default_state_dict_key")]
    pub state_dict_key: Option<String>,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_example_shape")]
    pub example_shape: Vec<usize>,

    /// Exclusive upper bound of the random example token ids
    #[serde(default = "default_example_max_id")]
    pub example_max_id: u32,

    /// Tensor used for the trace check
    #[serde(default = "default_embedding_tensor")]
    pub embedding_tensor: String,
}

fn default_state_dict_key() -> Option<String> {
    Some("model".to_string())
}

fn default_output_path() -> PathBuf {
    PathBuf::from("gu_model.safetensors")
}

fn default_example_shape() -> Vec<usize> {
    vec![1, 20]
}

fn default_example_max_id() -> u32 {
    100
}

fn default_embedding_tensor() -> String {
    "encoder.embed_tokens.weight".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            checkpoint: None,
            state_dict_key: default_state_dict_key(),
            output_path: default_output_path(),
            example_shape: default_example_shape(),
            example_max_id: default_example_max_id(),
            embedding_tensor: default_embedding_tensor(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_engine()?;
        self.validate_export()?;
        self.validate_model_dir()?;
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;

        if engine.language == Language::English {
            return Err(ConfigError::InvalidValue {
                field: "engine.language".to_string(),
                message: "target language must be an Indic language".to_string(),
            });
        }

        if engine.provider == EngineProvider::Chain {
            if engine.chain.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "engine.chain".to_string(),
                    message: "chain provider needs at least one backend".to_string(),
                });
            }
            if engine
                .chain
                .iter()
                .any(|p| matches!(p, EngineProvider::Chain | EngineProvider::Disabled))
            {
                return Err(ConfigError::InvalidValue {
                    field: "engine.chain".to_string(),
                    message: "chain entries must be concrete backends".to_string(),
                });
            }
        }

        if engine.timeout_ms == 0 || engine.timeout_ms > 60_000 {
            return Err(ConfigError::InvalidValue {
                field: "engine.timeout_ms".to_string(),
                message: format!("Must be between 1 and 60000, got {}", engine.timeout_ms),
            });
        }

        if engine.max_decode_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_decode_len".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_export(&self) -> Result<(), ConfigError> {
        let export = &self.export;

        if export.example_shape.is_empty() || export.example_shape.contains(&0) {
            return Err(ConfigError::InvalidValue {
                field: "export.example_shape".to_string(),
                message: format!("Dimensions must be non-zero, got {:?}", export.example_shape),
            });
        }

        if export.example_max_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "export.example_max_id".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Missing model files fail in production and warn otherwise
    fn validate_model_dir(&self) -> Result<(), ConfigError> {
        let uses_onnx = match self.engine.provider {
            EngineProvider::Onnx => true,
            EngineProvider::Chain => self.engine.chain.contains(&EngineProvider::Onnx),
            _ => false,
        };
        if !uses_onnx {
            return Ok(());
        }

        let dir = self.engine.language_model_dir();
        if dir.is_dir() {
            return Ok(());
        }

        if self.environment.is_production() {
            return Err(ConfigError::FileNotFound(dir.display().to_string()));
        }

        tracing::warn!(
            path = %dir.display(),
            "Model directory not found; the onnx backend will be unavailable"
        );
        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (GU_XLIT__ prefix)
/// 2. config/{env}.toml (if env specified)
/// 3. config/default.toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("GU_XLIT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

/// Load settings from an explicit file, still honouring environment overrides
pub fn load_settings_from(path: &std::path::Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config = Config::builder()
        .add_source(File::from(path))
        .add_source(
            Environment::with_prefix("GU_XLIT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.engine.provider, EngineProvider::Chain);
        assert_eq!(settings.engine.language, Language::Gujarati);
        assert_eq!(settings.engine.timeout_ms, 5000);
        assert_eq!(settings.export.example_shape, vec![1, 20]);
        assert_eq!(
            settings.export.output_path,
            PathBuf::from("gu_model.safetensors")
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_language_model_dir() {
        let settings = Settings::default();
        assert_eq!(
            settings.engine.language_model_dir(),
            PathBuf::from("models/xlit/gu")
        );
    }

    #[test]
    fn test_engine_validation() {
        let mut settings = Settings::default();
        settings.engine.language = Language::English;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.engine.chain.clear();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.engine.chain = vec![EngineProvider::XlitApi, EngineProvider::Chain];
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.engine.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_export_validation() {
        let mut settings = Settings::default();
        settings.export.example_shape = vec![1, 0];
        assert!(settings.validate().is_err());

        settings.export.example_shape = vec![2, 8];
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_production_requires_model_dir() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.engine.model_dir = PathBuf::from("/nonexistent/models");
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::FileNotFound(_))
        ));

        // Remote-only providers never touch the model directory
        settings.engine.provider = EngineProvider::XlitApi;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<EngineProvider>().unwrap(), EngineProvider::InputTools);
        assert_eq!("xlit-api".parse::<EngineProvider>().unwrap(), EngineProvider::XlitApi);
        assert!("magic".parse::<EngineProvider>().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[engine]
provider = "input_tools"
language = "gujarati"
timeout_ms = 2500

[observability]
log_json = true
"#
        )
        .unwrap();

        let settings = load_settings_from(file.path()).unwrap();
        assert_eq!(settings.engine.provider, EngineProvider::InputTools);
        assert_eq!(settings.engine.timeout_ms, 2500);
        assert!(settings.observability.log_json);
        // Untouched sections keep their defaults
        assert_eq!(settings.engine.max_decode_len, 64);
    }

    #[test]
    fn test_load_language_code() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[engine]
provider = "xlit_api"
language = "gu"
"#
        )
        .unwrap();

        let settings = load_settings_from(file.path()).unwrap();
        assert_eq!(settings.engine.language, Language::Gujarati);
        assert_eq!(settings.engine.provider, EngineProvider::XlitApi);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_settings_from(std::path::Path::new("/nonexistent/gu-xlit.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
