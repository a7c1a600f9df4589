//! gu-xlit command-line entry point
//!
//! Examples:
//!   gu-xlit transliterate namaste tame kem cho
//!   gu-xlit transliterate --detailed "maru naam"
//!   gu-xlit batch requests.txt
//!   gu-xlit detect "tame kem cho"
//!   gu-xlit export --checkpoint models/xlit/gu/model.pt

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use gu_xlit_config::{load_settings, load_settings_from, EngineProvider, Settings};
use gu_xlit_core::Language;

mod commands;

/// Romanized Gujarati → Gujarati script transliteration
#[derive(Parser)]
#[command(
    name = "gu-xlit",
    version = env!("CARGO_PKG_VERSION"),
    arg_required_else_help = true,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to config/default.toml plus config/$GU_XLIT_ENV.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the engine provider
    #[arg(long, global = true, value_name = "PROVIDER")]
    provider: Option<EngineProvider>,

    /// Override the target language
    #[arg(long, global = true, value_name = "CODE")]
    language: Option<Language>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transliterate one sentence
    #[command(alias = "t")]
    Transliterate {
        /// Words of the sentence; joined with single spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the full outcome as JSON
        #[arg(long)]
        detailed: bool,

        /// Only transliterate input detected as Roman Gujarati
        #[arg(long)]
        route: bool,
    },

    /// Transliterate one request per line from a file or stdin
    Batch {
        /// Input file; stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Emit one JSON outcome per line
        #[arg(long)]
        json: bool,
    },

    /// Report script and Roman Gujarati detection for text
    Detect {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Convert the model checkpoint to a safetensors artifact
    Export {
        /// PyTorch checkpoint to read
        #[arg(long, value_name = "PATH")]
        checkpoint: Option<PathBuf>,

        /// Artifact to write
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Print the effective settings as TOML
    #[command(name = "show-config")]
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = resolve_settings(&cli)?;
    if let Some(provider) = cli.provider {
        settings.engine.provider = provider;
    }
    if let Some(language) = cli.language {
        settings.engine.language = language;
    }
    if cli.verbose {
        settings.observability.log_level = "debug".to_string();
    }
    settings.validate()?;

    init_tracing(&settings);
    tracing::debug!(
        environment = ?settings.environment,
        provider = ?settings.engine.provider,
        language = %settings.engine.language,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Transliterate {
            text,
            detailed,
            route,
        } => commands::transliterate(&settings, &text.join(" "), detailed, route).await,
        Commands::Batch { file, json } => commands::batch(&settings, file, json).await,
        Commands::Detect { text } => commands::detect(&settings, &text.join(" ")),
        Commands::Export { checkpoint, output } => {
            if checkpoint.is_some() {
                settings.export.checkpoint = checkpoint;
            }
            if let Some(output) = output {
                settings.export.output_path = output;
            }
            commands::export(&settings).await
        },
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        },
    }
}

/// An explicit `--config` must load; the default lookup falls back to defaults
fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    if let Some(path) = &cli.config {
        return Ok(load_settings_from(path)?);
    }

    let env = std::env::var("GU_XLIT_ENV").ok();
    match load_settings(env.as_deref()) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Ok(Settings::default())
        },
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("gu_xlit={}", level).into()
    });

    // stdout carries results; logs go to stderr
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
