//! Subcommand handlers

use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use gu_xlit_config::Settings;
use gu_xlit_core::Script;
use gu_xlit_engine::{
    contains_gujarati, export_model, ConversionPipeline, RomanGujaratiDetector, SettingsLoader,
    Transliterator,
};

fn build_adapter(settings: &Settings) -> Arc<Transliterator> {
    let loader = SettingsLoader::new(settings.engine.clone());
    Arc::new(Transliterator::new(
        Arc::new(loader),
        settings.engine.language,
    ))
}

pub async fn transliterate(
    settings: &Settings,
    text: &str,
    detailed: bool,
    route: bool,
) -> anyhow::Result<()> {
    let xlit = build_adapter(settings);

    if route {
        let processed = ConversionPipeline::new(xlit).process(text).await;
        if detailed {
            println!("{}", serde_json::to_string_pretty(&processed)?);
        } else {
            println!("{}", processed.converted);
        }
        return Ok(());
    }

    let outcome = xlit.transliterate_detailed(text).await;
    if detailed {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.text());
    }
    Ok(())
}

pub async fn batch(settings: &Settings, file: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let xlit = build_adapter(settings);

    match file.filter(|p| p.as_os_str() != "-") {
        Some(path) => {
            let f = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            run_batch(&xlit, f, json).await
        },
        None => run_batch(&xlit, tokio::io::stdin(), json).await,
    }
}

async fn run_batch<R>(xlit: &Transliterator, input: R, json: bool) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut count = 0usize;
    let mut converted = 0usize;

    while let Some(line) = lines.next_line().await? {
        let outcome = xlit.transliterate_detailed(&line).await;
        count += 1;
        if outcome.is_transliterated() {
            converted += 1;
        }

        if json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!("{}", outcome.text());
        }
    }

    tracing::info!(lines = count, transliterated = converted, "Batch complete");
    Ok(())
}

pub fn detect(settings: &Settings, text: &str) -> anyhow::Result<()> {
    let detector = RomanGujaratiDetector::new();
    // Classification never touches the engine, so nothing is loaded here
    let pipeline = ConversionPipeline::with_detector(build_adapter(settings), detector.clone());
    let report = json!({
        "text": text,
        "script": Script::detect(text),
        "contains_gujarati": contains_gujarati(text),
        "roman_gujarati": detector.is_roman_gujarati(text),
        "kind": pipeline.classify(text),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn export(settings: &Settings) -> anyhow::Result<()> {
    let export = settings.export.clone();
    let engine = settings.engine.clone();

    let report = tokio::task::spawn_blocking(move || export_model(&export, &engine))
        .await
        .context("export task failed")??;

    println!(
        "Exported {} tensors to {} (example input {:?})",
        report.tensors,
        report.output.display(),
        report.example_shape
    );
    Ok(())
}
