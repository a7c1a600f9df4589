//! Model export
//!
//! Converts the IndicXlit PyTorch checkpoint for the configured language into
//! a single safetensors artifact. Before writing, a random example input is
//! run through the source embedding table to check that the weights accept
//! inputs of the configured shape.

use candle_core::{DType, Device, Tensor};
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use gu_xlit_config::{EngineSettings, ExportSettings};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Checkpoint not found: {0}")]
    MissingCheckpoint(PathBuf),

    #[error("Tensor '{0}' not found in checkpoint")]
    MissingTensor(String),

    #[error("Example token {id} is outside the vocabulary of {vocab}")]
    TokenOutOfRange { id: u32, vocab: usize },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Serialization error: {0}")]
    Safetensors(#[from] safetensors::SafeTensorError),
}

/// Summary of a completed export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub output: PathBuf,
    pub tensors: usize,
    pub example_shape: Vec<usize>,
}

/// Checkpoint used when none is configured: `<model_dir>/<lang>/model.pt`
pub fn default_checkpoint(engine: &EngineSettings) -> PathBuf {
    engine.language_model_dir().join("model.pt")
}

/// Random token ids in `[0, max_id)` with the given shape
pub fn example_input(shape: &[usize], max_id: u32) -> Result<Tensor, ExportError> {
    if shape.is_empty() || shape.contains(&0) {
        return Err(ExportError::InvalidShape(format!("{:?}", shape)));
    }
    if max_id == 0 {
        return Err(ExportError::InvalidShape("example_max_id must be > 0".to_string()));
    }

    let len = shape.iter().product();
    let mut rng = rand::thread_rng();
    let ids: Vec<u32> = (0..len).map(|_| rng.gen_range(0..max_id)).collect();
    Ok(Tensor::from_vec(ids, shape.to_vec(), &Device::Cpu)?)
}

/// Look up every example id in `embedding` (`[vocab, dim]`)
///
/// Returns the embedded example, shaped `[..example_shape, dim]`.
pub fn trace_embedding(embedding: &Tensor, example: &Tensor) -> Result<Tensor, ExportError> {
    let (vocab, dim) = embedding
        .dims2()
        .map_err(|_| ExportError::InvalidShape(format!("embedding {:?}", embedding.dims())))?;

    let flat = example.flatten_all()?;
    let ids = flat.to_vec1::<u32>()?;
    if let Some(&id) = ids.iter().find(|&&id| id as usize >= vocab) {
        return Err(ExportError::TokenOutOfRange { id, vocab });
    }

    let mut out_shape = example.dims().to_vec();
    out_shape.push(dim);
    Ok(embedding.index_select(&flat, 0)?.reshape(out_shape)?)
}

/// Read `checkpoint`, check it against an example input and write `output`
pub fn export_model(
    export: &ExportSettings,
    engine: &EngineSettings,
) -> Result<ExportReport, ExportError> {
    let checkpoint = export
        .checkpoint
        .clone()
        .unwrap_or_else(|| default_checkpoint(engine));
    if !checkpoint.is_file() {
        return Err(ExportError::MissingCheckpoint(checkpoint));
    }

    tracing::info!(
        checkpoint = %checkpoint.display(),
        language = %engine.language,
        "Loading checkpoint"
    );
    let tensors: HashMap<String, Tensor> =
        candle_core::pickle::read_all_with_key(&checkpoint, export.state_dict_key.as_deref())?
            .into_iter()
            .collect();
    tracing::debug!(tensors = tensors.len(), "Checkpoint loaded");

    export_tensors(&tensors, export, engine)
}

/// Check loaded `tensors` against an example input and write the artifact
pub fn export_tensors(
    tensors: &HashMap<String, Tensor>,
    export: &ExportSettings,
    engine: &EngineSettings,
) -> Result<ExportReport, ExportError> {
    let embedding = tensors
        .get(&export.embedding_tensor)
        .ok_or_else(|| ExportError::MissingTensor(export.embedding_tensor.clone()))?;

    let example = example_input(&export.example_shape, export.example_max_id)?;
    let traced = trace_embedding(&embedding.to_dtype(DType::F32)?, &example)?;
    tracing::info!(
        example_shape = ?export.example_shape,
        traced_shape = ?traced.dims(),
        "Example input accepted"
    );

    write_artifact(tensors, export, engine, &export.output_path)?;

    Ok(ExportReport {
        output: export.output_path.clone(),
        tensors: tensors.len(),
        example_shape: export.example_shape.clone(),
    })
}

fn write_artifact(
    tensors: &HashMap<String, Tensor>,
    export: &ExportSettings,
    engine: &EngineSettings,
    output: &Path,
) -> Result<(), ExportError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let metadata: HashMap<String, String> = [
        ("language".to_string(), engine.language.code().to_string()),
        (
            "example_shape".to_string(),
            format!("{:?}", export.example_shape),
        ),
        ("embedding".to_string(), export.embedding_tensor.clone()),
    ]
    .into_iter()
    .collect();

    // Contiguous copies; the pickle loader can hand back strided views
    let contiguous = tensors
        .iter()
        .map(|(name, tensor)| Ok((name.as_str(), tensor.contiguous()?)))
        .collect::<Result<Vec<_>, candle_core::Error>>()?;

    safetensors::serialize_to_file(contiguous, &Some(metadata), output)?;

    // Re-read the header so a truncated file is caught here
    let bytes = std::fs::read(output)?;
    let written = safetensors::SafeTensors::deserialize(&bytes)?;
    tracing::info!(
        output = %output.display(),
        tensors = written.len(),
        bytes = bytes.len(),
        "Model exported"
    );
    Ok(())
}
