//! Model file management
//!
//! Resolves ONNX model files from the user cache (`~/.simscope/cache/models/`)
//! and tracks provenance in `~/.simscope/models.lock`.
//!
//! ```text
//! registry.toml (in binary)  →  What models exist
//!      ↓
//! models.lock                →  What's downloaded + provenance
//!      ↓
//! this module                →  Resolves path to actual files
//! ```

mod download;
mod internal;

pub use download::{fetch, partial_path, sha256_file, write_atomic, Fetched};
pub use internal::{LockedModel, ModelLock};

use crate::embeddings::{Backend, ModelRegistry};
use crate::paths;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Check if a directory contains valid model files.
///
/// Valid = tokenizer.json + (model.onnx OR model_quantized.onnx)
fn has_valid_model_files(dir: &Path) -> bool {
    if !dir.join("tokenizer.json").exists() {
        return false;
    }
    dir.join("model.onnx").exists() || dir.join("model_quantized.onnx").exists()
}

/// ONNX file inside a model directory, preferring the quantized export
pub fn onnx_file(model_dir: &Path) -> PathBuf {
    let quantized = model_dir.join("model_quantized.onnx");
    if quantized.exists() {
        quantized
    } else {
        model_dir.join("model.onnx")
    }
}

/// Path to the model directory if it holds valid files.
pub fn cached_model_path(name: &str) -> Option<PathBuf> {
    let model_dir = paths::models::model_dir(name);
    has_valid_model_files(&model_dir).then_some(model_dir)
}

/// Get the resolved path for a model, checking cache first then local.
///
/// Resolution order:
/// 1. User cache (`~/.simscope/cache/models/{name}/`)
/// 2. Local path (`resources/models/{name}/`)
pub fn resolve_model_path(name: &str) -> Result<PathBuf> {
    if let Some(path) = cached_model_path(name) {
        return Ok(path);
    }

    let local_path = PathBuf::from(format!("resources/models/{}", name));
    if has_valid_model_files(&local_path) {
        return Ok(local_path);
    }

    anyhow::bail!(
        "Model '{}' not found. Run `simscope model add {}` to download it.",
        name,
        name
    )
}

/// Where a model is available and its provenance.
#[derive(Debug)]
pub struct ModelStatus {
    pub name: String,
    /// No files needed (hashing backend)
    pub builtin: bool,
    pub in_cache: bool,
    pub in_local: bool,
    pub provenance: Option<LockedModel>,
}

impl ModelStatus {
    pub fn is_available(&self) -> bool {
        self.builtin || self.in_cache || self.in_local
    }
}

/// Whether the files in `dir` still hash to what the lock file recorded.
pub fn matches_lock(dir: &Path, locked: &LockedModel) -> Result<bool> {
    let model = sha256_file(&onnx_file(dir))?;
    let tokenizer = sha256_file(&dir.join("tokenizer.json"))?;
    Ok(model == locked.sha256_model && tokenizer == locked.sha256_tokenizer)
}

/// Check the status of a model.
pub fn model_status(name: &str) -> Result<ModelStatus> {
    let registry = ModelRegistry::load()?;
    let def = registry.get_model(name)?;
    let lock = ModelLock::load()?;

    Ok(ModelStatus {
        name: def.name.clone(),
        builtin: def.backend == Backend::Hashing,
        in_cache: has_valid_model_files(&paths::models::model_dir(&def.name)),
        in_local: has_valid_model_files(&PathBuf::from(format!("resources/models/{}", def.name))),
        provenance: lock.get(&def.name).cloned(),
    })
}

/// Download a model from registry to the user cache.
///
/// Each file is hashed while it streams in and only appears under its final
/// name once complete. The hashes are recorded in the lock file as provenance.
pub fn add_model(name: &str) -> Result<()> {
    let registry = ModelRegistry::load()?;
    let model_def = registry.get_model(name)?;

    if model_def.backend == Backend::Hashing {
        println!("Model '{}' is built in, nothing to download.", model_def.name);
        return Ok(());
    }

    let model_url = model_def
        .download_quantized
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("No download URL for model '{}'", model_def.name))?;

    let tokenizer_url = model_def
        .download_tokenizer
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("No tokenizer URL for model '{}'", model_def.name))?;

    info!(model = %model_def.name, "downloading model");
    println!("Downloading {}...", model_def.name);

    let model_path = paths::models::model_onnx(&model_def.name);
    println!("  Model:");
    let model = fetch(model_url, &model_path)?;

    let tokenizer_path = paths::models::model_tokenizer(&model_def.name);
    println!("  Tokenizer:");
    let tokenizer = fetch(tokenizer_url, &tokenizer_path)?;

    let mut lock = ModelLock::load()?;
    lock.insert(
        &model_def.name,
        LockedModel {
            downloaded: chrono::Utc::now().to_rfc3339(),
            source_model: model_url.clone(),
            source_tokenizer: tokenizer_url.clone(),
            sha256_model: model.sha256,
            sha256_tokenizer: tokenizer.sha256,
            size_bytes: model.bytes + tokenizer.bytes,
            dimensions: model_def.dimensions,
        },
    );
    lock.save()?;

    println!("\n✓ Model '{}' added to cache", model_def.name);
    println!("  Location: {}", paths::models::model_dir(&model_def.name).display());

    Ok(())
}
