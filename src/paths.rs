//! Filesystem layout for simscope.
//!
//! Defines WHERE data lives. No I/O, no validation.
//!
//! ```text
//! ~/.simscope/                 # or $SIMSCOPE_HOME
//! ├── config.toml              # User settings
//! ├── models.lock              # Downloaded model provenance
//! └── cache/
//!     └── models/{name}/       # model_quantized.onnx + tokenizer.json
//! ```
//!
//! History is deliberately absent: it lives only for the session.

use std::path::PathBuf;

/// Environment variable that relocates the home directory
pub const HOME_ENV: &str = "SIMSCOPE_HOME";

/// User's simscope home directory: `~/.simscope/`
pub fn simscope_home() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".simscope")
}

/// Cache directory for all rebuildable data: `~/.simscope/cache/`
pub fn cache_dir() -> PathBuf {
    simscope_home().join("cache")
}

/// User settings: `~/.simscope/config.toml`
pub fn config_path() -> PathBuf {
    simscope_home().join("config.toml")
}

pub mod models {
    use super::*;

    /// Model cache directory: `~/.simscope/cache/models/`
    pub fn cache_dir() -> PathBuf {
        super::cache_dir().join("models")
    }

    /// Specific model directory: `~/.simscope/cache/models/{name}/`
    pub fn model_dir(name: &str) -> PathBuf {
        cache_dir().join(name)
    }

    /// Quantized ONNX file: `~/.simscope/cache/models/{name}/model_quantized.onnx`
    pub fn model_onnx(name: &str) -> PathBuf {
        model_dir(name).join("model_quantized.onnx")
    }

    /// Model tokenizer: `~/.simscope/cache/models/{name}/tokenizer.json`
    pub fn model_tokenizer(name: &str) -> PathBuf {
        model_dir(name).join("tokenizer.json")
    }

    /// Lock file tracking provenance: `~/.simscope/models.lock`
    pub fn lock_path() -> PathBuf {
        super::simscope_home().join("models.lock")
    }
}
