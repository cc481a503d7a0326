//! Model command - Manage embedding models in the user cache
//!
//! Models are downloaded to `~/.simscope/cache/models/` and shared by every run.
//! Provenance tracked in `~/.simscope/models.lock`.

use anyhow::Result;
use simscope::embeddings::models::{Backend, ModelRegistry};
use simscope::models::{self, ModelLock, ModelStatus};
use simscope::paths;
use simscope::settings::Settings;

/// Model CLI subcommands
#[derive(Debug, Clone, clap::Subcommand)]
pub enum ModelCommands {
    /// List available models with download status
    List,

    /// Download a model to cache
    Add {
        /// Model name (from registry)
        name: String,
    },

    /// Show downloaded models and whether the configured one is usable
    Status,
}

/// Execute model command from CLI
pub fn execute_cli(command: Option<ModelCommands>) -> Result<()> {
    execute(command.unwrap_or(ModelCommands::List))
}

/// Execute model command
pub fn execute(command: ModelCommands) -> Result<()> {
    match command {
        ModelCommands::List => list(),
        ModelCommands::Add { name } => add(&name),
        ModelCommands::Status => status(),
    }
}

/// List available models with download status
fn list() -> Result<()> {
    let registry = ModelRegistry::load()?;

    println!("📦 Available Models\n");
    println!("{:<20} {:>6} {:>8}  STATUS", "NAME", "DIMS", "SIZE");
    println!("{}", "─".repeat(60));

    for name in registry.list_models() {
        let def = registry.get_model(name)?;
        let status = models::model_status(name)?;
        let size = def.size_int8.as_deref().unwrap_or("-");
        let default_marker = if name == registry.default.model { " *" } else { "" };

        println!(
            "{:<20} {:>6} {:>8}  {}{}",
            name,
            def.dimensions,
            size,
            format_status(&status),
            default_marker
        );
    }

    println!("\n* default   Cache: {}", paths::models::cache_dir().display());

    Ok(())
}

fn format_status(status: &ModelStatus) -> String {
    if status.builtin {
        "✓ built in".to_string()
    } else if status.in_cache {
        match &status.provenance {
            Some(prov) => {
                let date = prov
                    .downloaded
                    .split('T')
                    .next()
                    .unwrap_or(&prov.downloaded);
                format!("✓ cached ({})", date)
            }
            None => "✓ cached".to_string(),
        }
    } else if status.in_local {
        "✓ local".to_string()
    } else {
        "not downloaded".to_string()
    }
}

/// Download a model to cache
fn add(name: &str) -> Result<()> {
    let status = models::model_status(name)?;
    if status.in_cache {
        println!("Model '{}' already in cache.", status.name);
        println!(
            "  Location: {}",
            paths::models::model_dir(&status.name).display()
        );
        return Ok(());
    }

    models::add_model(name)
}

/// Show downloaded models and the configured model's availability
fn status() -> Result<()> {
    let lock = ModelLock::load()?;

    println!("📊 Model Status\n");

    println!("Cache:");
    if lock.is_empty() {
        println!("  (no models downloaded)");
    } else {
        for name in lock.list() {
            if let Some(model) = lock.get(name) {
                let size_mb = model.size_bytes / (1024 * 1024);
                let dir = paths::models::model_dir(name);
                let mark = match models::matches_lock(&dir, model) {
                    Ok(true) => "✓",
                    Ok(false) => "✗ checksum changed,",
                    Err(_) => "✗ files missing,",
                };
                println!("  {} {} ({} MB, {} dims)", mark, name, size_mb, model.dimensions);
            }
        }
    }

    let settings = Settings::load()?;
    let registry = ModelRegistry::load()?;
    println!("\nConfigured:");
    match registry.get_model(&settings.model) {
        Ok(def) => {
            let status = models::model_status(&def.name)?;
            let available = if def.backend == Backend::Hashing {
                "✓ built in"
            } else if status.in_cache {
                "✓ in cache"
            } else if status.in_local {
                "✓ local"
            } else {
                "✗ not available"
            };

            println!("  Model: {} ({})", def.name, available);

            if !status.is_available() {
                println!("\n  Run: simscope model add {}", def.name);
            }
        }
        Err(e) => println!("  {:#}", e),
    }

    Ok(())
}
