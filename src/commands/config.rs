//! Config command - show or write `~/.simscope/config.toml`

use anyhow::Result;
use simscope::paths;
use simscope::settings::Settings;

#[derive(Debug, Clone, clap::Subcommand)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,

    /// Write default settings to config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Init { force } => init(force),
    }
}

fn show() -> Result<()> {
    let path = paths::config_path();
    let settings = Settings::load()?;

    let origin = if path.exists() { "" } else { " (not found, defaults)" };
    println!("# {}{}", path.display(), origin);
    print!("{}", toml::to_string_pretty(&settings)?);
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path = paths::config_path();
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("  Use --force to overwrite.");
        return Ok(());
    }

    Settings::default().save_to(&path)?;
    println!("✓ Wrote default settings to {}", path.display());
    Ok(())
}
