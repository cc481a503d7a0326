use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::compare::CompareArgs;
use commands::config::ConfigCommands;
use commands::model::ModelCommands;
use commands::session::SessionArgs;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Compare texts by embedding similarity and keyword salience", long_about = None)]
struct Cli {
    /// Log engine activity to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a scraped text against a query
    Compare(CompareArgs),

    /// Interactive comparisons with history and map
    Session(SessionArgs),

    /// Manage embedding models
    Model {
        #[command(subcommand)]
        command: Option<ModelCommands>,
    },

    /// Show or initialise settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Session(args) => commands::session::execute(args),
        Commands::Model { command } => commands::model::execute_cli(command),
        Commands::Config { command } => commands::config::execute(command),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
