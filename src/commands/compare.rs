//! Compare command - one-shot comparison of two texts

use super::report::{print_report, JsonReport};
use super::ComparisonOptions;
use anyhow::Result;
use simscope::session::Session;
use simscope::settings::Settings;

#[derive(Debug, Clone, clap::Args)]
pub struct CompareArgs {
    /// Text scraped from the source being checked
    #[arg(long)]
    pub scraped: String,

    /// Query text to compare against
    #[arg(long)]
    pub query: String,

    #[command(flatten)]
    pub options: ComparisonOptions,

    /// Output results as JSON
    #[arg(short, long)]
    pub json: bool,
}

pub fn execute(args: CompareArgs) -> Result<()> {
    let settings = Settings::load()?;
    let (config, threshold) = args.options.resolve(&settings)?;

    let mut session = Session::new(&settings)?;
    session.set_threshold(threshold)?;
    let record = session.run_comparison(&args.scraped, &args.query, &config)?;

    if args.json {
        let report = JsonReport::new(record, threshold);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(record, threshold);
    }

    Ok(())
}
