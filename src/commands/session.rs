//! Session command - interactive comparisons over stdin
//!
//! Each round reads a scraped line then a query line. Lines starting with
//! `:` are commands. History lives until the loop exits.

use super::report::{print_history, print_map, print_summary};
use super::ComparisonOptions;
use anyhow::Result;
use colored::Colorize;
use simscope::comparison::CompareConfig;
use simscope::error::EngineError;
use simscope::session::Session;
use simscope::settings::Settings;
use std::io::{self, BufRead, Write};

/// Records listed by `:history`
const HISTORY_SHOWN: usize = 10;

#[derive(Debug, Clone, clap::Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub options: ComparisonOptions,
}

enum Step {
    Continue,
    Quit,
}

pub fn execute(args: SessionArgs) -> Result<()> {
    let settings = Settings::load()?;
    let (config, threshold) = args.options.resolve(&settings)?;

    let mut session = Session::new(&settings)?;
    session.set_threshold(threshold)?;

    println!(
        "{} model {} · metric {} · threshold {:.2}",
        "simscope session".bold(),
        config.model,
        config.metric,
        threshold
    );
    println!("Commands: :map  :history  :threshold <v>  :quit\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(scraped) = prompt(&mut lines, "scraped> ")? else {
            break;
        };
        if let Some(command) = scraped.trim().strip_prefix(':') {
            match handle_command(&mut session, command) {
                Step::Continue => continue,
                Step::Quit => break,
            }
        }

        let Some(query) = prompt(&mut lines, "query>   ")? else {
            break;
        };

        run_round(&mut session, &scraped, &query, &config);
    }

    Ok(())
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> Result<Option<String>> {
    print!("{}", label.cyan());
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

/// Failed rounds are reported and leave history untouched
fn run_round(session: &mut Session, scraped: &str, query: &str, config: &CompareConfig) {
    let threshold = session.threshold();
    match session.run_comparison(scraped, query, config) {
        Ok(record) => print_summary(record, threshold),
        Err(EngineError::MissingInput { which }) => {
            println!("{} please enter text for {}", "!".yellow(), which)
        }
        Err(e) => println!("{} {}", "error:".red(), e),
    }
    println!();
}

fn handle_command(session: &mut Session, command: &str) -> Step {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("q") => return Step::Quit,
        Some("history") => {
            if session.history().is_empty() {
                println!("(no comparisons yet)");
            } else {
                print_history(
                    session.history().recent(HISTORY_SHOWN).into_iter(),
                    session.threshold(),
                );
            }
        }
        Some("map") => match session.history_map() {
            Ok(map) => print_map(&map),
            Err(EngineError::InsufficientData { needed, found }) => {
                println!(
                    "Not enough points for a map yet ({} of {} needed).",
                    found, needed
                );
            }
            Err(e) => println!("{} {}", "error:".red(), e),
        },
        Some("threshold") => match parts.next().map(str::parse::<f32>) {
            Some(Ok(value)) => match session.set_threshold(value) {
                Ok(()) => println!("threshold = {:.2}", value),
                Err(e) => println!("{} {}", "error:".red(), e),
            },
            _ => println!("usage: :threshold <value>  (current {:.2})", session.threshold()),
        },
        _ => println!("unknown command, try :map :history :threshold <v> :quit"),
    }
    println!();
    Step::Continue
}
