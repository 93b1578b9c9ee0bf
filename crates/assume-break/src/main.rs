//! `assume-break` command-line entry point.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use assume_break::{report, settings, StressTester};
use clap::{Parser, Subcommand};
use coordination::FactCorpus;
use tracing::info;

/// Stress-test business plans against Zambian ground truth.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the adversarial stress test on a business plan
    Test {
        /// Business plan text
        plan: Option<String>,

        /// Read the plan from a file
        #[arg(short, long, conflicts_with = "plan")]
        file: Option<PathBuf>,

        /// Read the plan from stdin; finish with two empty lines
        #[arg(short, long, default_value_t = false, conflicts_with_all = ["plan", "file"])]
        interactive: bool,

        /// Maximum revision rounds (defaults to MAX_REVISIONS or 3)
        #[arg(short = 'r', long)]
        max_revisions: Option<u32>,

        /// Write the result snapshot as JSON to this path
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Print the result as JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the bundled ground-truth facts
    Facts {
        /// Only show one category (e.g. TAX, ENERGY)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Test {
            plan,
            file,
            interactive,
            max_revisions,
            export,
            json,
        } => {
            let plan = if let Some(path) = file {
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read plan from {}", path.display()))?
            } else if interactive {
                eprintln!("Enter the business plan; finish with two empty lines:");
                read_until_blank_lines(std::io::stdin().lock())
                    .context("failed to read plan from stdin")?
            } else {
                plan.unwrap_or_default()
            };
            if plan.trim().is_empty() {
                bail!("no business plan provided (pass it as an argument, --file, or --interactive)");
            }

            let settings = settings().context("failed to load settings")?;
            let tester = StressTester::from_settings(settings);
            info!(
                model = %settings.model,
                credentials = settings.has_credentials(),
                "stress test starting"
            );
            let result = tester.run(plan.trim(), max_revisions).await;

            if json {
                println!("{}", result.to_json().context("failed to serialize result")?);
            } else {
                print!("{}", report::render(&result));
            }
            if let Some(path) = export {
                result
                    .write_to(&path)
                    .with_context(|| format!("failed to export result to {}", path.display()))?;
                eprintln!("Report exported to {}", path.display());
            }
        }
        Command::Facts { category } => {
            let corpus = FactCorpus::bundled();
            let filter = category.map(|c| c.to_uppercase());
            match report::render_facts(&corpus, filter.as_deref()) {
                Some(listing) => print!("{}", listing),
                None => bail!(
                    "no facts in category {}; available: {}",
                    filter.unwrap_or_default(),
                    corpus.categories().join(", ")
                ),
            }
        }
    }

    Ok(())
}

/// Read lines until two consecutive empty lines or end of input.
fn read_until_blank_lines(reader: impl BufRead) -> std::io::Result<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut blanks = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            blanks += 1;
            if blanks >= 2 {
                break;
            }
        } else {
            blanks = 0;
        }
        lines.push(line);
    }
    Ok(lines.join("\n").trim().to_string())
}
