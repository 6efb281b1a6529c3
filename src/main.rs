mod abbrev;
mod commands;
mod config;
mod diagnostics;
mod disambiguate;
mod error;
mod output;
mod parser;
mod resolver;
mod scanner;
mod selector;
mod sequence;
mod store;
mod types;
mod urn;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::ProcessOptions;

/// Link classical citations in TEI commentaries to CTS URNs
#[derive(Parser)]
#[command(name = "citelink")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Log resolution failures and per-step detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the abbreviations generated for a work title
    Abbreviations {
        /// Work title, e.g. "Oedipus Tyrannus"
        title: String,
    },
    /// Extract citations from XML documents and write JSONL records
    Process {
        /// Extract <cit> groups and quoted <bibl>s instead of bare <bibl>s
        #[arg(long)]
        cit: bool,
        /// Reference data directory (defaults to the bundled data)
        #[arg(long, value_name = "DIR")]
        data: Option<PathBuf>,
        /// Directory of XML documents
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,
        /// Directory receiving resolved and unresolved JSONL files
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
    /// Resolve a single reference and print its URN
    Resolve {
        /// Reference data directory (defaults to the bundled data)
        #[arg(long, value_name = "DIR")]
        data: Option<PathBuf>,
        /// Inline citation text, as found between <bibl> tags
        #[arg(long)]
        inline: Option<String>,
        /// Reference, as found in an `n` attribute, e.g. "Soph. OT 151"
        reference: String,
    },
}

/// Log to stderr. `RUST_LOG` wins unless `--verbose` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Abbreviations { title } => {
            commands::abbreviations(&title);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Process { cit, data, input, output } => {
            commands::process(ProcessOptions { cit, data, input, output }).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Resolve { data, inline, reference } => {
            commands::resolve(&reference, inline.as_deref(), data.as_deref())
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
