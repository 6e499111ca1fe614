//! ZQLZ command line tools.

mod folds;
mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use folds::EditSpec;
use logging::LoggingConfig;
use std::path::PathBuf;

/// ZQLZ command line tools
#[derive(Parser)]
#[command(name = "zqlz")]
#[command(version)]
#[command(about = "ZQLZ command line tools")]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. warn, debug, zqlz_folding=trace)
    #[arg(long, global = true, env = "ZQLZ_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the folding regions of a SQL script
    Folds(FoldsArgs),
}

#[derive(Args)]
struct FoldsArgs {
    /// SQL script to fold
    file: PathBuf,

    /// Folding settings file (default: <config dir>/zqlz/folding.json)
    #[arg(long, env = "ZQLZ_FOLDING_SETTINGS")]
    settings: Option<PathBuf>,

    /// Replay an edit after the initial fold, as OFFSET:REMOVE:TEXT (repeatable)
    #[arg(long = "edit", value_name = "OFFSET:REMOVE:TEXT")]
    edits: Vec<EditSpec>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LoggingConfig::for_level(&cli.log_level).with_json(cli.log_json))?;

    match cli.command {
        Commands::Folds(args) => folds_command(args),
    }
}

fn folds_command(args: FoldsArgs) -> Result<()> {
    let settings = folds::load_settings(args.settings.as_deref())?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {:?}", args.file))?;

    let report = folds::run(&args.file, &text, settings, &args.edits)?;
    if args.json {
        folds::print_json(&report)
    } else {
        folds::print_table(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_folds_with_edits() {
        let cli = Cli::try_parse_from([
            "zqlz",
            "folds",
            "query.sql",
            "--edit",
            "4:0:x",
            "--edit",
            "0:2:",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        let Commands::Folds(args) = cli.command;
        assert_eq!(args.file, PathBuf::from("query.sql"));
        assert_eq!(args.edits.len(), 2);
        assert_eq!(args.edits[1].remove, 2);
        assert!(args.json);
    }
}
