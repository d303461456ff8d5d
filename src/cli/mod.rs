//! Command-line interface implementation
//!
//! This module provides the CLI entry point and hands off to [`pack`] for
//! the actual run.

mod pack;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

pub use pack::confirm;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// bmpack - Compile asset packs into monochrome BM/BMX containers
#[derive(Parser, Debug)]
#[command(name = "bmpack")]
#[command(about = "Compile asset packs into monochrome BM/BMX containers")]
#[command(version)]
pub struct Cli {
    /// Directory whose subdirectories are asset packs [default: current directory]
    pub input: Option<PathBuf>,

    /// Output directory [default: <INPUT>/asset_packs]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start without the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Number of worker threads for frame encoding
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Stop at the first asset that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// List planned assets without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only build assets matching these patterns (e.g. "anim", "icon:Dolphin/*")
    #[arg(short, long = "target", value_name = "PATTERN")]
    pub targets: Vec<String>,

    /// Show debug output and skipped assets
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to bmpack.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    pack::run_pack(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["bmpack"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.yes);
        assert!(cli.jobs.is_none());
        assert!(cli.targets.is_empty());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "bmpack", "assets", "-o", "out", "-y", "-j", "4", "--fail-fast", "--dry-run", "-t",
            "anim", "-t", "icon:Dolphin/*", "-v",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("assets")));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.yes && cli.fail_fast && cli.dry_run && cli.verbose);
        assert_eq!(cli.jobs, Some(4));
        assert_eq!(cli.targets, vec!["anim", "icon:Dolphin/*"]);
    }

    #[test]
    fn test_cli_rejects_bad_jobs() {
        assert!(Cli::try_parse_from(["bmpack", "-j", "many"]).is_err());
    }
}
