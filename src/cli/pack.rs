//! The pack command: load config, confirm, regenerate every pack.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::{debug, error};

use super::{Cli, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::progress::ConsoleProgress;
use crate::build::{BuildContext, BuildPipeline};
use crate::config::loader::{
    default_config, find_config, load_config, merge_cli_overrides, CliOverrides,
};
use crate::config::PackerConfig;

/// Ask whether to start.
///
/// Enter or anything starting with `y` proceeds; `n`, other input and EOF cancel.
pub fn confirm(mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    write!(output, "Press Enter to continue or 'n' to cancel: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }

    let answer = line.trim().to_ascii_lowercase();
    Ok(answer.is_empty() || answer.starts_with('y'))
}

/// Paths given on the command line are relative to the working directory.
fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    crate::config::loader::resolve_path(cwd, path)
}

fn load(cli: &Cli, cwd: &Path) -> Result<(PackerConfig, PathBuf), String> {
    let config_path = cli.config.clone().or_else(find_config);

    let (mut config, root) = match config_path {
        Some(path) => {
            debug!("Using config: {}", path.display());
            let config = load_config(Some(&path)).map_err(|e| e.to_string())?;
            let root = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => absolute(cwd, parent),
                _ => cwd.to_path_buf(),
            };
            (config, root)
        }
        None => {
            debug!("No bmpack.toml found, using defaults");
            (default_config(), cwd.to_path_buf())
        }
    };

    let overrides = CliOverrides {
        input: cli.input.as_deref().map(|p| absolute(cwd, p)),
        output: cli.output.as_deref().map(|p| absolute(cwd, p)),
        jobs: cli.jobs,
        fail_fast: cli.fail_fast.then_some(true),
        confirm: cli.yes.then_some(false),
    };
    merge_cli_overrides(&mut config, &overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
        return Err(format!("Invalid options:\n{}", lines.join("\n")));
    }

    Ok((config, root))
}

/// Run the pack command
pub fn run_pack(cli: &Cli) -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: cannot determine working directory: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (config, root) = match load(cli, &cwd) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let needs_confirm = config.build.confirm && !cli.dry_run;
    let context = BuildContext::new(config, root)
        .with_verbose(cli.verbose)
        .with_filter(cli.targets.clone());

    println!("Input:  {}", context.input_dir().display());
    println!("Output: {}", context.output_dir().display());

    if needs_confirm {
        println!("Packs in the output directory will be regenerated.");
        match confirm(io::stdin().lock(), io::stdout()) {
            Ok(true) => {}
            Ok(false) => {
                println!("Cancelled");
                return ExitCode::from(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let reporter = ConsoleProgress::new().with_verbose(cli.verbose || cli.dry_run);
    let mut pipeline =
        BuildPipeline::new(context).with_dry_run(cli.dry_run).with_reporter(Box::new(reporter));

    match pipeline.build() {
        Ok(result) => {
            println!("{}", result.summary());
            if result.is_success() {
                ExitCode::from(EXIT_SUCCESS)
            } else {
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn answer(input: &str) -> bool {
        let mut out = Vec::new();
        confirm(input.as_bytes(), &mut out).unwrap()
    }

    #[test]
    fn test_confirm_enter_proceeds() {
        assert!(answer("\n"));
        assert!(answer("y\n"));
        assert!(answer("Yes\n"));
    }

    #[test]
    fn test_confirm_cancels() {
        assert!(!answer(""));
        assert!(!answer("n\n"));
        assert!(!answer("no\n"));
    }

    #[test]
    fn test_confirm_prompt_written() {
        let mut out = Vec::new();
        confirm("\n".as_bytes(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Press Enter"));
    }

    #[test]
    fn test_load_rejects_zero_jobs() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut cli = Cli::try_parse_from(["bmpack", "-j", "0"]).unwrap();
        let config = temp.path().join("bmpack.toml");
        std::fs::write(&config, "").unwrap();
        cli.config = Some(config);
        assert!(load(&cli, temp.path()).unwrap_err().contains("jobs"));
    }

    #[test]
    fn test_load_cli_paths_relative_to_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("bmpack.toml");
        std::fs::write(&config, "[pack]\noutput = \"built\"\n").unwrap();
        let mut cli = Cli::try_parse_from(["bmpack", "assets", "-y"]).unwrap();
        cli.config = Some(config);

        let cwd = temp.path().join("work");
        let (config, root) = load(&cli, &cwd).unwrap();
        assert_eq!(root, temp.path());
        assert_eq!(config.pack.input, cwd.join("assets"));
        assert_eq!(config.pack.output, PathBuf::from("built"));
        assert!(!config.build.confirm);
    }
}
