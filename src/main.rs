//! The main entry point for the `docsub` command-line application.
//!
//! This file is responsible for parsing command-line arguments, setting up
//! logging and dispatching to the appropriate handler in the `docsub` library.

use anyhow::Result;
use docsub::cli::{self, Commands};
use docsub::replacer::{self, ReplaceRequest};
use docsub::{backup, scanner, tui};
use std::env;
use std::process;

/// Sends `log` output to stderr, defaulting to `default_level` unless
/// `RUST_LOG` says otherwise.
fn init_logger(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    // Bare subcommands print examples instead of clap's terse error
    let args_vec: Vec<String> = env::args().collect();
    if args_vec.len() == 2 {
        match args_vec[1].as_str() {
            "replace" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  docsub replace -d . -p 'John Doe' -r 'Jane Roe'   # Simple replacement");
                eprintln!("  docsub replace -d . -c batch.yaml --dry-run       # Preview a batch");
                eprintln!("\nFor more options: docsub replace --help");
                process::exit(1);
            }
            "scan" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  docsub scan -d .                 # List templates");
                eprintln!("  docsub scan -d . -p 'John Doe'   # Count occurrences");
                eprintln!("\nFor more options: docsub scan --help");
                process::exit(1);
            }
            "undo" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  docsub undo -d .                  # Restore all templates");
                eprintln!("  docsub undo -d . --keep-backups   # Restore but keep .bak files");
                eprintln!("\nFor more options: docsub undo --help");
                process::exit(1);
            }
            "clean-backups" => {
                eprintln!("Error: Missing required argument: --dir <DIR>\n");
                eprintln!("USAGE EXAMPLES:");
                eprintln!("  docsub clean-backups -d .             # Remove all backup files");
                eprintln!("  docsub clean-backups -d . --dry-run   # Preview what would be deleted");
                eprintln!("\nFor more options: docsub clean-backups --help");
                process::exit(1);
            }
            _ => {}
        }
    }

    let args = cli::parse_args();
    let command = args.command.unwrap_or(Commands::Ui {
        dir: None,
        config: None,
        no_backup: false,
    });

    match command {
        Commands::Replace {
            dir,
            find,
            replace,
            config,
            prefixes,
            no_backup,
            dry_run,
            verbose,
            format,
            output,
        } => {
            init_logger(if verbose { "info" } else { "warn" });
            let ok = replacer::run_replace(ReplaceRequest {
                config,
                find,
                replace,
                dir,
                prefixes,
                no_backup,
                dry_run,
                verbose,
                format,
                output,
            })?;
            if !ok {
                process::exit(1);
            }
        }
        Commands::Scan {
            dir,
            find,
            prefixes,
        } => {
            init_logger("warn");
            scanner::run_scan(dir, find, prefixes)?;
        }
        Commands::Ui {
            dir,
            config,
            no_backup,
        } => {
            // Log lines would tear the alternate screen
            if env::var_os("RUST_LOG").is_some() {
                init_logger("warn");
            }
            tui::run_ui(dir, config, no_backup)?;
        }
        Commands::Undo { dir, keep_backups } => {
            init_logger("info");
            backup::run_undo(dir, keep_backups)?;
        }
        Commands::CleanBackups { dir, dry_run } => {
            init_logger("warn");
            backup::run_clean_backups(dir, dry_run)?;
        }
    }

    Ok(())
}
