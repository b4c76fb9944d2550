use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Literal find-and-replace across a folder of Word templates.
///
/// `docsub` opens every whitelisted `.docx` template in a folder, replaces
/// text inside its runs, and saves the documents in place.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find and replace text across a folder of .docx templates",
    long_about = "docsub - Literal find-and-replace across a folder of Word templates.

Only documents whose file name starts with a whitelisted template name are
touched. Text is matched inside individual runs, so formatting is preserved.

QUICK EXAMPLES:
  docsub                                          # Open the interactive form
  docsub replace -d ./Smith -p 'John Doe' -r 'Jane Roe'
  docsub replace -d ./Smith -c batch.yaml --dry-run
  docsub scan -d ./Smith -p 'John Doe'            # Count occurrences
  docsub undo -d ./Smith                          # Restore from backups

For detailed help on any command, use: docsub <command> --help"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// The set of available commands for the `docsub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace text in every template of a folder (with automatic backups)
    ///
    /// EXAMPLES:
    ///   docsub replace -d . -p 'John Doe' -r 'Jane Roe'
    ///   docsub replace -d . -p A -r B -p 2023 -r 2024   # Several pairs, in order
    ///   docsub replace -d . -c batch.yaml --dry-run     # Preview changes
    ///   docsub replace -d . -p A -r B -f json -o report.json
    ///
    /// Batch file format (batch.yaml):
    ///   prefixes: ['Trust Summary', 'RLT']   # optional
    ///   instructions:
    ///     - find: 'John Doe'
    ///       replace: 'Jane Roe'
    Replace {
        /// The folder containing the templates.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Text to find. Repeat together with --replace for several pairs.
        #[arg(short = 'p', long = "find")]
        find: Vec<String>,

        /// Replacement text, paired by position with --find.
        #[arg(short, long)]
        replace: Vec<String>,

        /// Path to a YAML batch file of instructions.
        #[arg(short, long, conflicts_with_all = ["find", "replace"])]
        config: Option<PathBuf>,

        /// Template name prefix to process. Repeat to list several; replaces the built-in list.
        #[arg(long = "prefix")]
        prefixes: Vec<String>,

        /// Disable the creation of backup files (`.bak`).
        #[arg(long, env = "DOCSUB_NO_BACKUP")]
        no_backup: bool,

        /// Count the changes without modifying any files.
        #[arg(long)]
        dry_run: bool,

        /// List every processed document.
        #[arg(short, long)]
        verbose: bool,

        /// The output format for the reports (`text`, `json` or `csv`).
        #[arg(short = 'f', long = "format", default_value = "text")]
        format: String,

        /// Path to the output file. If omitted, reports are written to standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the templates a folder contains
    ///
    /// EXAMPLES:
    ///   docsub scan -d .                  # List templates
    ///   docsub scan -d . -p 'John Doe'    # With occurrence counts
    Scan {
        /// The folder to inspect.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Text to count in each template.
        #[arg(short = 'p', long = "find")]
        find: Option<String>,

        /// Template name prefix to look for. Repeat to list several.
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
    },

    /// Open the interactive form (the default when no command is given)
    Ui {
        /// Folder to pre-select.
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Batch file whose instructions pre-fill the list.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Disable the creation of backup files (`.bak`).
        #[arg(long, env = "DOCSUB_NO_BACKUP")]
        no_backup: bool,
    },

    /// Restore templates from backups (undo replacements)
    ///
    /// EXAMPLES:
    ///   docsub undo -d .                    # Restore all templates
    ///   docsub undo -d . --keep-backups     # Restore but keep .bak files
    Undo {
        /// The folder where the `replace` operation was run.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Keep the backup files after restoring the templates.
        #[arg(long)]
        keep_backups: bool,
    },

    /// Remove backup files without restoring
    ///
    /// EXAMPLES:
    ///   docsub clean-backups -d . --dry-run  # Preview what would be deleted
    ///   docsub clean-backups -d .            # Delete all .docx.bak files
    CleanBackups {
        /// The folder to clean of backup files.
        #[arg(short, long, required = true)]
        dir: PathBuf,

        /// Preview which backup files would be removed without deleting them.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_repeated_pairs() {
        let args = Args::try_parse_from([
            "docsub", "replace", "-d", "x", "-p", "A", "-r", "B", "--find", "C", "--replace", "D",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Replace { find, replace, .. }) => {
                assert_eq!(find, ["A", "C"]);
                assert_eq!(replace, ["B", "D"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_conflicts_with_pairs() {
        let res = Args::try_parse_from(["docsub", "replace", "-d", "x", "-c", "b.yaml", "-p", "A"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_no_command_is_allowed() {
        let args = Args::try_parse_from(["docsub"]).unwrap();
        assert!(args.command.is_none());
    }
}
