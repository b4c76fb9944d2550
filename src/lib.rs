//! `docsub` replaces literal text across a folder of Word (`.docx`) templates.
//!
//! It provides the core logic for the `docsub` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `FindAndReplace`: applies find/replace instructions to every whitelisted
//!   template in a folder and reports what changed.
//! - `DocxPackage`: reads and rewrites the text runs of a single document.
//! - `TemplateWhitelist`: the file name prefixes that mark a document as a template.
//! - `config`: loads batches of instructions from YAML files.
//! - `backup`: `.bak` copies, undo and cleanup.
//! - `app` and `tui`: the interactive terminal form.

pub mod app;
pub mod backup;
pub mod cli;
pub mod config;
pub mod docx;
pub mod errors;
pub mod folder_picker;
pub mod output_formatter;
pub mod replacer;
pub mod report;
pub mod scanner;
pub mod templates;
pub mod tui;

#[cfg(test)]
mod test_fixtures;

// Re-export main types for easier access by library users.
pub use docx::DocxPackage;
pub use errors::{Error, Result};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use replacer::{FindAndReplace, ProcessOptions};
pub use report::{FindReplaceReport, Instruction};
pub use templates::TemplateWhitelist;
