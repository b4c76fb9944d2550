use crate::errors::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// A validated find/replace pair.
///
/// Both texts must contain something other than whitespace. The texts are
/// stored exactly as given; surrounding spaces are meaningful when matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Instruction {
    pub find: String,
    pub replace: String,
}

impl Instruction {
    /// Validates and creates a new instruction.
    ///
    /// Returns [`Error::BlankFind`] or [`Error::BlankReplace`] when either
    /// text is blank after trimming.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Result<Self> {
        let find = find.into();
        let replace = replace.into();

        if find.trim().is_empty() {
            return Err(Error::BlankFind);
        }
        if replace.trim().is_empty() {
            return Err(Error::BlankReplace);
        }

        Ok(Self { find, replace })
    }
}

/// What happened to a single document during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub replacements: usize,
    /// `true` if the file was (or in a dry run, would have been) rewritten.
    pub modified: bool,
}

/// The result of applying one instruction to a folder.
///
/// Created fresh for each invocation. A missing folder or a folder without
/// templates produces an unsuccessful report carrying `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindReplaceReport {
    pub instruction: Instruction,
    pub success: bool,
    pub files_processed: usize,
    pub files_modified: usize,
    pub total_replacements: usize,
    pub warnings: Vec<String>,
    pub error_message: Option<String>,
    pub files: Vec<FileOutcome>,
}

impl FindReplaceReport {
    /// Creates an empty report that has not yet succeeded.
    pub fn new(instruction: Instruction) -> Self {
        Self {
            instruction,
            success: false,
            files_processed: 0,
            files_modified: 0,
            total_replacements: 0,
            warnings: Vec::new(),
            error_message: None,
            files: Vec::new(),
        }
    }

    /// Creates an unsuccessful report with the given message.
    pub fn failed(instruction: Instruction, message: impl Into<String>) -> Self {
        let mut report = Self::new(instruction);
        report.error_message = Some(message.into());
        report
    }

    /// Records a processed document and updates the counters.
    pub fn record_file(&mut self, outcome: FileOutcome) {
        self.files_processed += 1;
        if outcome.modified {
            self.files_modified += 1;
            self.total_replacements += outcome.replacements;
        }
        self.files.push(outcome);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// The message shown to the user: the error for failed reports, the
    /// summary otherwise.
    pub fn message(&self) -> String {
        match &self.error_message {
            Some(error) if !self.success => error.clone(),
            _ => self.summary(),
        }
    }

    /// Three-line summary of the counters.
    pub fn summary(&self) -> String {
        format!(
            "Processed {} files.\nModified {} files.\nTotal replacements: {}",
            self.files_processed, self.files_modified, self.total_replacements
        )
    }
}
