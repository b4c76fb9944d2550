//! State of the interactive find-and-replace form.
//!
//! Everything here is independent of the terminal so it can be driven from
//! tests. [`crate::tui`] renders it and feeds it key presses.

use crate::errors::Error;
use crate::replacer::FindAndReplace;
use crate::report::Instruction;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Error,
    Info,
}

/// A modal message waiting to be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Which part of the form receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Folder,
    Find,
    Replace,
    Instructions,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Folder => Focus::Find,
            Focus::Find => Focus::Replace,
            Focus::Replace => Focus::Instructions,
            Focus::Instructions => Focus::Folder,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Folder => Focus::Instructions,
            Focus::Find => Focus::Folder,
            Focus::Replace => Focus::Find,
            Focus::Instructions => Focus::Replace,
        }
    }
}

/// The form: a source folder, the pending find/replace inputs, the list of
/// instructions entered so far, and a queue of dialogs.
#[derive(Debug)]
pub struct FindReplaceForm {
    source_folder: Option<PathBuf>,
    folder_display: String,
    pub find_input: String,
    pub replace_input: String,
    instructions: Vec<Instruction>,
    selected: Option<usize>,
    focus: Focus,
    dialogs: VecDeque<Dialog>,
}

impl Default for FindReplaceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FindReplaceForm {
    pub fn new() -> Self {
        Self {
            source_folder: None,
            folder_display: String::new(),
            find_input: String::new(),
            replace_input: String::new(),
            instructions: Vec::new(),
            selected: None,
            focus: Focus::Find,
            dialogs: VecDeque::new(),
        }
    }

    pub fn source_folder(&self) -> Option<&Path> {
        self.source_folder.as_deref()
    }

    /// The folder as shown on screen: `.../<parent>/<name>`.
    pub fn folder_display(&self) -> &str {
        &self.folder_display
    }

    /// Stores the folder chosen in the picker. `None` (a cancelled picker)
    /// clears the current choice.
    pub fn select_folder(&mut self, folder: Option<PathBuf>) {
        match folder {
            Some(path) => {
                self.folder_display = abbreviate(&path);
                self.source_folder = Some(path);
            }
            None => {
                self.folder_display.clear();
                self.source_folder = None;
            }
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Types a character into the focused input.
    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
        }
    }

    /// Deletes the last character of the focused input.
    pub fn backspace(&mut self) {
        if let Some(input) = self.focused_input() {
            input.pop();
        }
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Find => Some(&mut self.find_input),
            Focus::Replace => Some(&mut self.replace_input),
            _ => None,
        }
    }

    /// Turns the two inputs into a new instruction row.
    ///
    /// Both inputs are trimmed. Blank inputs and duplicate pairs raise a
    /// dialog instead; the inputs are cleared only on success.
    pub fn add_instruction(&mut self) {
        let find_text = self.find_input.trim().to_string();
        let replace_text = self.replace_input.trim().to_string();

        let instruction = match Instruction::new(find_text.as_str(), replace_text.as_str()) {
            Ok(instruction) => instruction,
            Err(e) => {
                let message = match e {
                    Error::BlankFind => "Enter text for what you want to find.".to_string(),
                    Error::BlankReplace => "Enter text for what you want to replace.".to_string(),
                    other => other.to_string(),
                };
                self.push_dialog(Dialog::error("Warning", message));
                return;
            }
        };

        if self.instructions.contains(&instruction) {
            self.push_dialog(Dialog::info(
                "Duplicate Entry",
                format!(
                    "You entered '{find_text}' and '{replace_text}'.\nThey are already in the list."
                ),
            ));
            return;
        }

        self.instructions.push(instruction);
        self.selected = Some(self.instructions.len() - 1);
        self.find_input.clear();
        self.replace_input.clear();
        self.focus = Focus::Find;
    }

    /// Adds an already validated instruction, skipping duplicates.
    pub fn push_instruction(&mut self, instruction: Instruction) {
        if !self.instructions.contains(&instruction) {
            self.instructions.push(instruction);
            self.selected.get_or_insert(0);
        }
    }

    /// Removes the selected instruction row.
    pub fn remove_selected(&mut self) {
        let Some(index) = self.selected else {
            return;
        };
        if index >= self.instructions.len() {
            return;
        }

        self.instructions.remove(index);
        self.selected = if self.instructions.is_empty() {
            None
        } else {
            Some(index.min(self.instructions.len() - 1))
        };
    }

    pub fn select_next(&mut self) {
        if self.instructions.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.instructions.len(),
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        if self.instructions.is_empty() {
            return;
        }
        let last = self.instructions.len() - 1;
        self.selected = Some(match self.selected {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    /// Runs every instruction against the chosen folder.
    ///
    /// Queues one dialog per instruction: "Error" with the report's message
    /// when it failed, "Complete" with the counters otherwise.
    pub fn execute(&mut self, engine: &FindAndReplace) {
        if self.instructions.is_empty() {
            self.push_dialog(Dialog::error("Warning", "You didn't enter any instructions."));
            return;
        }
        let Some(folder) = self.source_folder.clone() else {
            self.push_dialog(Dialog::error("Warning", "You didn't enter a folder."));
            return;
        };

        match engine.run_instructions(&folder, &self.instructions) {
            Ok(reports) => {
                for report in reports {
                    if !report.success {
                        self.push_dialog(Dialog::error("Error", report.message()));
                        continue;
                    }
                    let mut message = report.summary();
                    if !report.warnings.is_empty() {
                        message.push_str("\n\nWarnings:");
                        for warning in &report.warnings {
                            message.push('\n');
                            message.push_str(warning);
                        }
                    }
                    self.push_dialog(Dialog::info("Complete", message));
                }
            }
            Err(e) => self.push_dialog(Dialog::error("Error", e.to_string())),
        }
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialogs.push_back(dialog);
    }

    /// The dialog currently shown, if any.
    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    /// Closes the current dialog; the next queued one, if any, takes its place.
    pub fn dismiss_dialog(&mut self) {
        self.dialogs.pop_front();
    }
}

/// Shortens a folder path to its last two components.
fn abbreviate(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(".../{parent}/{name}")
}
