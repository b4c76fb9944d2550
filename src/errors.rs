use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in the `docsub` application.
///
/// Recoverable conditions such as a missing folder or a folder without any
/// templates are not errors; they are reported through a failed
/// [`FindReplaceReport`](crate::report::FindReplaceReport). This enum covers
/// invalid input and everything that goes wrong underneath.
#[derive(Error, Debug)]
pub enum Error {
    /// The text to find was empty or only whitespace.
    #[error("Find text must not be blank")]
    BlankFind,

    /// The replacement text was empty or only whitespace.
    #[error("Replace text must not be blank")]
    BlankReplace,

    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The `.docx` package could not be read or written as a ZIP archive.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A package was readable but is not a usable Word document.
    #[error("Invalid document {path}: {message}")]
    Document { path: PathBuf, message: String },

    /// An error that occurred while parsing a YAML configuration file.
    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the `ignore` crate, which is used for folder listing.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// An error from the `walkdir` crate.
    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// An error related to persisting a temporary file.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// An error related to CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document part was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A convenient type alias for `Result<T, docsub::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` for errors caused by a blank find or replace text.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::BlankFind | Error::BlankReplace)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
