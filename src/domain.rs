use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;

/// How long a copy widget stays in its confirmed state before reverting.
pub const COPY_DWELL: Duration = Duration::from_millis(2000);

pub const COPY_LABEL: &str = "Copy to clipboard";
pub const COPIED_LABEL: &str = "Copied!";

pub const NO_CONTENT_MESSAGE: &str = "No content available";
pub const NO_DATA_MESSAGE: &str = "No data available";

pub const HELP_TEXT: &str = "\
Navigation
  ←/h →/l ↑/k ↓/j   move cell cursor
  Enter             activate selected row
  c / y             copy selected cell (copyable columns only)
  r                 re-render table
  ?                 toggle this help
  q                 quit";

#[derive(Debug)]
pub enum TableError {
    IoError(Error),
    PolarsError(PolarsError),
    JsonError(serde_json::Error),
    ClipboardError(arboard::Error),
    TaskError(tokio::task::JoinError),
    Clipboard(String),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::IoError(e) => write!(f, "io error: {e}"),
            TableError::PolarsError(e) => write!(f, "could not read table: {e}"),
            TableError::JsonError(e) => write!(f, "invalid field data: {e}"),
            TableError::ClipboardError(e) => write!(f, "clipboard unavailable: {e}"),
            TableError::TaskError(e) => write!(f, "background task failed: {e}"),
            TableError::Clipboard(msg) => write!(f, "clipboard write rejected: {msg}"),
            TableError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            TableError::FileNotFound => write!(f, "file not found"),
            TableError::PermissionDenied => write!(f, "permission denied"),
            TableError::UnknownFileType => write!(f, "unknown file type"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::IoError(e) => Some(e),
            TableError::PolarsError(e) => Some(e),
            TableError::JsonError(e) => Some(e),
            TableError::ClipboardError(e) => Some(e),
            TableError::TaskError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for TableError {
    fn from(err: Error) -> Self {
        TableError::IoError(err)
    }
}

impl From<PolarsError> for TableError {
    fn from(err: PolarsError) -> Self {
        TableError::PolarsError(err)
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        TableError::JsonError(err)
    }
}

impl From<arboard::Error> for TableError {
    fn from(err: arboard::Error) -> Self {
        TableError::ClipboardError(err)
    }
}

impl From<tokio::task::JoinError> for TableError {
    fn from(err: tokio::task::JoinError) -> Self {
        TableError::TaskError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            log_file: PathBuf::from("fieldtable.log"),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    ActivateRow,
    CopyCell,
    Rerender,
    Help,
    Exit,
    Resize(usize, usize),
}
