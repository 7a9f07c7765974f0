use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Number;
use tracing::{debug, info};

use crate::domain::TableError;
use crate::fields::{FieldDescriptor, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq)]
enum SourceFormat {
    Json,
    Csv,
    Parquet,
    Ipc,
}

impl SourceFormat {
    fn from_extension(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(SourceFormat::Json),
            Some("csv") => Ok(SourceFormat::Csv),
            Some("parquet" | "pq") => Ok(SourceFormat::Parquet),
            Some("arrow" | "ipc" | "feather") => Ok(SourceFormat::Ipc),
            _ => Err(TableError::UnknownFileType),
        }
    }

    /// Lazy polars scan for the columnar formats, `None` for JSON.
    fn scan(self, path: &Path) -> Option<PolarsResult<LazyFrame>> {
        let local = || PlPath::Local(path.into());
        match self {
            SourceFormat::Json => None,
            SourceFormat::Csv => Some(LazyCsvReader::new(local()).with_has_header(true).finish()),
            SourceFormat::Parquet => {
                Some(LazyFrame::scan_parquet(local(), ScanArgsParquet::default()))
            }
            SourceFormat::Ipc => Some(LazyFrame::scan_ipc(
                local(),
                polars::io::ipc::IpcScanOptions,
                UnifiedScanArgs::default(),
            )),
        }
    }
}

/// A regular file that was checked before reading.
#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    size: u64,
    format: SourceFormat,
}

impl SourceFile {
    fn inspect(path: PathBuf) -> Result<Self, TableError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TableError::FileNotFound,
            ErrorKind::PermissionDenied => TableError::PermissionDenied,
            _ => TableError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TableError::LoadingFailed(format!("{} is not a file", path.display())));
        }
        let format = SourceFormat::from_extension(&path)?;
        Ok(Self {
            size: metadata.len(),
            path,
            format,
        })
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Table input read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub title: Option<String>,
    pub id: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    /// File name, used as fallback title.
    pub source: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Document {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        id: Option<String>,
        fields: Vec<FieldDescriptor>,
    },
    Fields(Vec<FieldDescriptor>),
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, TableError> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TableError::LoadingFailed(e.to_string()))
}

pub fn load_file(path: PathBuf) -> Result<LoadedTable, TableError> {
    let file = SourceFile::inspect(path)?;
    let source = file.name();
    debug!("Loading {:?} as {:?} ({} bytes)", file.path, file.format, file.size);

    let start_time = Instant::now();
    let table = match file.format.scan(&file.path) {
        None => load_json(&file.path, source)?,
        Some(frame) => load_frame(frame?, source)?,
    };
    info!(
        "Loading {} fields took {}ms ...",
        table.fields.len(),
        start_time.elapsed().as_millis()
    );
    Ok(table)
}

fn load_json(path: &Path, source: String) -> Result<LoadedTable, TableError> {
    let text = fs::read_to_string(path)?;
    let table = match serde_json::from_str::<JsonInput>(&text)? {
        JsonInput::Document { title, id, fields } => LoadedTable {
            title,
            id,
            fields,
            source,
        },
        JsonInput::Fields(fields) => LoadedTable {
            title: None,
            id: None,
            fields,
            source,
        },
    };
    Ok(table)
}

// Each column is converted in its own rayon task.
fn load_frame(frame: LazyFrame, source: String) -> Result<LoadedTable, TableError> {
    let df = Arc::new(frame.collect()?);
    let fields: Result<Vec<FieldDescriptor>, _> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(&df, name, &source))
        .collect();

    Ok(LoadedTable {
        title: None,
        id: None,
        fields: fields?,
        source,
    })
}

fn load_column(
    df: &DataFrame,
    col_name: &str,
    source: &str,
) -> Result<FieldDescriptor, PolarsError> {
    let column = df.column(col_name)?;
    let dtype = column.dtype();
    let numeric = dtype.is_integer() || dtype.is_float();
    let boolean = dtype.is_bool();

    let text = column.cast(&DataType::String)?;
    let data = text
        .str()?
        .into_iter()
        .map(|value| match value {
            None => FieldValue::Null,
            Some(s) if numeric => s
                .parse::<Number>()
                .map(FieldValue::Number)
                .unwrap_or_else(|_| FieldValue::from(s)),
            Some(s) if boolean => FieldValue::Bool(s == "true"),
            Some(s) => FieldValue::from(s),
        })
        .collect();

    Ok(FieldDescriptor {
        name: col_name.to_string(),
        data_path: format!("{source}:{col_name}"),
        data,
    })
}
