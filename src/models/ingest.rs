//! File ingestion models.
//!
//! A raw [`IngestionRequest`] is resolved by the ingestion planner into a
//! [`FileType`] and a matching [`ReaderOptions`] variant, with defaults applied
//! once at construction.

use crate::error::{DbError, DbResult};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

/// Supported source file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Parquet,
    Json,
}

impl FileType {
    /// Parse an explicit `file_type` hint (case-insensitive).
    pub fn parse(s: &str) -> DbResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            other => Err(DbError::invalid_input(format!(
                "unsupported file type: {other} (expected csv, parquet or json)"
            ))),
        }
    }

    /// Infer the type from the path's extension.
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "" => Err(DbError::invalid_input(format!(
                "cannot infer file type of {}: no extension; pass file_type explicitly",
                path.display()
            ))),
            other => Err(DbError::invalid_input(format!(
                "unsupported file extension: .{other}"
            ))),
        }
    }

    /// DuckDB table function that reads this format.
    pub fn reader_function(&self) -> &'static str {
        match self {
            Self::Csv => "read_csv",
            Self::Parquet => "read_parquet",
            Self::Json => "read_json",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Parquet => write!(f, "parquet"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// CSV reader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// First line holds column names. Default: true
    pub header: bool,
    /// Field separator. Default: ","
    pub delimiter: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: ",".to_string(),
        }
    }
}

impl CsvOptions {
    /// Read `header` and `delimiter` from a loosely typed options map.
    /// Missing or mistyped entries keep their defaults.
    pub fn from_options(options: &Map<String, JsonValue>) -> Self {
        let defaults = Self::default();
        Self {
            header: options
                .get("header")
                .and_then(JsonValue::as_bool)
                .unwrap_or(defaults.header),
            delimiter: options
                .get("delimiter")
                .and_then(JsonValue::as_str)
                .filter(|d| !d.is_empty())
                .map(String::from)
                .unwrap_or(defaults.delimiter),
        }
    }
}

/// Reader configuration, one variant per file type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderOptions {
    Csv(CsvOptions),
    Parquet,
    Json,
}

impl ReaderOptions {
    /// Select the variant for `file_type`. Only CSV consults the options map.
    pub fn for_file_type(file_type: FileType, options: &Map<String, JsonValue>) -> Self {
        match file_type {
            FileType::Csv => Self::Csv(CsvOptions::from_options(options)),
            FileType::Parquet => Self::Parquet,
            FileType::Json => Self::Json,
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Self::Csv(_) => FileType::Csv,
            Self::Parquet => FileType::Parquet,
            Self::Json => FileType::Json,
        }
    }
}

/// Request to materialize a file as a table.
#[derive(Debug, Clone, Default)]
pub struct IngestionRequest {
    pub table_name: String,
    pub file_path: String,
    /// Explicit type hint; inferred from the extension when absent or empty.
    pub file_type: Option<String>,
    pub options: Map<String, JsonValue>,
}

impl IngestionRequest {
    pub fn new(table_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            file_path: file_path.into(),
            file_type: None,
            options: Map::new(),
        }
    }

    /// Set the file type hint.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Add a reader option.
    pub fn with_option(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Resolve the file type from the hint or, failing that, the extension.
    pub fn resolve_file_type(&self) -> DbResult<FileType> {
        match self.file_type.as_deref().map(str::trim) {
            Some(hint) if !hint.is_empty() => FileType::parse(hint),
            _ => FileType::from_path(Path::new(&self.file_path)),
        }
    }
}
