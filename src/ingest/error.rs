use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read readings file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to decompress '{0}'")]
    Decompress(PathBuf, #[source] std::io::Error),

    #[error("Failed to open archive '{path}'")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive '{0}' contains no CSV file")]
    MissingArchiveEntry(PathBuf),

    #[error("Failed to write decompressed readings to '{0}'")]
    ExtractWrite(PathBuf, #[source] std::io::Error),

    #[error("Parsing error processing CSV data in '{path}'")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Column '{column}' in '{path}' could not be read as {expected}")]
    ColumnType {
        path: PathBuf,
        column: String,
        expected: &'static str,
        #[source]
        source: PolarsError,
    },

    // Row numbers are 1-based and exclude the header line.
    #[error("Missing or non-numeric '{column}' value on row {row} of '{path}'")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
