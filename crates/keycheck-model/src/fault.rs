//! Fatal configuration and schema faults.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::file_type::FileType;

/// The role a key plays on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Primary,
    Foreign,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Primary => f.write_str("primary"),
            KeyRole::Foreign => f.write_str("foreign"),
        }
    }
}

/// Fatal faults that abort a validation run immediately.
///
/// Data-quality findings never appear here; they flow through the
/// [`Reporter`](crate::Reporter) and the run continues. A fault means the
/// schema, configuration, or input shape is broken and no usable report can
/// be produced.
#[derive(Debug, Error)]
pub enum Fault {
    #[error(
        "expected a {role} key in {file_type} file '{file_name}' at line {line_number}"
    )]
    MissingKey {
        file_type: FileType,
        file_name: String,
        line_number: u64,
        role: KeyRole,
    },

    #[error(
        "key field index {index} outside row of width {width} in {file_type} file '{file_name}' at line {line_number}"
    )]
    FieldIndexOutOfRange {
        file_type: FileType,
        file_name: String,
        line_number: u64,
        index: usize,
        width: usize,
    },

    #[error("cyclic dependency among file types: {}", format_types(.types))]
    CyclicDependency { types: Vec<FileType> },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("file type {0} is not declared in the schema")]
    UnknownFileType(FileType),

    #[error("validation cancelled")]
    Cancelled,

    #[error("row source failure on '{path}': {message}")]
    RowSource { path: PathBuf, message: String },
}

impl Fault {
    pub fn row_source(path: &Path, error: &impl fmt::Display) -> Self {
        Fault::RowSource {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

fn format_types(types: &[FileType]) -> String {
    types
        .iter()
        .map(FileType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Fault>;
