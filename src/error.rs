use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::ColumnKind;

/// Everything that can go wrong while loading or reducing a lightcurve table.
#[derive(Debug, Error)]
pub enum LcError {
    /// The input file is missing or could not be read.
    #[error("cannot read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The delimited text is malformed (ragged rows, bad encoding, no header).
    #[error("malformed table{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        line: Option<u64>,
        message: String,
    },

    /// Ordering or arithmetic was requested on a column that is not numeric.
    #[error("column '{column}' holds {kind} values; a numeric column is required")]
    InvalidOperandKind { column: String, kind: ColumnKind },

    #[error("band '{band}' is not present in the lightcurve")]
    MissingBand { band: String },

    #[error("no column named '{column}'")]
    MissingColumn { column: String },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    Shape {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("column '{column}' appears more than once")]
    DuplicateColumn { column: String },
}

pub type Result<T> = std::result::Result<T, LcError>;

impl LcError {
    pub(crate) fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        LcError::Parse {
            line,
            message: message.into(),
        }
    }
}
