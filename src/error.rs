//! Diagnostics raised while scanning a single input file.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferError {
    /// A row disagrees with the column count fixed by the first row.
    /// Scanning of that file stops; rows already seen still produce DDL.
    #[error("Line {line} has {found} elements instead of {expected}")]
    RowShape {
        line: usize,
        found: usize,
        expected: usize,
        preview: Vec<String>,
    },

    #[error("Input {path:?} contains no rows")]
    EmptyInput { path: PathBuf },
}

impl InferError {
    /// The leading fields of a rejected row, for diagnostics.
    pub fn preview(&self) -> &[String] {
        match self {
            InferError::RowShape { preview, .. } => preview,
            InferError::EmptyInput { .. } => &[],
        }
    }
}
