//! Error and warning types for cardprep-core.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using MigrateError.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Errors raised while loading the source corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("malformed source at line {line}: {message}")]
    SourceFormat { line: usize, message: String },

    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors. All of them are raised before any target file is written.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Non-fatal anomaly found while rewriting. Recorded in the report, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteWarning {
    /// Identifier has no mapping entry and was left as-is.
    UnresolvedIdentifier {
        file: PathBuf,
        line: usize,
        id: String,
    },
    /// More physical occurrences of an old identifier than logical pairs.
    PositionalExhaustion {
        file: PathBuf,
        line: usize,
        id: String,
    },
    /// Change-count audit: fewer replacements than the group needs.
    UnderReplacement {
        file: PathBuf,
        expected: usize,
        actual: usize,
    },
    /// Group file whose name carries no group number.
    UnnumberedFile { file: PathBuf },
    /// Reading or writing the file failed; the file was left as-is.
    FileFailed { file: PathBuf, message: String },
}

impl fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedIdentifier { file, line, id } => write!(
                f,
                "{}:{line}: unresolved identifier {id} left unchanged",
                file.display()
            ),
            Self::PositionalExhaustion { file, line, id } => write!(
                f,
                "{}:{line}: no positional pair left for {id}",
                file.display()
            ),
            Self::UnderReplacement {
                file,
                expected,
                actual,
            } => write!(
                f,
                "{}: replaced {actual} identifiers, expected {expected}",
                file.display()
            ),
            Self::UnnumberedFile { file } => {
                write!(f, "{}: no group number in file name, skipped", file.display())
            }
            Self::FileFailed { file, message } => write!(f, "{}: {message}", file.display()),
        }
    }
}
