//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`.
//!
//! Four error classes cross the codec boundary: bad arguments (`Value`),
//! file I/O (`Io`), malformed file content (`Format`/`Parse`, the latter
//! carrying a line number), and pedigree/population shape violations
//! (`Structural`). Nothing is retried internally; every failure is surfaced
//! to the immediate caller. Advisory conditions (FSTAT capacity limits,
//! same-sex parent collisions) are `tracing::warn!` diagnostics, not errors.

use thiserror::Error;

/// Main error type for popconv operations
#[derive(Error, Debug)]
pub enum PopconvError {
    /// I/O errors (file missing, permission denied, read/write failures)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or missing arguments (no output path, invalid popType, malformed
    /// allele-frequency table, mismatched loci-count argument)
    #[error("Invalid argument: {message}")]
    Value { message: String },

    /// Malformed file content without a useful line context
    #[error("Format error: {message}")]
    Format { message: String },

    /// Malformed file content at a known line (1-based)
    #[error("Format error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Population or pedigree shape violations (>2 parents per family,
    /// subpopulation/row counts disagreeing with declared totals)
    #[error("Structural error: {message}")]
    Structural { message: String },
}

/// Type alias for Results using PopconvError
pub type Result<T> = std::result::Result<T, PopconvError>;

impl PopconvError {
    /// Create a bad-argument error
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
        }
    }

    /// Create a format error without line context
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a format error at a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }
}
