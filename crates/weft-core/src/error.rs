//! Error types for Weft.
//!
//! Structural construction errors (shape mismatches, unknown or duplicate
//! slugs) are caller bugs and fail the call immediately. Per-cell resolution
//! gaps never surface here — they become sentinel values (see
//! [`crate::value::ErrorValueKind`]) so a single unresolvable cell cannot
//! abort a join.

use thiserror::Error;

/// Result type alias for Weft operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Weft operations.
///
/// Error codes follow the pattern `WEFT-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Column arrays of unequal length (WEFT-001).
    #[error("[WEFT-001] Column '{slug}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        /// Offending column slug.
        slug: String,
        /// Row count shared by the other columns.
        expected: usize,
        /// Length of the offending array.
        actual: usize,
    },

    /// Column not found (WEFT-002).
    #[error("[WEFT-002] Unknown column '{0}'")]
    UnknownColumn(String),

    /// Column slug already present (WEFT-003).
    #[error("[WEFT-003] Duplicate column slug '{0}'")]
    DuplicateSlug(String),

    /// Dimension configured without a slug (WEFT-004).
    ///
    /// Slugs must be assigned upstream: two configurations of the same
    /// variable (e.g. different target times) need distinguishable slugs.
    #[error("[WEFT-004] No column slug assigned for variable {variable_id}")]
    MissingColumnSlug {
        /// The variable whose dimension lacks a slug.
        variable_id: u64,
    },

    /// Malformed epoch or calendar date string (WEFT-005).
    #[error("[WEFT-005] Failed to parse date '{0}'")]
    DateParse(String),

    /// CSV serialization error (WEFT-006).
    #[error("[WEFT-006] CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error (WEFT-007).
    #[error("[WEFT-007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (WEFT-008).
    #[error("[WEFT-008] Configuration error: {0}")]
    Config(String),

    /// Internal error (WEFT-009).
    ///
    /// Indicates an unexpected internal inconsistency. Please report if
    /// encountered.
    #[error("[WEFT-009] Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g. "WEFT-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => "WEFT-001",
            Self::UnknownColumn(_) => "WEFT-002",
            Self::DuplicateSlug(_) => "WEFT-003",
            Self::MissingColumnSlug { .. } => "WEFT-004",
            Self::DateParse(_) => "WEFT-005",
            Self::Csv(_) => "WEFT-006",
            Self::Io(_) => "WEFT-007",
            Self::Config(_) => "WEFT-008",
            Self::Internal(_) => "WEFT-009",
        }
    }

    /// Returns true if this error is recoverable by fixing the call.
    ///
    /// Internal errors are not — they indicate an engine bug.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
