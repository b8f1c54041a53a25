//! Cross-cutting error classification.
//!
//! Front ends map [`ErrorKind`] to transport statuses or exit codes without
//! matching every service-specific variant.

use serde::Serialize;

/// Coarse failure classes shared by every service error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before any store mutation.
    Validation,
    /// Target entity does not exist.
    NotFound,
    /// Detected mid-transaction; partial writes were rolled back.
    Conflict,
    /// Store unavailable or returned unusable data. Not retried by core.
    Infrastructure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Infrastructure => "infrastructure",
        }
    }
}
