//! Error types for the catalog layer.

use std::fmt;

use thiserror::Error;

/// Catalog operation result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// How far an error is allowed to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Aborts the operation and reaches the caller.
    Fatal,
    /// Logged; the operation keeps whatever it already produced.
    Error,
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Fatal | Severity::Error => log::Level::Error,
        }
    }
}

/// A database failure reformatted with its result codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFault {
    /// Original driver message.
    pub message: String,
    /// SQLite extended result code, `-1` when the failure did not come from SQLite itself.
    pub code: i32,
    /// Primary result code name, e.g. `ConstraintViolation`.
    pub state: String,
}

impl fmt::Display for SqlFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (SQLite error code: {}, state: {})",
            self.message, self.code, self.state
        )
    }
}

/// Catalog errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// No usable session: not initialized, cannot open, I/O, locking.
    #[error("Transport fault: {0}")]
    Transport(SqlFault),

    /// The store rejected a statement or a row failed to decode.
    #[error("Query fault: {0}")]
    Query(SqlFault),

    /// A registered column is missing from a result set or a record type.
    #[error("Schema fault: registered column `{column}` is absent")]
    Schema { column: String },

    /// The folder chain above a track loops or exceeds the depth bound.
    #[error("Path integrity fault: track {track_id} in namespace `{namespace}`: {reason}")]
    PathIntegrity {
        track_id: i64,
        namespace: String,
        reason: String,
    },
}

impl DbError {
    /// Error raised when an operation runs without an open session.
    pub fn not_initialized() -> Self {
        Self::Transport(SqlFault {
            message: "database session is not initialized".to_string(),
            code: -1,
            state: "NotInitialized".to_string(),
        })
    }

    /// Create a path integrity error.
    pub fn path_integrity(track_id: i64, namespace: &str, reason: impl Into<String>) -> Self {
        Self::PathIntegrity {
            track_id,
            namespace: namespace.to_string(),
            reason: reason.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Query(_) => Severity::Error,
            Self::Transport(_) | Self::Schema { .. } | Self::PathIntegrity { .. } => {
                Severity::Fatal
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
