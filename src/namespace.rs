//! Library partition keys.

use std::fmt;

/// Namespace used whenever a caller omits one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A normalized namespace; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Maps an empty name to [`DEFAULT_NAMESPACE`].
    pub fn normalize(raw: &str) -> Self {
        if raw.is_empty() {
            Self(DEFAULT_NAMESPACE.to_string())
        } else {
            Self(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Namespace {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
