use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the catalog writer does when a row collides with one already written in the same run.
///
/// A package collides when its origin is already in the catalog. A dependency or file row
/// collides when its owning package already has a row with the same dependency origin or
/// file path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Keep the first row. A colliding package is dropped together with all of its
    /// dependency and file rows; a colliding dependency or file row is dropped on its own.
    #[default]
    Skip,
    /// Fail the run on the first collision. Nothing is committed.
    Abort,
    /// The later row wins. A colliding package first has its earlier package, dependency
    /// and file rows deleted.
    Replace,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Abort => "abort",
            ConflictPolicy::Replace => "replace",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ConflictPolicy::Skip),
            "abort" => Ok(ConflictPolicy::Abort),
            "replace" | "overwrite" => Ok(ConflictPolicy::Replace),
            _ => Err(ConfigError::InvalidConflictPolicy(s.to_string())),
        }
    }
}
