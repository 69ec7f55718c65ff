use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which side of a temperature threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    High,
    Low,
}

impl AlertKind {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::High => "high",
            AlertKind::Low => "low",
        }
    }

    /// Human-readable name used in notification emails.
    pub fn display_name(&self) -> &'static str {
        match self {
            AlertKind::High => "High Temperature",
            AlertKind::Low => "Low Temperature",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(AlertKind::High),
            "low" => Ok(AlertKind::Low),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid alert kind: {}. Supported: high, low",
                s
            ))),
        }
    }
}
