use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Status values the processor (or the post-redirect client) is allowed to
/// report on a callback. Anything else is rejected at the boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportedStatus {
    Completed,
    Cancelled,
    Failed,
}

impl ReportedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportedStatus::Completed => "completed",
            ReportedStatus::Cancelled => "cancelled",
            ReportedStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(ReportedStatus::Completed),
            "cancelled" => Some(ReportedStatus::Cancelled),
            "failed" => Some(ReportedStatus::Failed),
            _ => None,
        }
    }
}

impl Display for ReportedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
