use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle of a payment attempt. `Pending` and `Checking` are the only
/// open states; everything else ends the attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttemptStatus {
    Pending,
    Checking,
    Paid,
    Incomplete,
    Cancelled,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::Checking => "checking",
            AttemptStatus::Paid => "paid",
            AttemptStatus::Incomplete => "incomplete",
            AttemptStatus::Cancelled => "cancelled",
            AttemptStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AttemptStatus::Pending),
            "checking" => Some(AttemptStatus::Checking),
            "paid" => Some(AttemptStatus::Paid),
            "incomplete" => Some(AttemptStatus::Incomplete),
            "cancelled" => Some(AttemptStatus::Cancelled),
            "failed" => Some(AttemptStatus::Failed),
            _ => None,
        }
    }

    /// `Incomplete` closes the attempt even though the invoice stays unpaid.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::Pending | AttemptStatus::Checking)
    }
}

impl Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
