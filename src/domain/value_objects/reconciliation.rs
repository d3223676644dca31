use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::value_objects::enums::{
    attempt_statuses::AttemptStatus, reported_statuses::ReportedStatus,
};

/// External signal fed into the reconciliation engine by the callback
/// endpoint, in either its webhook or post-redirect encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSignal {
    pub ref_id: String,
    pub status: ReportedStatus,
    pub transaction_id: Option<String>,
}

impl CallbackSignal {
    /// Validates the raw callback parameters. A `completed` report without a
    /// transaction identifier is malformed, as is any status outside the
    /// closed set.
    pub fn from_parts(
        ref_id: &str,
        status: &str,
        transaction_id: Option<String>,
    ) -> Result<Self, String> {
        let status = ReportedStatus::from_str(status)
            .ok_or_else(|| format!("Unrecognized transaction status => '{}'", status))?;

        if status == ReportedStatus::Completed && transaction_id.is_none() {
            return Err("transaction id can't be empty when status is completed".to_string());
        }

        Ok(Self {
            ref_id: ref_id.to_string(),
            status,
            transaction_id,
        })
    }
}

/// What the engine did with an ingested signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    Cancelled,
    Failed,
    /// Attempt moved to `checking`; authoritative verification still has
    /// to run (deferred task or manual re-check).
    VerificationQueued,
}

/// Result of driving an attempt through authoritative verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The session entry was gone: the attempt was already resolved by a
    /// competing caller (or never existed).
    AlreadyResolved,
    /// The processor confirmed a charge and the terminal state was
    /// committed.
    Settled {
        status: AttemptStatus,
        receipt: SettlementReceipt,
    },
    /// The processor answered but reported a non-success status; the
    /// attempt was closed with it and the invoice left untouched.
    ReportedFailure { status: AttemptStatus },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub ref_id: String,
    pub inv_id: String,
    pub amount: Decimal,
    pub charged_amount: Decimal,
    pub currency: String,
}

/// The atomic unit a terminal transition writes to the ledger: the attempt
/// update and, on full payment, the invoice update, in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalCommit {
    pub ref_id: String,
    pub inv_id: String,
    pub attempt_status: AttemptStatus,
    pub paid_amount: Decimal,
    pub processor_transaction_ref: String,
    pub paid_at: DateTime<Utc>,
}

impl TerminalCommit {
    pub fn marks_invoice_paid(&self) -> bool {
        self.attempt_status == AttemptStatus::Paid
    }
}
