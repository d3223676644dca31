use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::reconciliation::TerminalCommit;

#[automock]
#[async_trait]
pub trait ReconciliationLedger {
    /// Applies a terminal settlement as one commit unit: the attempt row and,
    /// when the charge covers the price, the invoice row. Partial application
    /// is a correctness violation; implementations must roll back fully.
    async fn commit_terminal(&self, commit: TerminalCommit) -> Result<()>;
}
