use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payment_attempts::{
    InsertPaymentAttemptEntity, PaymentAttemptEntity,
};
use crate::domain::value_objects::enums::attempt_statuses::AttemptStatus;

#[automock]
#[async_trait]
pub trait PaymentAttemptRepository {
    async fn create(&self, attempt: InsertPaymentAttemptEntity) -> Result<String>;

    async fn find_by_ref_id(&self, ref_id: &str) -> Result<Option<PaymentAttemptEntity>>;

    async fn list_by_invoice(&self, inv_id: &str) -> Result<Vec<PaymentAttemptEntity>>;

    async fn list_all(&self) -> Result<Vec<PaymentAttemptEntity>>;

    async fn list_by_payer(&self, email: &str) -> Result<Vec<PaymentAttemptEntity>>;

    /// Attempts still in `pending` or `checking`.
    async fn list_open(&self) -> Result<Vec<PaymentAttemptEntity>>;

    async fn list_open_by_payer(&self, email: &str) -> Result<Vec<PaymentAttemptEntity>>;

    /// Single-record status write; terminal settlements that also touch the
    /// invoice go through the reconciliation ledger instead.
    async fn update_status(&self, ref_id: &str, status: AttemptStatus) -> Result<()>;

    /// `pending -> checking`, persisting the processor's asynchronous
    /// transaction identifier.
    async fn begin_checking(&self, ref_id: &str, transaction_id: &str) -> Result<()>;
}
