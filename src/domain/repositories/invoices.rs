use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity};

#[automock]
#[async_trait]
pub trait InvoiceRepository {
    async fn create(&self, invoice: InsertInvoiceEntity) -> Result<String>;

    async fn find_by_inv_id(&self, inv_id: &str) -> Result<Option<InvoiceEntity>>;

    /// Lazy expiry: persisted the moment validation observes a past due
    /// date, there is no background sweeper.
    async fn mark_expired(&self, inv_id: &str) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<InvoiceEntity>>;

    async fn list_by_recipient(&self, email: &str) -> Result<Vec<InvoiceEntity>>;
}
