use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::invoices::{InsertInvoiceEntity, InvoiceEntity},
        repositories::invoices::InvoiceRepository,
        value_objects::enums::invoice_statuses::InvoiceStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::invoices},
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn create(&self, invoice: InsertInvoiceEntity) -> Result<String> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inv_id = insert_into(invoices::table)
            .values(&invoice)
            .returning(invoices::inv_id)
            .get_result::<String>(&mut conn)?;

        Ok(inv_id)
    }

    async fn find_by_inv_id(&self, inv_id: &str) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice = invoices::table
            .filter(invoices::inv_id.eq(inv_id))
            .select(InvoiceEntity::as_select())
            .first::<InvoiceEntity>(&mut conn)
            .optional()?;

        Ok(invoice)
    }

    async fn mark_expired(&self, inv_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(invoices::table.filter(invoices::inv_id.eq(inv_id)))
            .set((
                invoices::status.eq(InvoiceStatus::Expired.as_str()),
                invoices::updated_at.eq(Some(Utc::now())),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = invoices::table
            .select(InvoiceEntity::as_select())
            .order(invoices::created_at.desc())
            .load::<InvoiceEntity>(&mut conn)?;

        Ok(records)
    }

    async fn list_by_recipient(&self, email: &str) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = invoices::table
            .filter(invoices::recipient_email.eq(email))
            .select(InvoiceEntity::as_select())
            .order(invoices::created_at.desc())
            .load::<InvoiceEntity>(&mut conn)?;

        Ok(records)
    }
}
