use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::payment_attempts::{InsertPaymentAttemptEntity, PaymentAttemptEntity},
        repositories::payment_attempts::PaymentAttemptRepository,
        value_objects::enums::attempt_statuses::AttemptStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payment_attempts},
};

const OPEN_STATUSES: [&str; 2] = ["pending", "checking"];

pub struct PaymentAttemptPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentAttemptPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentAttemptRepository for PaymentAttemptPostgres {
    async fn create(&self, attempt: InsertPaymentAttemptEntity) -> Result<String> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let ref_id = insert_into(payment_attempts::table)
            .values(&attempt)
            .returning(payment_attempts::ref_id)
            .get_result::<String>(&mut conn)?;

        Ok(ref_id)
    }

    async fn find_by_ref_id(&self, ref_id: &str) -> Result<Option<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let attempt = payment_attempts::table
            .filter(payment_attempts::ref_id.eq(ref_id))
            .select(PaymentAttemptEntity::as_select())
            .first::<PaymentAttemptEntity>(&mut conn)
            .optional()?;

        Ok(attempt)
    }

    async fn list_by_invoice(&self, inv_id: &str) -> Result<Vec<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = payment_attempts::table
            .filter(payment_attempts::inv_id.eq(inv_id))
            .select(PaymentAttemptEntity::as_select())
            .order(payment_attempts::created_at.desc())
            .load::<PaymentAttemptEntity>(&mut conn)?;

        Ok(records)
    }

    async fn list_all(&self) -> Result<Vec<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = payment_attempts::table
            .select(PaymentAttemptEntity::as_select())
            .order(payment_attempts::created_at.desc())
            .load::<PaymentAttemptEntity>(&mut conn)?;

        Ok(records)
    }

    async fn list_by_payer(&self, email: &str) -> Result<Vec<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = payment_attempts::table
            .filter(payment_attempts::payer_email.eq(email))
            .select(PaymentAttemptEntity::as_select())
            .order(payment_attempts::created_at.desc())
            .load::<PaymentAttemptEntity>(&mut conn)?;

        Ok(records)
    }

    async fn list_open(&self) -> Result<Vec<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = payment_attempts::table
            .filter(payment_attempts::status.eq_any(OPEN_STATUSES))
            .select(PaymentAttemptEntity::as_select())
            .order(payment_attempts::created_at.desc())
            .load::<PaymentAttemptEntity>(&mut conn)?;

        Ok(records)
    }

    async fn list_open_by_payer(&self, email: &str) -> Result<Vec<PaymentAttemptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let records = payment_attempts::table
            .filter(payment_attempts::payer_email.eq(email))
            .filter(payment_attempts::status.eq_any(OPEN_STATUSES))
            .select(PaymentAttemptEntity::as_select())
            .order(payment_attempts::created_at.desc())
            .load::<PaymentAttemptEntity>(&mut conn)?;

        Ok(records)
    }

    async fn update_status(&self, ref_id: &str, status: AttemptStatus) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payment_attempts::table.filter(payment_attempts::ref_id.eq(ref_id)))
            .set(payment_attempts::status.eq(status.as_str()))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn begin_checking(&self, ref_id: &str, transaction_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payment_attempts::table.filter(payment_attempts::ref_id.eq(ref_id)))
            .set((
                payment_attempts::status.eq(AttemptStatus::Checking.as_str()),
                payment_attempts::processor_transaction_id.eq(Some(transaction_id)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
