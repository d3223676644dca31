use anyhow::Result;
use async_trait::async_trait;
use diesel::{Connection, RunQueryDsl, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        repositories::reconciliation_ledger::ReconciliationLedger,
        value_objects::{
            enums::invoice_statuses::InvoiceStatus, reconciliation::TerminalCommit,
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{invoices, payment_attempts},
    },
};

pub struct ReconciliationLedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReconciliationLedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReconciliationLedger for ReconciliationLedgerPostgres {
    async fn commit_terminal(&self, commit: TerminalCommit) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            update(payment_attempts::table.filter(payment_attempts::ref_id.eq(&commit.ref_id)))
                .set((
                    payment_attempts::status.eq(commit.attempt_status.as_str()),
                    payment_attempts::paid.eq(commit.marks_invoice_paid()),
                    payment_attempts::paid_amount.eq(Some(commit.paid_amount)),
                    payment_attempts::paid_at.eq(Some(commit.paid_at)),
                    payment_attempts::processor_transaction_id
                        .eq(Some(commit.processor_transaction_ref.clone())),
                ))
                .execute(conn)?;

            if commit.marks_invoice_paid() {
                update(invoices::table.filter(invoices::inv_id.eq(&commit.inv_id)))
                    .set((
                        invoices::paid.eq(true),
                        invoices::status.eq(InvoiceStatus::Paid.as_str()),
                        invoices::paid_at.eq(Some(commit.paid_at)),
                        invoices::ref_id.eq(Some(commit.ref_id.clone())),
                        invoices::processor_transaction_ref
                            .eq(Some(commit.processor_transaction_ref.clone())),
                        invoices::updated_at.eq(Some(commit.paid_at)),
                    ))
                    .execute(conn)?;
            }

            Ok(())
        })?;

        Ok(())
    }
}
