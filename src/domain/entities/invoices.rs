use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::infrastructure::postgres::schema::invoices;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices, primary_key(inv_id))]
pub struct InvoiceEntity {
    pub inv_id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub recipient_email: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub ref_id: Option<String>,
    pub processor_transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub inv_id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub recipient_email: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}
