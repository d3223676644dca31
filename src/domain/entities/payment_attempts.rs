use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::infrastructure::postgres::schema::payment_attempts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_attempts, primary_key(ref_id))]
pub struct PaymentAttemptEntity {
    pub ref_id: String,
    pub inv_id: String,
    pub amount: Decimal,
    pub payer_email: String,
    pub paid_by: String,
    pub checkout_type: String,
    pub payment_type: String,
    pub status: String,
    pub processor_ref: Option<String>,
    pub processor_transaction_id: Option<String>,
    pub paid: bool,
    pub paid_amount: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_attempts)]
pub struct InsertPaymentAttemptEntity {
    pub ref_id: String,
    pub inv_id: String,
    pub amount: Decimal,
    pub payer_email: String,
    pub paid_by: String,
    pub checkout_type: String,
    pub payment_type: String,
    pub status: String,
    pub processor_ref: Option<String>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}
