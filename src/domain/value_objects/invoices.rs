use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entities::invoices::InvoiceEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceModel {
    pub title: String,
    pub desc: String,
    pub price: Decimal,
    pub to_email: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CreateInvoiceReceipt {
    pub msg: String,
    #[serde(rename = "invoiceId")]
    pub invoice_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
    pub inv_id: String,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub recipient_email: String,
    pub due_date: NaiveDate,
    pub status: String,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<InvoiceEntity> for InvoiceDto {
    fn from(entity: InvoiceEntity) -> Self {
        Self {
            inv_id: entity.inv_id,
            title: entity.title,
            description: entity.description,
            price: entity.price,
            recipient_email: entity.recipient_email,
            due_date: entity.due_date,
            status: entity.status,
            paid: entity.paid,
            paid_at: entity.paid_at,
            created_at: entity.created_at,
            created_by: entity.created_by,
        }
    }
}
