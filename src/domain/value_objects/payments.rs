use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entities::payment_attempts::PaymentAttemptEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub cardno: String,
    pub expirymonth: String,
    pub expiryyear: String,
    pub cvv: String,
    pub pin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCardModel {
    pub ref_id: String,
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct BankTransferInstructions {
    pub ref_id: String,
    pub bank_name: String,
    pub bank_account: String,
    pub expires_in: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CardChargeOutcome {
    pub ref_id: String,
    #[serde(rename = "validationRequired")]
    pub validation_required: bool,
}

#[derive(Debug, Serialize)]
pub struct CardVerifyReceipt {
    #[serde(rename = "transactionComplete")]
    pub transaction_complete: bool,
    pub ref_id: String,
    pub inv_id: String,
    pub amount: Decimal,
    #[serde(rename = "chargedamount")]
    pub charged_amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct BankTransferVerifyReceipt {
    pub msg: String,
    #[serde(rename = "transactionComplete")]
    pub transaction_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckoutLinkDto {
    pub ref_id: String,
    pub status: String,
    pub link: String,
    pub link_type: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub status: String,
    pub ref_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentsDto {
    pub status: String,
    pub msg: String,
}

/// One serializer per entity; every listing endpoint goes through this.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecordDto {
    pub ref_id: String,
    pub invoice_id: String,
    pub amount: Decimal,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payer_email: String,
    pub paid_by: String,
    pub payment_type: String,
    pub status: String,
}

impl From<PaymentAttemptEntity> for PaymentRecordDto {
    fn from(entity: PaymentAttemptEntity) -> Self {
        Self {
            ref_id: entity.ref_id,
            invoice_id: entity.inv_id,
            amount: entity.amount,
            paid: entity.paid,
            paid_at: entity.paid_at,
            payer_email: entity.payer_email,
            paid_by: entity.paid_by,
            payment_type: entity.payment_type,
            status: entity.status,
        }
    }
}
