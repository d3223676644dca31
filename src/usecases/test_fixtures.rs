use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::{
    entities::{invoices::InvoiceEntity, payment_attempts::PaymentAttemptEntity},
    value_objects::{
        enums::{
            attempt_statuses::AttemptStatus, checkout_types::CheckoutType, user_roles::UserRole,
        },
        session::CacheSessionEntry,
    },
};

pub const PAYER_EMAIL: &str = "payer@example.com";

pub fn active_user(role: UserRole) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: PAYER_EMAIL.to_string(),
        name: "Payer Person".to_string(),
        role,
    }
}

pub fn due_tomorrow() -> NaiveDate {
    (Utc::now() + Duration::days(1)).date_naive()
}

pub fn due_yesterday() -> NaiveDate {
    (Utc::now() - Duration::days(1)).date_naive()
}

pub fn invoice(inv_id: &str, price: Decimal, due_date: NaiveDate) -> InvoiceEntity {
    InvoiceEntity {
        inv_id: inv_id.to_string(),
        title: "Consultation".to_string(),
        description: "Document review session".to_string(),
        price,
        recipient_email: PAYER_EMAIL.to_string(),
        due_date,
        status: "pending".to_string(),
        paid: false,
        paid_at: None,
        ref_id: None,
        processor_transaction_ref: None,
        created_at: Utc::now(),
        created_by: "Staff Member".to_string(),
        updated_at: None,
        updated_by: None,
    }
}

pub fn attempt(
    ref_id: &str,
    inv_id: &str,
    status: AttemptStatus,
    amount: Decimal,
) -> PaymentAttemptEntity {
    PaymentAttemptEntity {
        ref_id: ref_id.to_string(),
        inv_id: inv_id.to_string(),
        amount,
        payer_email: PAYER_EMAIL.to_string(),
        paid_by: "Payer Person".to_string(),
        checkout_type: CheckoutType::HostedCheckout.as_str().to_string(),
        payment_type: CheckoutType::HostedCheckout.display_name().to_string(),
        status: status.as_str().to_string(),
        processor_ref: Some("FLW-MOCK-1".to_string()),
        processor_transaction_id: None,
        paid: false,
        paid_amount: None,
        paid_at: None,
        created_at: Utc::now(),
    }
}

pub fn session_entry(ref_id: &str, inv_id: &str) -> CacheSessionEntry {
    CacheSessionEntry {
        ref_id: ref_id.to_string(),
        inv_id: inv_id.to_string(),
        checkout_type: CheckoutType::HostedCheckout,
        processor_ref: Some("FLW-MOCK-1".to_string()),
        processor_tx_ref: ref_id.to_string(),
        transaction_id: None,
    }
}
