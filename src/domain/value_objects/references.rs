use chrono::Utc;
use rand::Rng;

/// Opaque reference for a payment attempt. Uniqueness is backed by the
/// ledger's primary key; a collision is a programming error, not a
/// recoverable condition.
pub fn new_payment_ref() -> String {
    format!(
        "REF-{}{:04}",
        Utc::now().timestamp(),
        rand::thread_rng().gen_range(0..10_000)
    )
}

/// Opaque invoice identifier, generated once at creation.
pub fn new_invoice_id() -> String {
    format!(
        "INV-{}{:04}",
        Utc::now().timestamp(),
        rand::thread_rng().gen_range(0..10_000)
    )
}
