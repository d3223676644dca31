pub mod invoices;
pub mod payment_attempts;
pub mod reconciliation_ledger;
