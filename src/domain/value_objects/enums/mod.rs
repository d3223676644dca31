pub mod attempt_statuses;
pub mod checkout_types;
pub mod invoice_statuses;
pub mod reported_statuses;
pub mod user_roles;
