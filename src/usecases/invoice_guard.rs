use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::{
    entities::invoices::InvoiceEntity,
    repositories::{
        invoices::InvoiceRepository, payment_attempts::PaymentAttemptRepository,
    },
    value_objects::enums::attempt_statuses::AttemptStatus,
};
use crate::usecases::payment_error::{PaymentError, PaymentResult};

/// Gatekeeper for opening a new payment attempt against an invoice.
///
/// The checks run in a fixed order and short-circuit on the first failure.
/// Expiry detection deliberately writes back to the invoice: there is no
/// background sweeper, validation is where stale state gets corrected.
pub struct InvoiceGuard<I, A>
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    invoice_repository: Arc<I>,
    attempt_repository: Arc<A>,
}

impl<I, A> InvoiceGuard<I, A>
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    pub fn new(invoice_repository: Arc<I>, attempt_repository: Arc<A>) -> Self {
        Self {
            invoice_repository,
            attempt_repository,
        }
    }

    pub async fn validate_for_payment(
        &self,
        invoice_id: &str,
        caller_email: &str,
    ) -> PaymentResult<InvoiceEntity> {
        let invoice = self
            .invoice_repository
            .find_by_inv_id(invoice_id)
            .await
            .map_err(|err| {
                error!(
                    invoice_id,
                    db_error = ?err,
                    "invoice_guard: failed to load invoice"
                );
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(invoice_id, "invoice_guard: invoice not found");
                PaymentError::InvoiceNotFound
            })?;

        if invoice.recipient_email != caller_email {
            warn!(
                invoice_id,
                caller_email, "invoice_guard: invoice not assigned to caller"
            );
            return Err(PaymentError::NotInvoiceRecipient);
        }

        if invoice.paid {
            warn!(invoice_id, "invoice_guard: invoice already paid");
            return Err(PaymentError::InvoiceAlreadyPaid);
        }

        if Utc::now().date_naive() > invoice.due_date {
            info!(
                invoice_id,
                due_date = %invoice.due_date,
                "invoice_guard: invoice past due, marking expired"
            );
            self.invoice_repository
                .mark_expired(invoice_id)
                .await
                .map_err(|err| {
                    error!(
                        invoice_id,
                        db_error = ?err,
                        "invoice_guard: failed to persist expiry"
                    );
                    PaymentError::Internal(err)
                })?;
            return Err(PaymentError::InvoiceExpired);
        }

        let attempts = self
            .attempt_repository
            .list_by_invoice(invoice_id)
            .await
            .map_err(|err| {
                error!(
                    invoice_id,
                    db_error = ?err,
                    "invoice_guard: failed to list attempts"
                );
                PaymentError::Internal(err)
            })?;

        // An unparseable status is treated as open: blocking a new attempt
        // is the safe side of that coin.
        if let Some(open) = attempts.iter().find(|attempt| {
            AttemptStatus::from_str(&attempt.status).map_or(true, |status| !status.is_terminal())
        }) {
            warn!(
                invoice_id,
                blocking_ref = %open.ref_id,
                "invoice_guard: another attempt is still open"
            );
            return Err(PaymentError::AttemptInProgress(open.ref_id.clone()));
        }

        Ok(invoice)
    }
}
