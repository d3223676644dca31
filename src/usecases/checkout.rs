use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::domain::{
    entities::payment_attempts::InsertPaymentAttemptEntity,
    repositories::{
        invoices::InvoiceRepository, payment_attempts::PaymentAttemptRepository,
        reconciliation_ledger::ReconciliationLedger, session_store::SessionStore,
    },
    value_objects::{
        enums::{attempt_statuses::AttemptStatus, checkout_types::CheckoutType},
        payments::{CallbackAck, CheckoutLinkDto, VerifyPaymentsDto},
        reconciliation::{SignalOutcome, VerifyOutcome},
        references,
        session::CacheSessionEntry,
    },
};
use crate::payments::gateway::{ChargeCustomer, PaymentGateway};
use crate::usecases::{
    invoice_guard::InvoiceGuard,
    payment_error::{PaymentError, PaymentResult},
    reconciliation::{ReconciliationEngine, spawn_deferred_verification},
};

/// Hosted checkout: the caller is redirected to the processor's page and
/// confirmation arrives exclusively through the callback or polling paths.
pub struct CheckoutUseCase<I, A, L, S, G>
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    guard: InvoiceGuard<I, A>,
    attempt_repository: Arc<A>,
    session_store: Arc<S>,
    gateway: Arc<G>,
    engine: Arc<ReconciliationEngine<A, I, L, S, G>>,
}

impl<I, A, L, S, G> CheckoutUseCase<I, A, L, S, G>
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        invoice_repository: Arc<I>,
        attempt_repository: Arc<A>,
        ledger: Arc<L>,
        session_store: Arc<S>,
        gateway: Arc<G>,
    ) -> Self {
        let guard = InvoiceGuard::new(
            Arc::clone(&invoice_repository),
            Arc::clone(&attempt_repository),
        );
        let engine = Arc::new(ReconciliationEngine::new(
            Arc::clone(&attempt_repository),
            Arc::clone(&invoice_repository),
            ledger,
            Arc::clone(&session_store),
            Arc::clone(&gateway),
        ));

        Self {
            guard,
            attempt_repository,
            session_store,
            gateway,
            engine,
        }
    }

    pub async fn start(
        &self,
        active_user: &AuthUser,
        invoice_id: &str,
    ) -> PaymentResult<CheckoutLinkDto> {
        let invoice = self
            .guard
            .validate_for_payment(invoice_id, &active_user.email)
            .await?;

        let ref_id = references::new_payment_ref();
        let customer = ChargeCustomer {
            name: active_user.name.clone(),
            email: active_user.email.clone(),
        };

        let link = self
            .gateway
            .create_checkout_link(&customer, invoice.price, &ref_id)
            .await
            .map_err(|err| {
                warn!(invoice_id, ref_id, error = %err, "checkout: link creation failed");
                PaymentError::from(err)
            })?;

        self.attempt_repository
            .create(InsertPaymentAttemptEntity {
                ref_id: ref_id.clone(),
                inv_id: invoice.inv_id.clone(),
                amount: invoice.price,
                payer_email: active_user.email.clone(),
                paid_by: active_user.name.clone(),
                checkout_type: CheckoutType::HostedCheckout.as_str().to_string(),
                payment_type: CheckoutType::HostedCheckout.display_name().to_string(),
                status: AttemptStatus::Pending.as_str().to_string(),
                processor_ref: None,
                paid: false,
                created_at: Utc::now(),
            })
            .await
            .map_err(PaymentError::Internal)?;

        self.session_store
            .put(&CacheSessionEntry {
                ref_id: ref_id.clone(),
                inv_id: invoice.inv_id.clone(),
                checkout_type: CheckoutType::HostedCheckout,
                processor_ref: None,
                processor_tx_ref: ref_id.clone(),
                transaction_id: None,
            })
            .await
            .map_err(PaymentError::Internal)?;

        info!(invoice_id, ref_id, "checkout: attempt opened, link issued");

        Ok(CheckoutLinkDto {
            ref_id,
            status: link.status,
            link: link.link,
            link_type: link.link_type,
        })
    }

    /// Single ingestion point for the processor's redirect callback and the
    /// client's post-redirect poll. Returns quickly; the authoritative
    /// verification runs as a deferred task.
    pub async fn handle_callback(
        &self,
        tx_ref: &str,
        status: &str,
        transaction_id: Option<String>,
    ) -> PaymentResult<CallbackAck> {
        let outcome = self
            .engine
            .ingest_signal(tx_ref, status, transaction_id)
            .await?;

        if outcome == SignalOutcome::VerificationQueued {
            spawn_deferred_verification(Arc::clone(&self.engine), tx_ref.to_string());
        }

        Ok(CallbackAck {
            status: status.to_string(),
            ref_id: tx_ref.to_string(),
        })
    }

    /// Client-polled verification. A missing session entry means the attempt
    /// was already resolved (or its session lapsed) and yields the stable
    /// "verification complete" answer instead of re-querying the processor.
    pub async fn verify_payments(&self, ref_id: &str) -> PaymentResult<VerifyPaymentsDto> {
        let open = self
            .session_store
            .exists(ref_id)
            .await
            .map_err(PaymentError::Internal)?;
        if !open {
            return Ok(VerifyPaymentsDto {
                status: "completed".to_string(),
                msg: "payment verification complete".to_string(),
            });
        }

        match self.engine.verify_and_settle(ref_id).await? {
            VerifyOutcome::Settled {
                status: AttemptStatus::Incomplete,
                ..
            } => Ok(VerifyPaymentsDto {
                status: AttemptStatus::Incomplete.as_str().to_string(),
                msg: "charged amount less than invoice price".to_string(),
            }),
            VerifyOutcome::Settled { status, .. } => Ok(VerifyPaymentsDto {
                status: status.as_str().to_string(),
                msg: "payment verification complete".to_string(),
            }),
            VerifyOutcome::AlreadyResolved => Ok(VerifyPaymentsDto {
                status: "completed".to_string(),
                msg: "payment verification complete".to_string(),
            }),
            VerifyOutcome::ReportedFailure { status } => Ok(VerifyPaymentsDto {
                status: status.as_str().to_string(),
                msg: "transaction was not successful".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests;
