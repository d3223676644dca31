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
        payments::{BankTransferInstructions, BankTransferVerifyReceipt},
        reconciliation::VerifyOutcome,
        references,
        session::CacheSessionEntry,
    },
};
use crate::payments::gateway::{ChargeCustomer, PaymentGateway};
use crate::usecases::{
    invoice_guard::InvoiceGuard,
    payment_error::{PaymentError, PaymentResult},
    reconciliation::ReconciliationEngine,
};

const INVALID_VERIFY_REF_MSG: &str = "Invalid reference id to continue verification process";

/// Bank transfer checkout: the charge returns temporary virtual-account
/// details right away, confirmation arrives later via callback or the
/// manual verify endpoint.
pub struct BankTransferUseCase<I, A, L, S, G>
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

impl<I, A, L, S, G> BankTransferUseCase<I, A, L, S, G>
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
    ) -> PaymentResult<BankTransferInstructions> {
        let invoice = self
            .guard
            .validate_for_payment(invoice_id, &active_user.email)
            .await?;

        let ref_id = references::new_payment_ref();
        let customer = ChargeCustomer {
            name: active_user.name.clone(),
            email: active_user.email.clone(),
        };

        let charge = self
            .gateway
            .create_bank_transfer_charge(&customer, invoice.price, &ref_id)
            .await
            .map_err(|err| {
                warn!(
                    invoice_id,
                    ref_id,
                    error = %err,
                    "bank_transfer: charge creation failed"
                );
                PaymentError::from(err)
            })?;

        self.attempt_repository
            .create(InsertPaymentAttemptEntity {
                ref_id: ref_id.clone(),
                inv_id: invoice.inv_id.clone(),
                amount: invoice.price,
                payer_email: active_user.email.clone(),
                paid_by: active_user.name.clone(),
                checkout_type: CheckoutType::BankTransfer.as_str().to_string(),
                payment_type: CheckoutType::BankTransfer.display_name().to_string(),
                status: AttemptStatus::Pending.as_str().to_string(),
                processor_ref: Some(charge.processor_ref.clone()),
                paid: false,
                created_at: Utc::now(),
            })
            .await
            .map_err(PaymentError::Internal)?;

        self.session_store
            .put(&CacheSessionEntry {
                ref_id: ref_id.clone(),
                inv_id: invoice.inv_id.clone(),
                checkout_type: CheckoutType::BankTransfer,
                processor_ref: Some(charge.processor_ref.clone()),
                processor_tx_ref: charge.processor_tx_ref.clone(),
                transaction_id: None,
            })
            .await
            .map_err(PaymentError::Internal)?;

        info!(
            invoice_id,
            ref_id, "bank_transfer: attempt opened, virtual account issued"
        );

        Ok(BankTransferInstructions {
            ref_id,
            bank_name: charge.bank_name,
            bank_account: charge.bank_account,
            expires_in: charge.expires_in,
            message: charge.transfer_note,
        })
    }

    pub async fn verify_transfer(
        &self,
        ref_id: &str,
    ) -> PaymentResult<BankTransferVerifyReceipt> {
        let open = self
            .session_store
            .exists(ref_id)
            .await
            .map_err(PaymentError::Internal)?;
        if !open {
            return Err(PaymentError::Validation(INVALID_VERIFY_REF_MSG.to_string()));
        }

        match self.engine.verify_and_settle(ref_id).await? {
            VerifyOutcome::Settled { status, .. } => Ok(BankTransferVerifyReceipt {
                msg: "Transfer successful".to_string(),
                transaction_complete: status == AttemptStatus::Paid,
            }),
            VerifyOutcome::AlreadyResolved => Ok(BankTransferVerifyReceipt {
                msg: "payment verification complete".to_string(),
                transaction_complete: true,
            }),
            VerifyOutcome::ReportedFailure { status } => Err(PaymentError::GatewayRejected(
                format!("transaction reported as {}", status),
            )),
        }
    }
}
