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
        payments::{CardChargeOutcome, CardDetails, CardVerifyReceipt, VerifyCardModel},
        reconciliation::VerifyOutcome,
        references,
        session::CacheSessionEntry,
    },
};
use crate::payments::gateway::{ChargeCustomer, GatewayError, PaymentGateway};
use crate::usecases::{
    invoice_guard::InvoiceGuard,
    payment_error::{PaymentError, PaymentResult},
    reconciliation::ReconciliationEngine,
};

const INVALID_VERIFY_REF_MSG: &str = "Invalid reference id to continue verification process";

/// The one second factor this initiator can drive. Anything else the
/// processor suggests fails the request instead of silently degrading.
const SUPPORTED_AUTH_MODE: &str = "PIN";

/// Card checkout: the charge may demand a second factor; the follow-up
/// `/verify` call takes the OTP and settles synchronously, no callback.
pub struct CardPaymentUseCase<I, A, L, S, G>
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

impl<I, A, L, S, G> CardPaymentUseCase<I, A, L, S, G>
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
        card: CardDetails,
    ) -> PaymentResult<CardChargeOutcome> {
        let invoice = self
            .guard
            .validate_for_payment(invoice_id, &active_user.email)
            .await?;

        let ref_id = references::new_payment_ref();
        let customer = ChargeCustomer {
            name: active_user.name.clone(),
            email: active_user.email.clone(),
        };

        let mut charge = self
            .gateway
            .create_card_charge(&customer, &card, invoice.price, &ref_id, None)
            .await
            .map_err(|err| {
                warn!(invoice_id, ref_id, error = %err, "card: charge creation failed");
                PaymentError::from(err)
            })?;

        if let Some(auth_mode) = charge.suggested_auth.clone() {
            if auth_mode != SUPPORTED_AUTH_MODE {
                warn!(
                    invoice_id,
                    ref_id, auth_mode, "card: unsupported authentication mode suggested"
                );
                return Err(PaymentError::Validation(format!(
                    "{} authentication not supported",
                    auth_mode
                )));
            }

            charge = self
                .gateway
                .create_card_charge(
                    &customer,
                    &card,
                    invoice.price,
                    &ref_id,
                    Some(SUPPORTED_AUTH_MODE.to_string()),
                )
                .await
                .map_err(|err| {
                    warn!(invoice_id, ref_id, error = %err, "card: pin-authenticated charge failed");
                    PaymentError::from(err)
                })?;
        }

        self.attempt_repository
            .create(InsertPaymentAttemptEntity {
                ref_id: ref_id.clone(),
                inv_id: invoice.inv_id.clone(),
                amount: invoice.price,
                payer_email: active_user.email.clone(),
                paid_by: active_user.name.clone(),
                checkout_type: CheckoutType::Card.as_str().to_string(),
                payment_type: CheckoutType::Card.display_name().to_string(),
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
                checkout_type: CheckoutType::Card,
                processor_ref: Some(charge.processor_ref.clone()),
                processor_tx_ref: charge.processor_tx_ref.clone(),
                transaction_id: None,
            })
            .await
            .map_err(PaymentError::Internal)?;

        info!(invoice_id, ref_id, "card: attempt opened");

        Ok(CardChargeOutcome {
            ref_id,
            validation_required: charge.validation_required,
        })
    }

    pub async fn verify(&self, payload: VerifyCardModel) -> PaymentResult<CardVerifyReceipt> {
        let entry = self
            .session_store
            .get(&payload.ref_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or_else(|| PaymentError::Validation(INVALID_VERIFY_REF_MSG.to_string()))?;

        let processor_ref = entry.processor_ref.clone().ok_or_else(|| {
            PaymentError::Internal(anyhow::anyhow!(
                "card session {} missing processor reference",
                payload.ref_id
            ))
        })?;

        match self
            .gateway
            .validate_card_otp(&processor_ref, &payload.otp)
            .await
        {
            Ok(validation) => {
                info!(
                    ref_id = %payload.ref_id,
                    validation_message = %validation.message,
                    "card: otp accepted"
                );
            }
            Err(err) if err.is_transient() => return Err(PaymentError::from(err)),
            Err(GatewayError::ValidationFailed(message)) => {
                warn!(ref_id = %payload.ref_id, reason = %message, "card: otp rejected");
                let claimed = self
                    .session_store
                    .claim(&payload.ref_id)
                    .await
                    .map_err(PaymentError::Internal)?;
                if claimed {
                    self.attempt_repository
                        .update_status(&payload.ref_id, AttemptStatus::Failed)
                        .await
                        .map_err(PaymentError::Internal)?;
                }
                return Err(PaymentError::GatewayRejected(message));
            }
            Err(err) => return Err(PaymentError::from(err)),
        }

        match self.engine.verify_and_settle(&payload.ref_id).await? {
            VerifyOutcome::Settled { status, receipt } => Ok(CardVerifyReceipt {
                transaction_complete: status == AttemptStatus::Paid,
                ref_id: receipt.ref_id,
                inv_id: receipt.inv_id,
                amount: receipt.amount,
                charged_amount: receipt.charged_amount,
                currency: receipt.currency,
            }),
            VerifyOutcome::AlreadyResolved => Err(PaymentError::Validation(
                INVALID_VERIFY_REF_MSG.to_string(),
            )),
            VerifyOutcome::ReportedFailure { status } => Err(PaymentError::GatewayRejected(
                format!("transaction reported as {}", status),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
