use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::{
    repositories::{
        invoices::InvoiceRepository, payment_attempts::PaymentAttemptRepository,
        reconciliation_ledger::ReconciliationLedger, session_store::SessionStore,
    },
    value_objects::{
        enums::{attempt_statuses::AttemptStatus, reported_statuses::ReportedStatus},
        reconciliation::{
            CallbackSignal, SettlementReceipt, SignalOutcome, TerminalCommit, VerifyOutcome,
        },
    },
};
use crate::payments::gateway::{GatewayError, PaymentGateway};
use crate::usecases::payment_error::{PaymentError, PaymentResult};

const INVALID_REF_MSG: &str = "Invalid tx_ref value, check and try again";

/// Drives a payment attempt from its external signal to a terminal status.
///
/// Serialization rule: only the caller that claims the session entry (an
/// atomic delete) may apply a terminal transition. Everyone else observes
/// the missing key and short-circuits, so duplicate callbacks, webhook
/// retries and manual re-checks can never double-credit an invoice.
pub struct ReconciliationEngine<A, I, L, S, G>
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    attempt_repository: Arc<A>,
    invoice_repository: Arc<I>,
    ledger: Arc<L>,
    session_store: Arc<S>,
    gateway: Arc<G>,
}

impl<A, I, L, S, G> ReconciliationEngine<A, I, L, S, G>
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        attempt_repository: Arc<A>,
        invoice_repository: Arc<I>,
        ledger: Arc<L>,
        session_store: Arc<S>,
        gateway: Arc<G>,
    ) -> Self {
        Self {
            attempt_repository,
            invoice_repository,
            ledger,
            session_store,
            gateway,
        }
    }

    /// Feeds a callback/post-redirect signal into the state machine.
    ///
    /// Unknown or already-closed references are rejected; a `completed`
    /// report moves the attempt to `checking` and leaves the authoritative
    /// verification to [`Self::verify_and_settle`].
    pub async fn ingest_signal(
        &self,
        ref_id: &str,
        status: &str,
        transaction_id: Option<String>,
    ) -> PaymentResult<SignalOutcome> {
        let open = self.session_store.exists(ref_id).await.map_err(|err| {
            error!(ref_id, cache_error = ?err, "reconciliation: session lookup failed");
            PaymentError::Internal(err)
        })?;
        if !open {
            warn!(ref_id, "reconciliation: signal for unknown or closed ref");
            return Err(PaymentError::Validation(INVALID_REF_MSG.to_string()));
        }

        let signal = CallbackSignal::from_parts(ref_id, status, transaction_id)
            .map_err(PaymentError::Validation)?;

        match signal.status {
            ReportedStatus::Cancelled => {
                self.close_without_settlement(ref_id, AttemptStatus::Cancelled)
                    .await?;
                Ok(SignalOutcome::Cancelled)
            }
            ReportedStatus::Failed => {
                self.close_without_settlement(ref_id, AttemptStatus::Failed)
                    .await?;
                Ok(SignalOutcome::Failed)
            }
            ReportedStatus::Completed => {
                let transaction_id = match signal.transaction_id.as_deref() {
                    Some(id) => id,
                    // from_parts guarantees this; keep the boundary honest anyway.
                    None => {
                        return Err(PaymentError::Validation(
                            "transaction id can't be empty when status is completed".to_string(),
                        ));
                    }
                };

                self.attempt_repository
                    .begin_checking(ref_id, transaction_id)
                    .await
                    .map_err(|err| {
                        error!(
                            ref_id,
                            db_error = ?err,
                            "reconciliation: failed to move attempt to checking"
                        );
                        PaymentError::Internal(err)
                    })?;

                self.session_store
                    .attach_transaction_id(ref_id, transaction_id)
                    .await
                    .map_err(|err| {
                        error!(
                            ref_id,
                            cache_error = ?err,
                            "reconciliation: failed to mirror transaction id into session"
                        );
                        PaymentError::Internal(err)
                    })?;

                info!(
                    ref_id,
                    transaction_id, "reconciliation: attempt moved to checking"
                );
                Ok(SignalOutcome::VerificationQueued)
            }
        }
    }

    /// Authoritative verification: asks the processor what really happened
    /// and commits the terminal state.
    ///
    /// Idempotent by construction: once an attempt is resolved its session
    /// entry is gone, and every later call returns `AlreadyResolved` without
    /// touching the gateway or the ledger.
    pub async fn verify_and_settle(&self, ref_id: &str) -> PaymentResult<VerifyOutcome> {
        let entry = match self.session_store.get(ref_id).await.map_err(|err| {
            error!(ref_id, cache_error = ?err, "reconciliation: session read failed");
            PaymentError::Internal(err)
        })? {
            Some(entry) => entry,
            None => {
                info!(ref_id, "reconciliation: verification already complete");
                return Ok(VerifyOutcome::AlreadyResolved);
            }
        };

        let verification = match self
            .gateway
            .verify_by_reference(&entry.processor_tx_ref)
            .await
        {
            Ok(verification) => verification,
            Err(err) if err.is_transient() => {
                // No terminal transition on a transient failure: the attempt
                // stays `checking` so a retry can finish the job.
                warn!(
                    ref_id,
                    error = %err,
                    "reconciliation: transient verification failure, attempt left open"
                );
                return Err(PaymentError::from(err));
            }
            Err(GatewayError::VerificationFailed(message)) => {
                warn!(
                    ref_id,
                    reason = %message,
                    "reconciliation: processor rejected verification"
                );
                if self.claim(ref_id).await? {
                    self.set_attempt_status(ref_id, AttemptStatus::Failed).await?;
                }
                return Err(PaymentError::GatewayRejected(message));
            }
            Err(err) => return Err(PaymentError::from(err)),
        };

        if !verification.is_successful() {
            let status = match verification.status.as_str() {
                "cancelled" => AttemptStatus::Cancelled,
                _ => AttemptStatus::Failed,
            };
            if !self.claim(ref_id).await? {
                return Ok(VerifyOutcome::AlreadyResolved);
            }
            self.set_attempt_status(ref_id, status).await?;
            warn!(
                ref_id,
                reported = %verification.status,
                "reconciliation: processor reported non-success, attempt closed"
            );
            return Ok(VerifyOutcome::ReportedFailure { status });
        }

        let attempt = self
            .attempt_repository
            .find_by_ref_id(ref_id)
            .await
            .map_err(|err| {
                error!(ref_id, db_error = ?err, "reconciliation: attempt load failed");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                error!(ref_id, "reconciliation: session entry without ledger row");
                PaymentError::Internal(anyhow::anyhow!(
                    "payment attempt {} missing from ledger",
                    ref_id
                ))
            })?;

        let invoice = self
            .invoice_repository
            .find_by_inv_id(&attempt.inv_id)
            .await
            .map_err(|err| {
                error!(
                    ref_id,
                    inv_id = %attempt.inv_id,
                    db_error = ?err,
                    "reconciliation: invoice load failed"
                );
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                error!(
                    ref_id,
                    inv_id = %attempt.inv_id,
                    "reconciliation: attempt references missing invoice"
                );
                PaymentError::Internal(anyhow::anyhow!(
                    "invoice {} missing from ledger",
                    attempt.inv_id
                ))
            })?;

        if !self.claim(ref_id).await? {
            info!(ref_id, "reconciliation: lost the claim race, settled elsewhere");
            return Ok(VerifyOutcome::AlreadyResolved);
        }

        let status = if verification.charged_amount >= invoice.price {
            AttemptStatus::Paid
        } else {
            AttemptStatus::Incomplete
        };

        let commit = TerminalCommit {
            ref_id: ref_id.to_string(),
            inv_id: invoice.inv_id.clone(),
            attempt_status: status,
            paid_amount: verification.charged_amount,
            processor_transaction_ref: verification.processor_transaction_ref.clone(),
            paid_at: Utc::now(),
        };

        if let Err(err) = self.ledger.commit_terminal(commit).await {
            error!(
                ref_id,
                db_error = ?err,
                "reconciliation: terminal commit failed, restoring session entry"
            );
            if let Err(restore_err) = self.session_store.restore(&entry).await {
                error!(
                    ref_id,
                    cache_error = ?restore_err,
                    "reconciliation: session restore failed, manual re-verify needed"
                );
            }
            return Err(PaymentError::Internal(err));
        }

        info!(
            ref_id,
            inv_id = %invoice.inv_id,
            status = %status,
            charged = %verification.charged_amount,
            price = %invoice.price,
            "reconciliation: attempt settled"
        );

        Ok(VerifyOutcome::Settled {
            status,
            receipt: SettlementReceipt {
                ref_id: ref_id.to_string(),
                inv_id: invoice.inv_id,
                amount: verification.amount,
                charged_amount: verification.charged_amount,
                currency: verification.currency,
            },
        })
    }

    /// Recovery path for deferred verifications lost to a restart: every
    /// attempt persisted in `checking` is re-driven through verification.
    /// Attempts whose session entry has already expired resolve to
    /// `AlreadyResolved` and are only logged.
    pub async fn resume_open_verifications(&self) -> PaymentResult<usize> {
        let open = self.attempt_repository.list_open().await.map_err(|err| {
            error!(db_error = ?err, "reconciliation: failed to list open attempts");
            PaymentError::Internal(err)
        })?;

        let mut settled = 0;
        for attempt in open {
            if attempt.status != AttemptStatus::Checking.as_str() {
                continue;
            }
            match self.verify_and_settle(&attempt.ref_id).await {
                Ok(VerifyOutcome::Settled { status, .. }) => {
                    info!(
                        ref_id = %attempt.ref_id,
                        status = %status,
                        "reconciliation: recovered attempt settled"
                    );
                    settled += 1;
                }
                Ok(outcome) => {
                    info!(ref_id = %attempt.ref_id, outcome = ?outcome, "reconciliation: recovery outcome");
                }
                Err(err) => {
                    warn!(
                        ref_id = %attempt.ref_id,
                        error = %err,
                        "reconciliation: recovery verification failed"
                    );
                }
            }
        }

        Ok(settled)
    }

    async fn close_without_settlement(
        &self,
        ref_id: &str,
        status: AttemptStatus,
    ) -> PaymentResult<()> {
        if !self.claim(ref_id).await? {
            return Err(PaymentError::Validation(INVALID_REF_MSG.to_string()));
        }
        self.set_attempt_status(ref_id, status).await?;
        info!(ref_id, status = %status, "reconciliation: attempt closed without settlement");
        Ok(())
    }

    async fn claim(&self, ref_id: &str) -> PaymentResult<bool> {
        self.session_store.claim(ref_id).await.map_err(|err| {
            error!(ref_id, cache_error = ?err, "reconciliation: session claim failed");
            PaymentError::Internal(err)
        })
    }

    async fn set_attempt_status(
        &self,
        ref_id: &str,
        status: AttemptStatus,
    ) -> PaymentResult<()> {
        self.attempt_repository
            .update_status(ref_id, status)
            .await
            .map_err(|err| {
                error!(
                    ref_id,
                    status = %status,
                    db_error = ?err,
                    "reconciliation: attempt status update failed"
                );
                PaymentError::Internal(err)
            })
    }
}

/// Fire-and-continue follow-up for a callback: the HTTP response returns
/// immediately while verification runs to completion in its own task, and a
/// failure is logged rather than dropped.
pub fn spawn_deferred_verification<A, I, L, S, G>(
    engine: Arc<ReconciliationEngine<A, I, L, S, G>>,
    ref_id: String,
) where
    A: PaymentAttemptRepository + Send + Sync + 'static,
    I: InvoiceRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    tokio::spawn(async move {
        match engine.verify_and_settle(&ref_id).await {
            Ok(outcome) => {
                info!(ref_id = %ref_id, outcome = ?outcome, "deferred verification finished");
            }
            Err(err) if err.is_retryable() => {
                warn!(
                    ref_id = %ref_id,
                    error = %err,
                    "deferred verification hit a transient failure, attempt left open for re-verify"
                );
            }
            Err(err) => {
                error!(ref_id = %ref_id, error = %err, "deferred verification failed");
            }
        }
    });
}

#[cfg(test)]
mod tests;
