use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::domain::repositories::{
    invoices::MockInvoiceRepository, payment_attempts::MockPaymentAttemptRepository,
    reconciliation_ledger::MockReconciliationLedger, session_store::MockSessionStore,
};
use crate::payments::gateway::{MockPaymentGateway, VerificationResult};
use crate::usecases::test_fixtures::{attempt, due_tomorrow, invoice, session_entry};

type TestEngine = ReconciliationEngine<
    MockPaymentAttemptRepository,
    MockInvoiceRepository,
    MockReconciliationLedger,
    MockSessionStore,
    MockPaymentGateway,
>;

fn engine(
    attempts: MockPaymentAttemptRepository,
    invoices: MockInvoiceRepository,
    ledger: MockReconciliationLedger,
    sessions: MockSessionStore,
    gateway: MockPaymentGateway,
) -> TestEngine {
    ReconciliationEngine::new(
        Arc::new(attempts),
        Arc::new(invoices),
        Arc::new(ledger),
        Arc::new(sessions),
        Arc::new(gateway),
    )
}

fn verification(status: &str, charged: Decimal) -> VerificationResult {
    VerificationResult {
        status: status.to_string(),
        amount: charged,
        charged_amount: charged,
        currency: "NGN".to_string(),
        processor_transaction_ref: "1141230276".to_string(),
    }
}

#[tokio::test]
async fn full_charge_settles_attempt_and_invoice() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .withf(|r| r == "REF-1")
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions
        .expect_claim()
        .withf(|r| r == "REF-1")
        .times(1)
        .returning(|_| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .withf(|tx_ref| tx_ref == "REF-1")
        .returning(|_| Ok(verification("successful", dec!(100.00))));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-1", "INV-1", AttemptStatus::Checking, dec!(100.00)))));

    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(|_| Ok(Some(invoice("INV-1", dec!(100.00), due_tomorrow()))));

    let mut ledger = MockReconciliationLedger::new();
    ledger
        .expect_commit_terminal()
        .withf(|commit| {
            commit.ref_id == "REF-1"
                && commit.inv_id == "INV-1"
                && commit.attempt_status == AttemptStatus::Paid
                && commit.paid_amount == dec!(100.00)
                && commit.processor_transaction_ref == "1141230276"
                && commit.marks_invoice_paid()
        })
        .times(1)
        .returning(|_| Ok(()));

    let outcome = engine(attempts, invoices, ledger, sessions, gateway)
        .verify_and_settle("REF-1")
        .await
        .expect("verification should settle");

    match outcome {
        VerifyOutcome::Settled { status, receipt } => {
            assert_eq!(status, AttemptStatus::Paid);
            assert_eq!(receipt.inv_id, "INV-1");
            assert_eq!(receipt.charged_amount, dec!(100.00));
        }
        other => panic!("expected settled outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn undercharged_attempt_becomes_incomplete_and_invoice_stays_unpaid() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().returning(|_| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Ok(verification("successful", dec!(2000.00))));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-1", "INV-1", AttemptStatus::Checking, dec!(2500.00)))));

    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(|_| Ok(Some(invoice("INV-1", dec!(2500.00), due_tomorrow()))));

    let mut ledger = MockReconciliationLedger::new();
    ledger
        .expect_commit_terminal()
        .withf(|commit| {
            commit.attempt_status == AttemptStatus::Incomplete
                && commit.paid_amount == dec!(2000.00)
                && !commit.marks_invoice_paid()
        })
        .times(1)
        .returning(|_| Ok(()));

    let outcome = engine(attempts, invoices, ledger, sessions, gateway)
        .verify_and_settle("REF-1")
        .await
        .expect("verification should settle as incomplete");

    assert!(matches!(
        outcome,
        VerifyOutcome::Settled {
            status: AttemptStatus::Incomplete,
            ..
        }
    ));
}

#[tokio::test]
async fn second_verification_is_a_noop() {
    let mut sessions = MockSessionStore::new();
    // Entry already claimed by the first verification.
    sessions.expect_get().returning(|_| Ok(None));

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_verify_by_reference().never();

    let mut ledger = MockReconciliationLedger::new();
    ledger.expect_commit_terminal().never();

    let outcome = engine(
        MockPaymentAttemptRepository::new(),
        MockInvoiceRepository::new(),
        ledger,
        sessions,
        gateway,
    )
    .verify_and_settle("REF-1")
    .await
    .expect("repeat verification must not fail");

    assert_eq!(outcome, VerifyOutcome::AlreadyResolved);
}

#[tokio::test]
async fn losing_the_claim_race_short_circuits_before_the_commit() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().returning(|_| Ok(false));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Ok(verification("successful", dec!(100.00))));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-1", "INV-1", AttemptStatus::Checking, dec!(100.00)))));

    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(|_| Ok(Some(invoice("INV-1", dec!(100.00), due_tomorrow()))));

    let mut ledger = MockReconciliationLedger::new();
    ledger.expect_commit_terminal().never();

    let outcome = engine(attempts, invoices, ledger, sessions, gateway)
        .verify_and_settle("REF-1")
        .await
        .expect("race loser must short-circuit");

    assert_eq!(outcome, VerifyOutcome::AlreadyResolved);
}

#[tokio::test]
async fn transient_gateway_failure_leaves_the_attempt_open() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().never();

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Err(GatewayError::ReadTimeout));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_update_status().never();

    let err = engine(
        attempts,
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        gateway,
    )
    .verify_and_settle("REF-1")
    .await
    .expect_err("timeout must surface");

    assert!(matches!(err, PaymentError::GatewayTimeout));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn rejected_verification_closes_the_attempt_as_failed() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().times(1).returning(|_| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Err(GatewayError::VerificationFailed("charge not found".into())));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_update_status()
        .withf(|r, status| r == "REF-1" && *status == AttemptStatus::Failed)
        .times(1)
        .returning(|_, _| Ok(()));

    let err = engine(
        attempts,
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        gateway,
    )
    .verify_and_settle("REF-1")
    .await
    .expect_err("rejection must surface");

    assert!(matches!(err, PaymentError::GatewayRejected(_)));
}

#[tokio::test]
async fn reported_non_success_closes_without_touching_the_invoice() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().times(1).returning(|_| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Ok(verification("failed", dec!(0.00))));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_update_status()
        .withf(|r, status| r == "REF-1" && *status == AttemptStatus::Failed)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut ledger = MockReconciliationLedger::new();
    ledger.expect_commit_terminal().never();

    let outcome = engine(
        attempts,
        MockInvoiceRepository::new(),
        ledger,
        sessions,
        gateway,
    )
    .verify_and_settle("REF-1")
    .await
    .expect("reported failure is a clean outcome");

    assert_eq!(
        outcome,
        VerifyOutcome::ReportedFailure {
            status: AttemptStatus::Failed
        }
    );
}

#[tokio::test]
async fn failed_terminal_commit_restores_the_session_entry() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().returning(|_| Ok(true));
    sessions
        .expect_restore()
        .withf(|entry| entry.ref_id == "REF-1")
        .times(1)
        .returning(|_| Ok(()));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .returning(|_| Ok(verification("successful", dec!(100.00))));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-1", "INV-1", AttemptStatus::Checking, dec!(100.00)))));

    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(|_| Ok(Some(invoice("INV-1", dec!(100.00), due_tomorrow()))));

    let mut ledger = MockReconciliationLedger::new();
    ledger
        .expect_commit_terminal()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("connection reset mid-transaction")));

    let err = engine(attempts, invoices, ledger, sessions, gateway)
        .verify_and_settle("REF-1")
        .await
        .expect_err("ledger failure must surface as internal");

    assert!(matches!(err, PaymentError::Internal(_)));
}

#[tokio::test]
async fn cancelled_signal_closes_the_attempt_and_spares_the_invoice() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(true));
    sessions.expect_claim().times(1).returning(|_| Ok(true));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_update_status()
        .withf(|r, status| r == "REF-1" && *status == AttemptStatus::Cancelled)
        .times(1)
        .returning(|_, _| Ok(()));

    // No invoice expectations: any touch of the invoice repository panics.
    let outcome = engine(
        attempts,
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .ingest_signal("REF-1", "cancelled", None)
    .await
    .expect("cancel must be accepted");

    assert_eq!(outcome, SignalOutcome::Cancelled);
}

#[tokio::test]
async fn completed_signal_moves_attempt_to_checking() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(true));
    sessions
        .expect_attach_transaction_id()
        .withf(|r, tx| r == "REF-1" && tx == "1141230276")
        .times(1)
        .returning(|_, _| Ok(()));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_begin_checking()
        .withf(|r, tx| r == "REF-1" && tx == "1141230276")
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(
        attempts,
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .ingest_signal("REF-1", "completed", Some("1141230276".to_string()))
    .await
    .expect("completed signal must queue verification");

    assert_eq!(outcome, SignalOutcome::VerificationQueued);
}

#[tokio::test]
async fn unknown_ref_is_rejected_at_ingestion() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(false));

    let err = engine(
        MockPaymentAttemptRepository::new(),
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .ingest_signal("REF-GONE", "completed", Some("1".to_string()))
    .await
    .expect_err("closed refs must be rejected");

    assert!(matches!(err, PaymentError::Validation(_)));
}

#[tokio::test]
async fn completed_signal_without_transaction_id_is_malformed() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(true));

    let err = engine(
        MockPaymentAttemptRepository::new(),
        MockInvoiceRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .ingest_signal("REF-1", "completed", None)
    .await
    .expect_err("missing transaction id must be rejected");

    assert!(matches!(err, PaymentError::Validation(_)));
}

#[tokio::test]
async fn recovery_redrives_checking_attempts_only() {
    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_open().returning(|| {
        Ok(vec![
            attempt("REF-P", "INV-1", AttemptStatus::Pending, dec!(50.00)),
            attempt("REF-C", "INV-2", AttemptStatus::Checking, dec!(50.00)),
        ])
    });
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-C", "INV-2", AttemptStatus::Checking, dec!(50.00)))));

    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .withf(|r| r == "REF-C")
        .returning(|_| Ok(Some(session_entry("REF-C", "INV-2"))));
    sessions.expect_claim().returning(|_| Ok(true));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_verify_by_reference()
        .times(1)
        .returning(|_| Ok(verification("successful", dec!(50.00))));

    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(|_| Ok(Some(invoice("INV-2", dec!(50.00), due_tomorrow()))));

    let mut ledger = MockReconciliationLedger::new();
    ledger
        .expect_commit_terminal()
        .times(1)
        .returning(|_| Ok(()));

    let settled = engine(attempts, invoices, ledger, sessions, gateway)
        .resume_open_verifications()
        .await
        .expect("recovery must run");

    assert_eq!(settled, 1);
}
