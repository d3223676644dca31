use std::sync::Arc;

use rust_decimal_macros::dec;

use super::*;
use crate::domain::repositories::{
    invoices::MockInvoiceRepository, payment_attempts::MockPaymentAttemptRepository,
    reconciliation_ledger::MockReconciliationLedger, session_store::MockSessionStore,
};
use crate::domain::value_objects::enums::user_roles::UserRole;
use crate::payments::gateway::{CheckoutLink, MockPaymentGateway, VerificationResult};
use crate::usecases::test_fixtures::{
    active_user, attempt, due_tomorrow, invoice, session_entry,
};

type TestUseCase = CheckoutUseCase<
    MockInvoiceRepository,
    MockPaymentAttemptRepository,
    MockReconciliationLedger,
    MockSessionStore,
    MockPaymentGateway,
>;

fn usecase(
    invoices: MockInvoiceRepository,
    attempts: MockPaymentAttemptRepository,
    ledger: MockReconciliationLedger,
    sessions: MockSessionStore,
    gateway: MockPaymentGateway,
) -> TestUseCase {
    CheckoutUseCase::new(
        Arc::new(invoices),
        Arc::new(attempts),
        Arc::new(ledger),
        Arc::new(sessions),
        Arc::new(gateway),
    )
}

#[tokio::test]
async fn start_issues_link_and_opens_pending_attempt() {
    let record = invoice("INV-1", dec!(100.00), due_tomorrow());
    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(move |_| Ok(Some(record.clone())));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_by_invoice().returning(|_| Ok(vec![]));
    attempts
        .expect_create()
        .withf(|attempt| {
            attempt.checkout_type == "hosted_checkout"
                && attempt.status == "pending"
                && attempt.processor_ref.is_none()
        })
        .times(1)
        .returning(|attempt| Ok(attempt.ref_id));

    let mut sessions = MockSessionStore::new();
    sessions
        .expect_put()
        .withf(|entry| entry.processor_tx_ref == entry.ref_id)
        .times(1)
        .returning(|_| Ok(()));

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_checkout_link().returning(|_, _, _| {
        Ok(CheckoutLink {
            status: "success".to_string(),
            link: "https://checkout.example.com/pay/abc123".to_string(),
            link_type: "Hosted Link".to_string(),
        })
    });

    let dto = usecase(
        invoices,
        attempts,
        MockReconciliationLedger::new(),
        sessions,
        gateway,
    )
    .start(&active_user(UserRole::User), "INV-1")
    .await
    .expect("checkout should start");

    assert!(dto.ref_id.starts_with("REF-"));
    assert_eq!(dto.status, "success");
    assert_eq!(dto.link, "https://checkout.example.com/pay/abc123");
    assert_eq!(dto.link_type, "Hosted Link");
}

#[tokio::test]
async fn callback_with_unknown_ref_is_a_client_error() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(false));

    let err = usecase(
        MockInvoiceRepository::new(),
        MockPaymentAttemptRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .handle_callback("REF-GONE", "completed", Some("1141230276".to_string()))
    .await
    .expect_err("unknown refs must be rejected");

    assert!(matches!(err, PaymentError::Validation(_)));
}

#[tokio::test]
async fn cancelled_callback_acks_without_settlement() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(true));
    sessions.expect_claim().times(1).returning(|_| Ok(true));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_update_status()
        .withf(|r, status| r == "REF-1" && *status == AttemptStatus::Cancelled)
        .times(1)
        .returning(|_, _| Ok(()));

    let ack = usecase(
        MockInvoiceRepository::new(),
        attempts,
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .handle_callback("REF-1", "cancelled", None)
    .await
    .expect("cancel callback must be acked");

    assert_eq!(ack.status, "cancelled");
    assert_eq!(ack.ref_id, "REF-1");
}

#[tokio::test]
async fn verify_payments_with_absent_session_returns_the_stable_answer() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(false));

    let dto = usecase(
        MockInvoiceRepository::new(),
        MockPaymentAttemptRepository::new(),
        MockReconciliationLedger::new(),
        sessions,
        MockPaymentGateway::new(),
    )
    .verify_payments("REF-DOES-NOT-EXIST")
    .await
    .expect("absent session must not error");

    assert_eq!(dto.status, "completed");
    assert_eq!(dto.msg, "payment verification complete");
}

#[tokio::test]
async fn verify_payments_settles_an_open_checking_attempt() {
    let mut sessions = MockSessionStore::new();
    sessions.expect_exists().returning(|_| Ok(true));
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().returning(|_| Ok(true));

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
        .returning(|_| Ok(()));

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_verify_by_reference().returning(|_| {
        Ok(VerificationResult {
            status: "successful".to_string(),
            amount: dec!(100.00),
            charged_amount: dec!(100.00),
            currency: "NGN".to_string(),
            processor_transaction_ref: "1141230276".to_string(),
        })
    });

    let dto = usecase(invoices, attempts, ledger, sessions, gateway)
        .verify_payments("REF-1")
        .await
        .expect("open attempt must settle");

    assert_eq!(dto.status, "paid");
    assert_eq!(dto.msg, "payment verification complete");
}
