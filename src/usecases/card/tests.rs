use std::sync::Arc;

use rust_decimal_macros::dec;

use super::*;
use crate::domain::repositories::{
    invoices::MockInvoiceRepository, payment_attempts::MockPaymentAttemptRepository,
    reconciliation_ledger::MockReconciliationLedger, session_store::MockSessionStore,
};
use crate::domain::value_objects::enums::user_roles::UserRole;
use crate::payments::gateway::{CardCharge, MockPaymentGateway, OtpValidation, VerificationResult};
use crate::usecases::test_fixtures::{
    active_user, attempt, due_tomorrow, invoice, session_entry,
};

type TestUseCase = CardPaymentUseCase<
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
    CardPaymentUseCase::new(
        Arc::new(invoices),
        Arc::new(attempts),
        Arc::new(ledger),
        Arc::new(sessions),
        Arc::new(gateway),
    )
}

fn card_details() -> CardDetails {
    CardDetails {
        cardno: "5531886652142950".to_string(),
        expirymonth: "09".to_string(),
        expiryyear: "32".to_string(),
        cvv: "564".to_string(),
        pin: "3310".to_string(),
    }
}

fn charge(suggested_auth: Option<&str>, validation_required: bool) -> CardCharge {
    CardCharge {
        processor_ref: "FLW-CARD-9".to_string(),
        processor_tx_ref: "REF-TX-9".to_string(),
        suggested_auth: suggested_auth.map(str::to_string),
        validation_required,
    }
}

#[tokio::test]
async fn unsupported_auth_mode_fails_instead_of_degrading() {
    let record = invoice("INV-1", dec!(100.00), due_tomorrow());
    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(move |_| Ok(Some(record.clone())));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_by_invoice().returning(|_| Ok(vec![]));
    attempts.expect_create().never();

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_card_charge()
        .times(1)
        .returning(|_, _, _, _, _| Ok(charge(Some("AVS_VBVSECURECODE"), false)));

    let err = usecase(
        invoices,
        attempts,
        MockReconciliationLedger::new(),
        MockSessionStore::new(),
        gateway,
    )
    .start(&active_user(UserRole::User), "INV-1", card_details())
    .await
    .expect_err("unsupported auth mode must fail");

    match err {
        PaymentError::Validation(message) => {
            assert!(message.contains("authentication not supported"))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn suggested_pin_triggers_a_second_authenticated_charge() {
    let record = invoice("INV-1", dec!(100.00), due_tomorrow());
    let mut invoices = MockInvoiceRepository::new();
    invoices
        .expect_find_by_inv_id()
        .returning(move |_| Ok(Some(record.clone())));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_by_invoice().returning(|_| Ok(vec![]));
    attempts
        .expect_create()
        .withf(|attempt| attempt.checkout_type == "card" && attempt.status == "pending")
        .times(1)
        .returning(|attempt| Ok(attempt.ref_id));

    let mut sessions = MockSessionStore::new();
    sessions.expect_put().times(1).returning(|_| Ok(()));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_card_charge()
        .withf(|_, _, _, _, suggested_auth| suggested_auth.is_none())
        .times(1)
        .returning(|_, _, _, _, _| Ok(charge(Some("PIN"), false)));
    gateway
        .expect_create_card_charge()
        .withf(|_, _, _, _, suggested_auth| suggested_auth.as_deref() == Some("PIN"))
        .times(1)
        .returning(|_, _, _, _, _| Ok(charge(None, true)));

    let outcome = usecase(
        invoices,
        attempts,
        MockReconciliationLedger::new(),
        sessions,
        gateway,
    )
    .start(&active_user(UserRole::User), "INV-1", card_details())
    .await
    .expect("pin retry should succeed");

    assert!(outcome.validation_required);
}

#[tokio::test]
async fn rejected_otp_closes_the_attempt() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().times(1).returning(|_| Ok(true));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_update_status()
        .withf(|r, status| r == "REF-1" && *status == AttemptStatus::Failed)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_validate_card_otp()
        .returning(|_, _| Err(GatewayError::ValidationFailed("otp is incorrect".into())));

    let err = usecase(
        MockInvoiceRepository::new(),
        attempts,
        MockReconciliationLedger::new(),
        sessions,
        gateway,
    )
    .verify(VerifyCardModel {
        ref_id: "REF-1".to_string(),
        otp: "000000".to_string(),
    })
    .await
    .expect_err("bad otp must fail");

    assert!(matches!(err, PaymentError::GatewayRejected(_)));
}

#[tokio::test]
async fn accepted_otp_settles_synchronously() {
    let mut sessions = MockSessionStore::new();
    sessions
        .expect_get()
        .returning(|_| Ok(Some(session_entry("REF-1", "INV-1"))));
    sessions.expect_claim().returning(|_| Ok(true));

    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_find_by_ref_id()
        .returning(|_| Ok(Some(attempt("REF-1", "INV-1", AttemptStatus::Pending, dec!(100.00)))));

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
    gateway.expect_validate_card_otp().returning(|_, _| {
        Ok(OtpValidation {
            message: "Charge validated".to_string(),
        })
    });
    gateway.expect_verify_by_reference().returning(|_| {
        Ok(VerificationResult {
            status: "successful".to_string(),
            amount: dec!(100.00),
            charged_amount: dec!(100.00),
            currency: "NGN".to_string(),
            processor_transaction_ref: "1141230276".to_string(),
        })
    });

    let receipt = usecase(invoices, attempts, ledger, sessions, gateway)
        .verify(VerifyCardModel {
            ref_id: "REF-1".to_string(),
            otp: "123456".to_string(),
        })
        .await
        .expect("otp verification should settle");

    assert!(receipt.transaction_complete);
    assert_eq!(receipt.inv_id, "INV-1");
    assert_eq!(receipt.charged_amount, dec!(100.00));
    assert_eq!(receipt.currency, "NGN");
}
