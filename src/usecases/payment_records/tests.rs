use std::sync::Arc;

use rust_decimal_macros::dec;

use super::*;
use crate::domain::repositories::payment_attempts::MockPaymentAttemptRepository;
use crate::domain::value_objects::enums::{
    attempt_statuses::AttemptStatus, user_roles::UserRole,
};
use crate::usecases::test_fixtures::{active_user, attempt};

#[tokio::test]
async fn user_role_only_sees_its_own_records() {
    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_list_by_payer()
        .withf(|email| email == "payer@example.com")
        .times(1)
        .returning(|_| Ok(vec![attempt("REF-1", "INV-1", AttemptStatus::Paid, dec!(100.00))]));
    attempts.expect_list_all().never();

    let records = PaymentRecordsUseCase::new(Arc::new(attempts))
        .list_all(&active_user(UserRole::User))
        .await
        .expect("listing should work");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ref_id, "REF-1");
}

#[tokio::test]
async fn privileged_roles_see_everything() {
    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_all().times(1).returning(|| {
        Ok(vec![
            attempt("REF-1", "INV-1", AttemptStatus::Paid, dec!(100.00)),
            attempt("REF-2", "INV-2", AttemptStatus::Failed, dec!(40.00)),
        ])
    });

    let records = PaymentRecordsUseCase::new(Arc::new(attempts))
        .list_all(&active_user(UserRole::Manager))
        .await
        .expect("listing should work");

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn empty_result_is_not_found() {
    let mut attempts = MockPaymentAttemptRepository::new();
    attempts.expect_list_open().returning(|| Ok(vec![]));

    let err = PaymentRecordsUseCase::new(Arc::new(attempts))
        .list_pending(&active_user(UserRole::Admin))
        .await
        .expect_err("empty listing is a 404");

    assert!(matches!(err, PaymentError::RecordNotFound));
}

#[tokio::test]
async fn pending_listing_uses_open_statuses_for_user_role() {
    let mut attempts = MockPaymentAttemptRepository::new();
    attempts
        .expect_list_open_by_payer()
        .withf(|email| email == "payer@example.com")
        .times(1)
        .returning(|_| {
            Ok(vec![attempt(
                "REF-3",
                "INV-3",
                AttemptStatus::Checking,
                dec!(75.00),
            )])
        });

    let records = PaymentRecordsUseCase::new(Arc::new(attempts))
        .list_pending(&active_user(UserRole::User))
        .await
        .expect("listing should work");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, "checking");
}
