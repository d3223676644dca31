use std::sync::Arc;

use crate::auth::AuthUser;
use crate::domain::{
    entities::payment_attempts::PaymentAttemptEntity,
    repositories::payment_attempts::PaymentAttemptRepository,
    value_objects::payments::PaymentRecordDto,
};
use crate::usecases::payment_error::{PaymentError, PaymentResult};

/// Read-only views over the attempt audit trail. `user` callers only see
/// their own records, privileged roles see everything.
pub struct PaymentRecordsUseCase<A>
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    attempt_repository: Arc<A>,
}

impl<A> PaymentRecordsUseCase<A>
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    pub fn new(attempt_repository: Arc<A>) -> Self {
        Self { attempt_repository }
    }

    pub async fn list_all(&self, active_user: &AuthUser) -> PaymentResult<Vec<PaymentRecordDto>> {
        let records = if active_user.role.is_privileged() {
            self.attempt_repository.list_all().await
        } else {
            self.attempt_repository
                .list_by_payer(&active_user.email)
                .await
        }
        .map_err(PaymentError::Internal)?;

        serialize_non_empty(records)
    }

    pub async fn list_pending(
        &self,
        active_user: &AuthUser,
    ) -> PaymentResult<Vec<PaymentRecordDto>> {
        let records = if active_user.role.is_privileged() {
            self.attempt_repository.list_open().await
        } else {
            self.attempt_repository
                .list_open_by_payer(&active_user.email)
                .await
        }
        .map_err(PaymentError::Internal)?;

        serialize_non_empty(records)
    }
}

fn serialize_non_empty(
    records: Vec<PaymentAttemptEntity>,
) -> PaymentResult<Vec<PaymentRecordDto>> {
    if records.is_empty() {
        return Err(PaymentError::RecordNotFound);
    }
    Ok(records.into_iter().map(PaymentRecordDto::from).collect())
}

#[cfg(test)]
mod tests;
