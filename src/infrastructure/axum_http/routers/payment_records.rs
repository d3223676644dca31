use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};

use crate::{
    auth::AuthUser,
    domain::repositories::payment_attempts::PaymentAttemptRepository,
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        repositories::payment_attempts::PaymentAttemptPostgres,
    },
    usecases::payment_records::PaymentRecordsUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let attempt_repository = PaymentAttemptPostgres::new(Arc::clone(&db_pool));
    let usecase = PaymentRecordsUseCase::new(Arc::new(attempt_repository));

    Router::new()
        .route("/all", get(list_all::<PaymentAttemptPostgres>))
        .route("/pending", get(list_pending::<PaymentAttemptPostgres>))
        .with_state(Arc::new(usecase))
}

pub async fn list_all<A>(
    State(usecase): State<Arc<PaymentRecordsUseCase<A>>>,
    active_user: AuthUser,
) -> impl IntoResponse
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    match usecase.list_all(&active_user).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_pending<A>(
    State(usecase): State<Arc<PaymentRecordsUseCase<A>>>,
    active_user: AuthUser,
) -> impl IntoResponse
where
    A: PaymentAttemptRepository + Send + Sync + 'static,
{
    match usecase.list_pending(&active_user).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => err.into_response(),
    }
}
