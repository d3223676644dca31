use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    domain::{
        repositories::{
            invoices::InvoiceRepository, payment_attempts::PaymentAttemptRepository,
            reconciliation_ledger::ReconciliationLedger, session_store::SessionStore,
        },
        value_objects::payments::{CardDetails, VerifyCardModel},
    },
    infrastructure::{
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                invoices::InvoicePostgres, payment_attempts::PaymentAttemptPostgres,
                reconciliation_ledger::ReconciliationLedgerPostgres,
            },
        },
        redis_cache::session_store::RedisSessionStore,
    },
    payments::gateway::{FlutterwaveClient, PaymentGateway},
    usecases::card::CardPaymentUseCase,
};

#[derive(Debug, Deserialize)]
pub struct PayQuery {
    #[serde(rename = "invoiceId")]
    pub invoice_id: String,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    session_store: Arc<RedisSessionStore>,
    gateway: Arc<FlutterwaveClient>,
) -> Router {
    let invoice_repository = Arc::new(InvoicePostgres::new(Arc::clone(&db_pool)));
    let attempt_repository = Arc::new(PaymentAttemptPostgres::new(Arc::clone(&db_pool)));
    let ledger = Arc::new(ReconciliationLedgerPostgres::new(Arc::clone(&db_pool)));

    let usecase = CardPaymentUseCase::new(
        invoice_repository,
        attempt_repository,
        ledger,
        session_store,
        gateway,
    );

    Router::new()
        .route(
            "/pay",
            post(
                pay::<
                    InvoicePostgres,
                    PaymentAttemptPostgres,
                    ReconciliationLedgerPostgres,
                    RedisSessionStore,
                    FlutterwaveClient,
                >,
            ),
        )
        .route(
            "/verify",
            post(
                verify::<
                    InvoicePostgres,
                    PaymentAttemptPostgres,
                    ReconciliationLedgerPostgres,
                    RedisSessionStore,
                    FlutterwaveClient,
                >,
            ),
        )
        .with_state(Arc::new(usecase))
}

pub async fn pay<I, A, L, S, G>(
    State(usecase): State<Arc<CardPaymentUseCase<I, A, L, S, G>>>,
    active_user: AuthUser,
    Query(query): Query<PayQuery>,
    Json(card): Json<CardDetails>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.start(&active_user, &query.invoice_id, card).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify<I, A, L, S, G>(
    State(usecase): State<Arc<CardPaymentUseCase<I, A, L, S, G>>>,
    _active_user: AuthUser,
    Json(payload): Json<VerifyCardModel>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.verify(payload).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => err.into_response(),
    }
}
