use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    domain::repositories::{
        invoices::InvoiceRepository, payment_attempts::PaymentAttemptRepository,
        reconciliation_ledger::ReconciliationLedger, session_store::SessionStore,
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
    usecases::bank_transfer::BankTransferUseCase,
};

#[derive(Debug, Deserialize)]
pub struct PayQuery {
    #[serde(rename = "invoiceId")]
    pub invoice_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "refId")]
    pub ref_id: String,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    session_store: Arc<RedisSessionStore>,
    gateway: Arc<FlutterwaveClient>,
) -> Router {
    let invoice_repository = Arc::new(InvoicePostgres::new(Arc::clone(&db_pool)));
    let attempt_repository = Arc::new(PaymentAttemptPostgres::new(Arc::clone(&db_pool)));
    let ledger = Arc::new(ReconciliationLedgerPostgres::new(Arc::clone(&db_pool)));

    let usecase = BankTransferUseCase::new(
        invoice_repository,
        attempt_repository,
        ledger,
        session_store,
        gateway,
    );

    Router::new()
        .route(
            "/pay",
            get(pay::<
                InvoicePostgres,
                PaymentAttemptPostgres,
                ReconciliationLedgerPostgres,
                RedisSessionStore,
                FlutterwaveClient,
            >),
        )
        .route(
            "/verifyTransfer",
            get(verify_transfer::<
                InvoicePostgres,
                PaymentAttemptPostgres,
                ReconciliationLedgerPostgres,
                RedisSessionStore,
                FlutterwaveClient,
            >),
        )
        .with_state(Arc::new(usecase))
}

pub async fn pay<I, A, L, S, G>(
    State(usecase): State<Arc<BankTransferUseCase<I, A, L, S, G>>>,
    active_user: AuthUser,
    Query(query): Query<PayQuery>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.start(&active_user, &query.invoice_id).await {
        Ok(instructions) => (StatusCode::OK, Json(instructions)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify_transfer<I, A, L, S, G>(
    State(usecase): State<Arc<BankTransferUseCase<I, A, L, S, G>>>,
    _active_user: AuthUser,
    Query(query): Query<VerifyQuery>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.verify_transfer(&query.ref_id).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => err.into_response(),
    }
}
