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
    usecases::checkout::CheckoutUseCase,
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

/// One parameter shape for both encodings: the processor's redirect uses
/// `tx_ref`/`transaction_id`, the polling client may send `ref_id`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(alias = "ref_id")]
    pub tx_ref: String,
    pub status: String,
    #[serde(alias = "processor_transaction_id")]
    pub transaction_id: Option<String>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    session_store: Arc<RedisSessionStore>,
    gateway: Arc<FlutterwaveClient>,
) -> Router {
    let invoice_repository = Arc::new(InvoicePostgres::new(Arc::clone(&db_pool)));
    let attempt_repository = Arc::new(PaymentAttemptPostgres::new(Arc::clone(&db_pool)));
    let ledger = Arc::new(ReconciliationLedgerPostgres::new(Arc::clone(&db_pool)));

    let usecase = CheckoutUseCase::new(
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
            "/callback",
            get(callback::<
                InvoicePostgres,
                PaymentAttemptPostgres,
                ReconciliationLedgerPostgres,
                RedisSessionStore,
                FlutterwaveClient,
            >),
        )
        .route(
            "/verifyPayments",
            get(verify_payments::<
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
    State(usecase): State<Arc<CheckoutUseCase<I, A, L, S, G>>>,
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
        Ok(link) => (StatusCode::OK, Json(link)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Called by the processor after the payer finishes (or abandons) the hosted
/// page; also serves the frontend's post-redirect report. No caller identity:
/// the session store is what vouches for the reference.
pub async fn callback<I, A, L, S, G>(
    State(usecase): State<Arc<CheckoutUseCase<I, A, L, S, G>>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase
        .handle_callback(&params.tx_ref, &params.status, params.transaction_id)
        .await
    {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify_payments<I, A, L, S, G>(
    State(usecase): State<Arc<CheckoutUseCase<I, A, L, S, G>>>,
    Query(query): Query<VerifyQuery>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
    A: PaymentAttemptRepository + Send + Sync + 'static,
    L: ReconciliationLedger + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match usecase.verify_payments(&query.ref_id).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(err) => err.into_response(),
    }
}
