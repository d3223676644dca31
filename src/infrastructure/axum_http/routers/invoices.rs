use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    auth::AuthUser,
    domain::{
        repositories::invoices::InvoiceRepository,
        value_objects::invoices::CreateInvoiceModel,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad, repositories::invoices::InvoicePostgres,
    },
    usecases::invoices::InvoiceUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let usecase = InvoiceUseCase::new(Arc::new(invoice_repository));

    Router::new()
        .route("/create", post(create_invoice::<InvoicePostgres>))
        .route("/all", get(list_invoices::<InvoicePostgres>))
        .with_state(Arc::new(usecase))
}

pub async fn create_invoice<I>(
    State(usecase): State<Arc<InvoiceUseCase<I>>>,
    active_user: AuthUser,
    Json(payload): Json<CreateInvoiceModel>,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
{
    match usecase.create_invoice(&active_user, payload).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_invoices<I>(
    State(usecase): State<Arc<InvoiceUseCase<I>>>,
    active_user: AuthUser,
) -> impl IntoResponse
where
    I: InvoiceRepository + Send + Sync + 'static,
{
    match usecase.list_invoices(&active_user).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => err.into_response(),
    }
}
