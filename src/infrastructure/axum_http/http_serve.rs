use crate::{
    config::config_model::DotEnvyConfig,
    infrastructure::{
        axum_http::{default_routers, routers},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                invoices::InvoicePostgres, payment_attempts::PaymentAttemptPostgres,
                reconciliation_ledger::ReconciliationLedgerPostgres,
            },
        },
        redis_cache::session_store::RedisSessionStore,
    },
    payments::gateway::FlutterwaveClient,
    usecases::reconciliation::ReconciliationEngine,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use redis::aio::ConnectionManager;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    redis_conn: ConnectionManager,
) -> Result<()> {
    let gateway = Arc::new(FlutterwaveClient::new(&config.gateway)?);
    let session_store = Arc::new(RedisSessionStore::new(
        redis_conn,
        config.redis.session_ttl_seconds,
    ));

    spawn_startup_recovery(
        Arc::clone(&db_pool),
        Arc::clone(&session_store),
        Arc::clone(&gateway),
    );

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/invoice", routers::invoices::routes(Arc::clone(&db_pool)))
        .nest(
            "/payments",
            routers::payment_records::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/bankTransfer",
            routers::bank_transfer::routes(
                Arc::clone(&db_pool),
                Arc::clone(&session_store),
                Arc::clone(&gateway),
            ),
        )
        .nest(
            "/card",
            routers::card::routes(
                Arc::clone(&db_pool),
                Arc::clone(&session_store),
                Arc::clone(&gateway),
            ),
        )
        .nest(
            "/checkout",
            routers::checkout::routes(
                Arc::clone(&db_pool),
                Arc::clone(&session_store),
                Arc::clone(&gateway),
            ),
        )
        .route("/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Deferred verifications queued by callbacks do not survive a restart;
/// attempts persisted in `checking` are re-driven here instead.
fn spawn_startup_recovery(
    db_pool: Arc<PgPoolSquad>,
    session_store: Arc<RedisSessionStore>,
    gateway: Arc<FlutterwaveClient>,
) {
    let engine = ReconciliationEngine::new(
        Arc::new(PaymentAttemptPostgres::new(Arc::clone(&db_pool))),
        Arc::new(InvoicePostgres::new(Arc::clone(&db_pool))),
        Arc::new(ReconciliationLedgerPostgres::new(Arc::clone(&db_pool))),
        session_store,
        gateway,
    );

    tokio::spawn(async move {
        match engine.resume_open_verifications().await {
            Ok(settled) => info!(settled, "startup recovery finished"),
            Err(err) => error!(error = %err, "startup recovery failed"),
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
