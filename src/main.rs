use anyhow::Result;
use paydesk::config::config_loader;
use paydesk::infrastructure::axum_http::http_serve;
use paydesk::infrastructure::postgres::postgres_connection;
use paydesk::infrastructure::redis_cache::redis_connection;
use paydesk::observability;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let redis_conn = redis_connection::establish_connection(&dotenvy_env.redis.url).await?;
    info!("Redis connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool), redis_conn).await?;

    Ok(())
}
