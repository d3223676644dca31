use crate::config::stage::Stage;
use anyhow::{Ok, Result};

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let redis = super::config_model::Redis {
        url: std::env::var("REDIS_URL").expect("REDIS_URL is invalid"),
        session_ttl_seconds: std::env::var("REDIS_SESSION_TTL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?,
    };

    let gateway = super::config_model::Gateway {
        base_url: std::env::var("GATEWAY_BASE_URL")
            .unwrap_or_else(|_| "https://api.flutterwave.com/v3".to_string()),
        secret_key: std::env::var("GATEWAY_SECRET_KEY").expect("GATEWAY_SECRET_KEY is invalid"),
        redirect_url: std::env::var("GATEWAY_REDIRECT_URL")
            .expect("GATEWAY_REDIRECT_URL is invalid"),
        currency: std::env::var("GATEWAY_CURRENCY").unwrap_or_else(|_| "NGN".to_string()),
        connect_timeout_seconds: std::env::var("GATEWAY_CONNECT_TIMEOUT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?,
        read_timeout_seconds: std::env::var("GATEWAY_READ_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?,
    };

    let auth = super::config_model::Auth {
        jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET is invalid"),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        redis,
        gateway,
        auth,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}
