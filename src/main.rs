mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Condition, DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::mailer::SmtpMailer;
use crate::services::payment_gateway::{PaymentGateway, RazorpayGateway};
use crate::services::rate_limiter::{InMemoryRateLimiter, RateLimiter};
use crate::services::recovery_service;
use crate::state::AppState;

const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:8080",
];

fn cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .supports_credentials();

    if config.is_production() {
        cors = cors.allowed_origin(&config.frontend_url);
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
    } else {
        for origin in DEV_ORIGINS {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-XSS-Protection", "1; mode=block"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(AppConfig::from_env()?);

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&config.database).await?;
    db::sync_schema(&db).await?;
    tracing::info!("Database connected");

    let gateway = RazorpayGateway::new(&config.razorpay)?;
    tracing::info!(
        key_configured = gateway.public_key().is_some(),
        test_key = config.razorpay.is_test_key(),
        "Razorpay gateway ready"
    );

    let mailer = SmtpMailer::new(&config.mail)?;
    match mailer.test_connection().await {
        Ok(true) => tracing::info!(provider = %config.mail.provider, "Mail transport ready"),
        Ok(false) => tracing::warn!(provider = %config.mail.provider, "Mail transport not reachable"),
        Err(e) => tracing::warn!(provider = %config.mail.provider, "Mail transport check failed: {}", e),
    }

    let rate_limiter = Arc::new(InMemoryRateLimiter::new());

    // purge horaire des tentatives de reset
    let evicted = rate_limiter.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            ticker.tick().await;
            evicted
                .evict_expired(recovery_service::reset_window(), chrono::Utc::now())
                .await;
            tracing::debug!(tracked = evicted.tracked_keys(), "Rate limiter evicted");
        }
    });

    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        gateway: Arc::new(gateway),
        mailer: Arc::new(mailer),
        rate_limiter,
    };

    tracing::info!(
        environment = ?config.environment,
        payment_mode = ?config.payment_mode,
        "Starting server on http://{}:{}",
        config.host,
        config.port
    );

    let server_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Condition::new(server_config.is_production(), security_headers()))
            .wrap(cors(&server_config))
            .wrap(Logger::default())
            .configure(routes::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    db.close().await?;
    tracing::info!("Server stopped");

    Ok(())
}
