use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::mailer::Mailer;
use crate::services::payment_gateway::PaymentGateway;
use crate::services::rate_limiter::RateLimiter;

/// État partagé entre tous les workers actix (via web::Data)
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}
