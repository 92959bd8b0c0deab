pub mod auth;
pub mod health;
pub mod payments;
pub mod users;

use actix_web::web;

use crate::errors::{AppError, ValidationError};

const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Corps JSON illisible (type faux, Content-Type absent...) => 400 au format AppError
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| AppError::from(ValidationError::InvalidFormat(err.to_string())).into())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(health::health_check)
            .configure(payments::payment_routes)
            .configure(auth::auth_routes)
            .configure(users::user_routes)
    );
}
