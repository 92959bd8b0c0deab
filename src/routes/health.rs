use actix_web::{get, HttpResponse};
use chrono::Utc;
use crate::models::health::HealthResponse;

/// GET /api/health - Liveness probe (PUBLIC)
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "Server is running!".to_string(),
        timestamp: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
