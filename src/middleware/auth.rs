use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Compte authentifié par le header `Authorization: Bearer <token>`
/// Utilisé comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub account_id: i32,
    pub email: String,
    pub has_access: bool,
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // 1. Extraire le token (format: "Bearer <token>")
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Access token required".to_string()))?;

    // 2. Le secret vient de la config partagée
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState not registered".to_string()))?;

    // 3. Vérifier signature + expiration
    let claims = jwt::verify_session_token(&state.config.auth.jwt_secret, token).map_err(|e| {
        tracing::debug!("Bearer token rejected: {}", e);
        AppError::InvalidToken
    })?;

    Ok(AuthUser {
        account_id: claims.user_id,
        email: claims.email,
        has_access: claims.has_purchased,
    })
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Error::from))
    }
}
