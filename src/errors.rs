use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::utils::jwt::TokenError;
use crate::utils::password::PasswordError;

/// Erreurs de validation, toujours détectées avant toute écriture en base
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    PolicyViolation(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Email déjà utilisé (400 pour rester compatible avec le frontend)
    #[error("{0}")]
    Conflict(String),

    /// Commande absente ou dans un statut refusé
    #[error("{0}")]
    InvalidState(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("{0}")]
    Unauthenticated(String),

    /// Token bearer invalide ou expiré sur une route protégée
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{message}")]
    ServiceUnavailable { message: String, cause: String },

    /// Mail de reset non envoyé; en développement le token reste renvoyé au client
    #[error("Failed to send password reset email. Please try again later.")]
    MailDelivery { cause: String, reset_token: Option<String> },

    #[error("Database error")]
    Persistence(#[source] DbErr),

    /// Erreur interne inattendue (hash, signature JWT...)
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn service_unavailable(message: impl Into<String>, cause: impl ToString) -> Self {
        AppError::ServiceUnavailable {
            message: message.into(),
            cause: cause.to_string(),
        }
    }

    /// Message montré au client, sans détail interne
    pub fn user_message(&self) -> String {
        match self {
            AppError::Persistence(_) => "Database error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Violation d'unicité sur user_details.email: un seul compte par email,
/// même si deux inscriptions passent la vérification applicative en même temps.
impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::InvalidState("Invalid payment reference".to_string())
            }
            _ => AppError::Persistence(err),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::InvalidState(_)
            | AppError::InvalidSignature => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable { .. }
            | AppError::MailDelivery { .. }
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ServiceUnavailable { cause, .. } => {
                tracing::error!(%cause, "Upstream service error: {}", self);
            }
            AppError::MailDelivery { cause, .. } => {
                tracing::error!(%cause, "Password reset email not sent");
            }
            AppError::Persistence(err) => {
                tracing::error!(error = %err, "Database error");
            }
            AppError::Internal(cause) => {
                tracing::error!(%cause, "Internal error");
            }
            AppError::RateLimited(_) | AppError::Conflict(_) => {
                tracing::warn!("Client error: {}", self);
            }
            AppError::Unauthenticated(_) | AppError::InvalidToken | AppError::InvalidSignature => {
                tracing::info!("Authentication error: {}", self);
            }
            _ => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.user_message()
        });
        if let AppError::MailDelivery { reset_token: Some(token), .. } = self {
            body["resetToken"] = serde_json::Value::String(token.clone());
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
