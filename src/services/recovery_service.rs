use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::errors::{AppError, ValidationError};
use crate::models::accounts;
use crate::models::dto::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::services::rate_limiter;
use crate::state::AppState;
use crate::utils::validation::{required, validate_email, validate_password};
use crate::utils::{jwt, password};

/// 3 demandes par heure et par couple IP + email
pub const MAX_RESET_ATTEMPTS: usize = 3;

pub fn reset_window() -> Duration {
    Duration::hours(1)
}

pub const RESET_SENT_MESSAGE: &str =
    "Password reset instructions have been sent to your email address. Please check your inbox and spam folder.";
pub const RESET_DONE_MESSAGE: &str =
    "Password has been reset successfully. You can now login with your new password.";

pub struct RecoveryService;

/// Résultat d'une demande de reset: le token n'est exposé qu'en développement
#[derive(Debug, Clone)]
pub struct ResetDispatch {
    pub dev_reset_token: Option<String>,
}

impl RecoveryService {
    pub fn reset_link(frontend_url: &str, token: &str) -> String {
        format!("{}/reset-password?token={}", frontend_url.trim_end_matches('/'), token)
    }

    /// POST /api/forgot-password
    /// La tentative est comptée avant toute validation.
    pub async fn initiate(
        state: &AppState,
        client_ip: &str,
        request: ForgotPasswordRequest,
    ) -> Result<ResetDispatch, AppError> {
        let email_key = request.email.as_deref().map(str::trim).unwrap_or_default();
        let key = format!("{}:{}", client_ip, email_key);

        let allowed = rate_limiter::try_acquire(
            state.rate_limiter.as_ref(),
            &key,
            MAX_RESET_ATTEMPTS,
            reset_window(),
            Utc::now(),
        )
        .await;

        if !allowed {
            tracing::warn!(client_ip, "Password reset rate limit reached");
            return Err(AppError::RateLimited(
                "Too many password reset attempts. Please try again in an hour.".to_string(),
            ));
        }

        let email = required(&request.email, "Email")?;
        validate_email(email)?;

        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    "No account found with that email address. Please check your email and try again."
                        .to_string(),
                )
            })?;

        let token = jwt::generate_reset_token(&state.config.auth.jwt_secret, account.id, &account.email)?;
        let link = Self::reset_link(&state.config.frontend_url, &token);
        let expose_token = !state.config.is_production();

        if let Err(e) = state
            .mailer
            .send_password_reset(&account.email, Some(&account.name), &link)
            .await
        {
            return Err(AppError::MailDelivery {
                cause: e.to_string(),
                reset_token: expose_token.then_some(token),
            });
        }

        tracing::info!(account_id = account.id, "Password reset email sent");

        Ok(ResetDispatch {
            dev_reset_token: expose_token.then_some(token),
        })
    }

    /// POST /api/reset-password
    /// Le nouveau hash n'est écrit que sur la ligne dont l'id ET l'email
    /// correspondent au token.
    pub async fn complete(state: &AppState, request: ResetPasswordRequest) -> Result<(), AppError> {
        let (Ok(token), Some(new_password)) = (
            required(&request.token, "Token"),
            request.new_password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ValidationError::InvalidFormat("Token and new password are required".to_string()).into());
        };

        validate_password(new_password, state.config.auth.min_password_length)?;

        let claims = jwt::verify_reset_token(&state.config.auth.jwt_secret, token).map_err(|e| {
            tracing::info!("Reset token rejected: {}", e);
            AppError::Unauthenticated("Invalid or expired reset token".to_string())
        })?;

        let password_hash =
            password::hash_password_blocking(new_password.to_string(), state.config.auth.bcrypt_cost).await?;

        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::PasswordHash, Expr::value(password_hash))
            .filter(accounts::Column::Id.eq(claims.user_id))
            .filter(accounts::Column::Email.eq(claims.email.as_str()))
            .exec(&state.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(account_id = claims.user_id, "Password reset completed");

        Ok(())
    }
}
