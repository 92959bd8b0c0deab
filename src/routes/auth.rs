use actix_web::{get, post, web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    AccountSummary, AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    MessageResponse, ProfileResponse, ResetPasswordRequest, SubmitDetailsRequest, SubmitDetailsResponse,
    TokenUser, VerifyTokenRequest, VerifyTokenResponse,
};
use crate::services::account_service::AccountService;
use crate::services::recovery_service::{RecoveryService, RESET_DONE_MESSAGE, RESET_SENT_MESSAGE};
use crate::state::AppState;

/// POST /api/submit-details - Créer le compte après paiement (PUBLIC)
#[post("/submit-details")]
pub async fn submit_details(
    state: web::Data<AppState>,
    body: web::Json<SubmitDetailsRequest>,
) -> Result<HttpResponse, AppError> {
    let grant = AccountService::provision(&state, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(SubmitDetailsResponse {
        success: true,
        message: "Registration completed successfully".to_string(),
        submission_id: grant.account.id,
        user: AccountSummary::from(&grant.account),
        token: grant.token,
    }))
}

/// POST /api/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let grant = AccountService::login(&state, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user: AccountSummary::from(&grant.account),
        token: grant.token,
    }))
}

/// POST /api/verify-token - Décoder un token de session (PUBLIC)
#[post("/verify-token")]
pub async fn verify_token(
    state: web::Data<AppState>,
    body: web::Json<VerifyTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = AccountService::verify_session(&state, &body.token)?;

    Ok(HttpResponse::Ok().json(VerifyTokenResponse {
        success: true,
        user: TokenUser {
            user_id: claims.user_id,
            email: claims.email,
            has_purchased: claims.has_purchased,
        },
    }))
}

/// GET /api/profile - Profil du compte connecté (PROTÉGÉE)
#[get("/profile")]
pub async fn profile(state: web::Data<AppState>, auth_user: AuthUser) -> Result<HttpResponse, AppError> {
    let account = AccountService::profile(&state, auth_user.account_id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse::from(account)))
}

/// POST /api/forgot-password - Envoyer le lien de reset (PUBLIC, 3/heure par IP + email)
#[post("/forgot-password")]
pub async fn forgot_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let client_ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    let dispatch = RecoveryService::initiate(&state, &client_ip, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ForgotPasswordResponse {
        success: true,
        message: RESET_SENT_MESSAGE.to_string(),
        reset_token: dispatch.dev_reset_token,
    }))
}

/// POST /api/reset-password - Changer le mot de passe avec le token reçu par mail (PUBLIC)
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    RecoveryService::complete(&state, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: RESET_DONE_MESSAGE.to_string(),
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_details)
        .service(login)
        .service(verify_token)
        .service(profile)
        .service(forgot_password)
        .service(reset_password);
}
