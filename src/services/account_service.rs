use chrono::Utc;
use sea_orm::*;

use crate::config::PaymentMode;
use crate::errors::{AppError, ValidationError};
use crate::models::accounts;
use crate::models::dto::{LoginRequest, SubmitDetailsRequest};
use crate::models::orders::{self, OrderStatus};
use crate::state::AppState;
use crate::utils::validation::{required, validate_email, validate_password};
use crate::utils::{jwt, password};

/// Même message pour email inconnu et mauvais mot de passe
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AccountService;

/// Compte créé + token de session
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub account: accounts::Model,
    pub token: String,
}

/// Champs obligatoires du formulaire, une fois vérifiés
struct ProfileInput<'a> {
    order_id: &'a str,
    email: &'a str,
    password: &'a str,
    name: &'a str,
    age: i32,
    phone_number: &'a str,
    gender: &'a str,
    college_name: &'a str,
    college_address: &'a str,
    current_status: &'a str,
    reason: &'a str,
}

impl<'a> ProfileInput<'a> {
    /// Vérifie la présence des champs dans l'ordre du formulaire
    fn from_request(request: &'a SubmitDetailsRequest) -> Result<Self, ValidationError> {
        let order_id = required(&request.order_id, "Order ID")?;
        let email = required(&request.email, "Email")?;
        // le mot de passe n'est pas trimé: seul le contrôle de présence l'est
        required(&request.password, "Password")?;
        let password = request.password.as_deref().unwrap_or_default();
        let name = required(&request.name, "Name")?;
        let age = request
            .age
            .filter(|age| *age != 0)
            .ok_or(ValidationError::MissingField("Age"))?;

        Ok(Self {
            order_id,
            email,
            password,
            name,
            age,
            phone_number: required(&request.phone_number, "Phone Number")?,
            gender: required(&request.gender, "Gender")?,
            college_name: required(&request.college_name, "College Name")?,
            college_address: required(&request.college_address, "College Address")?,
            current_status: required(&request.current_status, "Current Status")?,
            reason: required(&request.reason, "Reason")?,
        })
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AccountService {
    /// Statuts de commande acceptés pour créer un compte
    pub fn accepted_statuses(mode: PaymentMode) -> &'static [OrderStatus] {
        match mode {
            PaymentMode::Strict => &[OrderStatus::Completed],
            PaymentMode::Relaxed => &[OrderStatus::Created, OrderStatus::Completed],
        }
    }

    /// Inscription après paiement: validations, puis insertion du compte lié
    /// à la commande, puis token de session.
    /// L'unicité de l'email est garantie par la contrainte UNIQUE de la base:
    /// deux inscriptions simultanées donnent un succès et un Conflict.
    pub async fn provision(
        state: &AppState,
        request: SubmitDetailsRequest,
    ) -> Result<SessionGrant, AppError> {
        // 1. Champs obligatoires
        let input = ProfileInput::from_request(&request)?;

        // 2. Format de l'email
        validate_email(input.email)?;

        // 3. Longueur du mot de passe
        validate_password(input.password, state.config.auth.min_password_length)?;

        // 4. Email libre
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(input.email))
            .one(&state.db)
            .await?;

        if existing.is_some() {
            tracing::info!("Registration refused: email already registered");
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        // 5. Commande payée (ou créée en mode relaxed)
        let order = orders::Entity::find()
            .filter(orders::Column::RazorpayOrderId.eq(input.order_id))
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("Payment not found. Please complete payment first.".to_string())
            })?;

        if !Self::accepted_statuses(state.config.payment_mode).contains(&order.status) {
            tracing::info!(order_id = input.order_id, status = %order.status, "Registration refused: payment not completed");
            return Err(AppError::InvalidState(format!(
                "Payment not completed. Status: {}",
                order.status
            )));
        }

        // 6. Hash + insertion
        let password_hash =
            password::hash_password_blocking(input.password.to_string(), state.config.auth.bcrypt_cost).await?;

        let new_account = accounts::ActiveModel {
            order_id: Set(Some(order.id)),
            email: Set(input.email.to_string()),
            password_hash: Set(password_hash),
            name: Set(input.name.to_string()),
            age: Set(input.age),
            phone_number: Set(input.phone_number.to_string()),
            gender: Set(input.gender.to_string()),
            college_name: Set(input.college_name.to_string()),
            college_address: Set(input.college_address.to_string()),
            current_status: Set(input.current_status.to_string()),
            course: Set(optional_text(&request.course)),
            year_of_studying: Set(optional_text(&request.year_of_studying)),
            year_of_passedout: Set(request.year_of_passedout),
            reason: Set(input.reason.to_string()),
            cgpa: Set(request.cgpa),
            has_access: Set(true),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };

        let account = new_account.insert(&state.db).await?;

        tracing::info!(account_id = account.id, order_id = input.order_id, "Account registered");

        // 7. Token de session
        let token = jwt::generate_session_token(
            &state.config.auth.jwt_secret,
            account.id,
            &account.email,
            account.has_access,
        )?;

        Ok(SessionGrant { account, token })
    }

    /// Connexion email + mot de passe
    pub async fn login(state: &AppState, request: LoginRequest) -> Result<SessionGrant, AppError> {
        let (Ok(email), Some(password)) = (
            required(&request.email, "Email"),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ValidationError::InvalidFormat("Email and password are required".to_string()).into());
        };

        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

        let is_valid = match password::verify_password_blocking(password.to_string(), account.password_hash.clone()).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(account_id = account.id, "Stored password hash unusable: {}", e);
                false
            }
        };

        if !is_valid {
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let token = jwt::generate_session_token(
            &state.config.auth.jwt_secret,
            account.id,
            &account.email,
            account.has_access,
        )?;

        Ok(SessionGrant { account, token })
    }

    /// Décode un token de session fourni dans le corps de la requête
    pub fn verify_session(state: &AppState, token: &Option<String>) -> Result<jwt::SessionClaims, AppError> {
        let token = required(token, "Token")?;

        jwt::verify_session_token(&state.config.auth.jwt_secret, token).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            AppError::Unauthenticated("Invalid or expired token".to_string())
        })
    }

    pub async fn profile(state: &AppState, account_id: i32) -> Result<accounts::Model, AppError> {
        accounts::Entity::find_by_id(account_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Compte + commande pour un id de commande Razorpay
    pub async fn details_by_order(
        state: &AppState,
        razorpay_order_id: &str,
    ) -> Result<(accounts::Model, orders::Model), AppError> {
        let row = accounts::Entity::find()
            .find_also_related(orders::Entity)
            .filter(orders::Column::RazorpayOrderId.eq(razorpay_order_id))
            .one(&state.db)
            .await?;

        match row {
            Some((account, Some(order))) => Ok((account, order)),
            _ => Err(AppError::NotFound("Details not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestContext, JWT_SECRET};
    use rust_decimal::Decimal;

    fn submission(order_id: &str, email: &str) -> SubmitDetailsRequest {
        SubmitDetailsRequest {
            order_id: Some(order_id.to_string()),
            email: Some(email.to_string()),
            password: Some("secret123".to_string()),
            name: Some("Asha Rao".to_string()),
            age: Some(21),
            phone_number: Some("9876543210".to_string()),
            gender: Some("female".to_string()),
            college_name: Some("JNTU Hyderabad".to_string()),
            college_address: Some("Kukatpally, Hyderabad".to_string()),
            current_status: Some("student".to_string()),
            course: Some("B.Tech".to_string()),
            year_of_studying: Some("3".to_string()),
            year_of_passedout: None,
            reason: Some("Learn Python in Telugu".to_string()),
            cgpa: Some(Decimal::new(850, 2)),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_provision_against_completed_order() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;

        let grant = AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap();

        assert_eq!(grant.account.email, "asha@example.com");
        assert_eq!(grant.account.order_id, Some(order.id));
        assert!(grant.account.has_access);
        assert_ne!(grant.account.password_hash, "secret123");
        assert!(password::verify_password("secret123", &grant.account.password_hash).unwrap());

        let claims = jwt::verify_session_token(JWT_SECRET, &grant.token).unwrap();
        assert_eq!(claims.user_id, grant.account.id);
        assert_eq!(claims.email, "asha@example.com");
        assert!(claims.has_purchased);
    }

    #[tokio::test]
    async fn test_missing_fields_are_named_in_order() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;

        let mut request = submission(&order.razorpay_order_id, "asha@example.com");
        request.phone_number = None;
        request.reason = Some("  ".to_string());
        let err = AccountService::provision(&ctx.state, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Phone Number is required");

        let mut request = submission(&order.razorpay_order_id, "asha@example.com");
        request.reason = None;
        let err = AccountService::provision(&ctx.state, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Reason is required");

        let mut request = submission(&order.razorpay_order_id, "asha@example.com");
        request.order_id = None;
        let err = AccountService::provision(&ctx.state, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Order ID is required");
    }

    #[tokio::test]
    async fn test_invalid_email_and_short_password() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;

        let err = AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidFormat(_))));

        let mut request = submission(&order.razorpay_order_id, "asha@example.com");
        request.password = Some("12345".to_string());
        let err = AccountService::provision(&ctx.state, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::PolicyViolation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let ctx = TestContext::new().await;
        let first = ctx.completed_order(9900).await;
        let second = ctx.completed_order(9900).await;

        AccountService::provision(&ctx.state, submission(&first.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap();
        let err = AccountService::provision(&ctx.state, submission(&second.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_for_same_email() {
        let ctx = TestContext::new().await;
        let first = ctx.completed_order(9900).await;
        let second = ctx.completed_order(9900).await;

        let (a, b) = tokio::join!(
            AccountService::provision(&ctx.state, submission(&first.razorpay_order_id, "race@example.com")),
            AccountService::provision(&ctx.state, submission(&second.razorpay_order_id, "race@example.com")),
        );

        let results = [a, b];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count();
        assert_eq!((successes, conflicts), (1, 1));

        let stored = accounts::Entity::find()
            .filter(accounts::Column::Email.eq("race@example.com"))
            .count(&ctx.state.db)
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_created_order() {
        let ctx = TestContext::new().await;
        let order = ctx.created_order(9900).await;

        let err = AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.to_string(), "Payment not completed. Status: created");
    }

    #[tokio::test]
    async fn test_relaxed_mode_accepts_created_order() {
        let ctx = TestContext::with_config(&[("PAYMENT_MODE", "relaxed")]).await;
        let order = ctx.created_order(9900).await;

        let grant = AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap();

        assert_eq!(grant.account.order_id, Some(order.id));
    }

    #[tokio::test]
    async fn test_unknown_order_is_rejected() {
        let ctx = TestContext::with_config(&[("PAYMENT_MODE", "relaxed")]).await;

        let err = AccountService::provision(&ctx.state, submission("order_nope", "asha@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Payment not found. Please complete payment first.");
    }

    #[tokio::test]
    async fn test_login_success_and_identical_failures() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;
        AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap();

        let grant = AccountService::login(&ctx.state, login_request("asha@example.com", "secret123"))
            .await
            .unwrap();
        let claims = jwt::verify_session_token(JWT_SECRET, &grant.token).unwrap();
        assert_eq!(claims.email, "asha@example.com");

        let wrong_password = AccountService::login(&ctx.state, login_request("asha@example.com", "secret999"))
            .await
            .unwrap_err();
        let unknown_email = AccountService::login(&ctx.state, login_request("nobody@example.com", "secret123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::Unauthenticated(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let ctx = TestContext::new().await;

        let err = AccountService::login(
            &ctx.state,
            LoginRequest {
                email: Some("asha@example.com".to_string()),
                password: None,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Email and password are required");
    }

    #[tokio::test]
    async fn test_verify_session() {
        let ctx = TestContext::new().await;
        let token = jwt::generate_session_token(JWT_SECRET, 3, "asha@example.com", true).unwrap();

        let claims = AccountService::verify_session(&ctx.state, &Some(token)).unwrap();
        assert_eq!(claims.user_id, 3);

        let err = AccountService::verify_session(&ctx.state, &None).unwrap_err();
        assert_eq!(err.to_string(), "Token is required");

        let reset = jwt::generate_reset_token("other-secret", 3, "asha@example.com").unwrap();
        let err = AccountService::verify_session(&ctx.state, &Some(reset)).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let ctx = TestContext::new().await;

        let err = AccountService::profile(&ctx.state, 404).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_details_by_order() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;
        AccountService::provision(&ctx.state, submission(&order.razorpay_order_id, "asha@example.com"))
            .await
            .unwrap();

        let (account, joined) = AccountService::details_by_order(&ctx.state, &order.razorpay_order_id)
            .await
            .unwrap();
        assert_eq!(account.email, "asha@example.com");
        assert_eq!(joined.id, order.id);
        assert_eq!(account.cgpa, Some(Decimal::new(850, 2)));

        let err = AccountService::details_by_order(&ctx.state, "order_unknown").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
