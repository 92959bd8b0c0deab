// DTO des requêtes/réponses JSON.
// Les noms de champs restent ceux attendus par le frontend (camelCase pour le
// parcours paiement/auth, snake_case pour les vues de profil).
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::accounts;

// ---------------------------------------------------------------------------
// Paiement
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, max = 2_147_483_647, message = "Amount must be a positive integer"))]
    pub amount: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "external_order_id")]
    pub razorpay_order_id: Option<String>,
    #[serde(alias = "external_payment_id")]
    pub razorpay_payment_id: Option<String>,
    #[serde(alias = "signature")]
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
}

// ---------------------------------------------------------------------------
// Inscription / connexion
// ---------------------------------------------------------------------------

/// Formulaire d'inscription envoyé après le paiement.
/// Tout est optionnel ici: la présence des champs est vérifiée par le service
/// pour pouvoir nommer le champ manquant.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDetailsRequest {
    pub order_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub college_name: Option<String>,
    pub college_address: Option<String>,
    pub current_status: Option<String>,
    pub course: Option<String>,
    pub year_of_studying: Option<String>,
    pub year_of_passedout: Option<i32>,
    pub reason: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cgpa: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(rename = "hasPurchased")]
    pub has_access: bool,
}

impl From<&accounts::Model> for AccountSummary {
    fn from(account: &accounts::Model) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            has_access: account.has_access,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDetailsResponse {
    pub success: bool,
    pub message: String,
    pub submission_id: i32,
    pub token: String,
    pub user: AccountSummary,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AccountSummary,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    pub user_id: i32,
    pub email: String,
    pub has_purchased: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub success: bool,
    pub user: TokenUser,
}

// ---------------------------------------------------------------------------
// Mot de passe oublié
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    /// Uniquement en développement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Vues du compte (sans password_hash)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub phone_number: String,
    pub gender: String,
    pub college_name: String,
    pub college_address: String,
    pub current_status: String,
    pub course: Option<String>,
    pub year_of_studying: Option<String>,
    pub year_of_passedout: Option<i32>,
    pub reason: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cgpa: Option<Decimal>,
    pub has_purchased: bool,
    pub created_at: Option<NaiveDateTime>,
}

impl From<accounts::Model> for ProfileResponse {
    fn from(account: accounts::Model) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            age: account.age,
            phone_number: account.phone_number,
            gender: account.gender,
            college_name: account.college_name,
            college_address: account.college_address,
            current_status: account.current_status,
            course: account.course,
            year_of_studying: account.year_of_studying,
            year_of_passedout: account.year_of_passedout,
            reason: account.reason,
            cgpa: account.cgpa,
            has_purchased: account.has_access,
            created_at: account.created_at,
        }
    }
}

/// Vue jointe commande + compte pour GET /api/user-details/:orderId
#[derive(Debug, Serialize)]
pub struct UserDetailsResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub payment_id: Option<i32>,
    pub razorpay_payment_id: Option<String>,
    pub amount: i32,
}
