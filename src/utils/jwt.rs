use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use chrono::{Utc, Duration};

/// Durée de vie d'un token de session
pub const SESSION_TTL_DAYS: i64 = 7;

/// Durée de vie d'un token de reset password
pub const RESET_TTL_HOURS: i64 = 1;

/// Valeur du claim `type` d'un token de reset
pub const PASSWORD_RESET_TYPE: &str = "password_reset";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to calculate expiration")]
    Expiration,

    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token type")]
    WrongPurpose,
}

/// Claims du token de session (format attendu par le frontend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: i32,
    pub email: String,
    pub has_purchased: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Claims du token de reset password: pas stocké en base, valable 1h
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetClaims {
    pub user_id: i32,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

fn expiration_after(duration: Duration) -> Result<(i64, i64), TokenError> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(duration)
        .ok_or(TokenError::Expiration)?
        .timestamp();
    Ok((now.timestamp(), exp))
}

fn encode_claims<T: Serialize>(secret: &str, claims: &T) -> Result<String, TokenError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(TokenError::from)
}

fn decode_claims<T: DeserializeOwned>(secret: &str, token: &str) -> Result<T, TokenError> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(TokenError::from)
}

/// Génère un token de session (7 jours) pour un compte
pub fn generate_session_token(
    secret: &str,
    account_id: i32,
    email: &str,
    has_access: bool,
) -> Result<String, TokenError> {
    let (iat, exp) = expiration_after(Duration::days(SESSION_TTL_DAYS))?;

    let claims = SessionClaims {
        user_id: account_id,
        email: email.to_string(),
        has_purchased: has_access,
        iat,
        exp,
    };

    encode_claims(secret, &claims)
}

/// Vérifie signature + expiration d'un token de session
pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, TokenError> {
    decode_claims(secret, token)
}

/// Génère un token de reset password (1 heure)
pub fn generate_reset_token(secret: &str, account_id: i32, email: &str) -> Result<String, TokenError> {
    let (iat, exp) = expiration_after(Duration::hours(RESET_TTL_HOURS))?;

    let claims = ResetClaims {
        user_id: account_id,
        email: email.to_string(),
        token_type: PASSWORD_RESET_TYPE.to_string(),
        iat,
        exp,
    };

    encode_claims(secret, &claims)
}

/// Vérifie un token de reset: signature, expiration et claim `type`
pub fn verify_reset_token(secret: &str, token: &str) -> Result<ResetClaims, TokenError> {
    let claims: ResetClaims = decode_claims(secret, token)?;

    if claims.token_type != PASSWORD_RESET_TYPE {
        return Err(TokenError::WrongPurpose);
    }

    Ok(claims)
}
