use thiserror::Error;

/// Coût bcrypt par défaut (2^10 tours), identique aux hash `$2a$10$` déjà en base
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash un mot de passe avec bcrypt (salt aléatoire inclus dans le hash)
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Vérifie un mot de passe contre un hash bcrypt ($2a$, $2b$ ou $2y$)
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, stored_hash)?)
}

/// Version async: bcrypt est coûteux en CPU, on le sort du thread du handler
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost)).await?
}

pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?
}
