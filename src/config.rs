// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toute la configuration vient des variables d'environnement (.env chargé
//   par dotenv dans main.rs). `from_lookup` permet aux tests de fournir
//   leurs propres valeurs sans modifier l'environnement du process.
//
// Points d'attention:
//   - JWT_SECRET obligatoire en production
//   - PAYMENT_MODE par défaut: relaxed en développement, strict en production
//   - Les clés Razorpay sont optionnelles: sans elles, create-order et
//     verify-payment répondent ServiceUnavailable
//
// ============================================================================

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::utils::password;

const INSECURE_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// Statuts de commande acceptés à l'inscription.
/// Strict: `completed` seulement. Relaxed: `created` ou `completed` (clés de test Razorpay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Strict,
    Relaxed,
}

impl FromStr for PaymentMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(PaymentMode::Strict),
            "relaxed" => Ok(PaymentMode::Relaxed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl RazorpayConfig {
    pub fn is_test_key(&self) -> bool {
        self.key_id
            .as_deref()
            .is_some_and(|key| key.starts_with("rzp_test"))
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub min_password_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransportConfig {
    Smtp {
        host: String,
        port: Option<u16>,
        username: String,
        password: String,
    },
    File {
        dir: String,
    },
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Nom lisible du fournisseur (sendgrid, mailgun, gmail, smtp, file)
    pub provider: String,
    pub transport: MailTransportConfig,
    pub from_name: String,
    pub from_address: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub payment_mode: PaymentMode,
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub razorpay: RazorpayConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la config à partir d'une fonction de lecture (env ou map de test)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "APP_ENV",
                value,
            })?,
            None => Environment::Development,
        };

        let payment_mode = match get("PAYMENT_MODE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "PAYMENT_MODE",
                value,
            })?,
            None => match environment {
                Environment::Development => PaymentMode::Relaxed,
                Environment::Production => PaymentMode::Strict,
            },
        };

        let jwt_secret = match (get("JWT_SECRET"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Production) => return Err(ConfigError::Missing("JWT_SECRET")),
            (None, Environment::Development) => {
                tracing::warn!("JWT_SECRET not set, using default (INSECURE)");
                INSECURE_JWT_SECRET.to_string()
            }
        };

        let frontend_url = get("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = get("CORS_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database = DatabaseConfig {
            url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 30)?,
            min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", 5)?,
            connect_timeout: Duration::from_secs(parse_or(&get, "DB_CONNECT_TIMEOUT_SECS", 5)?),
        };

        let razorpay = RazorpayConfig {
            key_id: get("RAZORPAY_KEY_ID"),
            key_secret: get("RAZORPAY_KEY_SECRET"),
            api_url: get("RAZORPAY_API_URL")
                .unwrap_or_else(|| "https://api.razorpay.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(parse_or(&get, "GATEWAY_TIMEOUT_SECS", 5)?),
        };

        let auth = AuthConfig {
            jwt_secret,
            bcrypt_cost: parse_or(&get, "BCRYPT_COST", password::DEFAULT_COST)?,
            min_password_length: 6,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 5000)?,
            environment,
            payment_mode,
            frontend_url,
            cors_origins,
            database,
            razorpay,
            auth,
            mail: mail_config(&get)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Sélection du fournisseur d'email.
/// Sans MAIL_PROVIDER: SendGrid si SENDGRID_API_KEY, Mailgun si MAILGUN_API_KEY, sinon Gmail.
fn mail_config<G>(get: &G) -> Result<MailConfig, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let provider = match get("MAIL_PROVIDER") {
        Some(provider) => provider.trim().to_ascii_lowercase(),
        None if get("SENDGRID_API_KEY").is_some() => "sendgrid".to_string(),
        None if get("MAILGUN_API_KEY").is_some() => "mailgun".to_string(),
        None => "gmail".to_string(),
    };

    let email_user = get("EMAIL_USER");

    let transport = match provider.as_str() {
        "sendgrid" => MailTransportConfig::Smtp {
            host: "smtp.sendgrid.net".to_string(),
            port: None,
            username: "apikey".to_string(),
            password: get("SENDGRID_API_KEY").ok_or(ConfigError::Missing("SENDGRID_API_KEY"))?,
        },
        "mailgun" => {
            let username = match (get("MAILGUN_USERNAME"), get("MAILGUN_DOMAIN")) {
                (Some(username), _) => username,
                (None, Some(domain)) => format!("postmaster@{domain}"),
                (None, None) => return Err(ConfigError::Missing("MAILGUN_USERNAME")),
            };
            MailTransportConfig::Smtp {
                host: "smtp.mailgun.org".to_string(),
                port: None,
                username,
                password: get("MAILGUN_API_KEY").ok_or(ConfigError::Missing("MAILGUN_API_KEY"))?,
            }
        }
        "gmail" => MailTransportConfig::Smtp {
            host: "smtp.gmail.com".to_string(),
            port: None,
            username: email_user.clone().unwrap_or_default(),
            password: get("EMAIL_PASS").unwrap_or_default(),
        },
        "smtp" => MailTransportConfig::Smtp {
            host: get("SMTP_HOST").ok_or(ConfigError::Missing("SMTP_HOST"))?,
            port: match get("SMTP_PORT") {
                Some(value) => Some(value.parse().map_err(|_| ConfigError::Invalid {
                    key: "SMTP_PORT",
                    value,
                })?),
                None => None,
            },
            username: get("SMTP_USERNAME").unwrap_or_default(),
            password: get("SMTP_PASSWORD").unwrap_or_default(),
        },
        "file" => MailTransportConfig::File {
            dir: get("MAIL_FILE_DIR").unwrap_or_else(|| "./emails".to_string()),
        },
        _ => {
            return Err(ConfigError::Invalid {
                key: "MAIL_PROVIDER",
                value: provider,
            });
        }
    };

    let from_address = get("MAIL_FROM_ADDRESS")
        .or(email_user)
        .unwrap_or_else(|| "no-reply@localhost".to_string());

    Ok(MailConfig {
        provider,
        transport,
        from_name: get("MAIL_FROM_NAME").unwrap_or_else(|| "MemeCODE Team".to_string()),
        from_address,
        timeout: Duration::from_secs(10),
    })
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
