//! Envoi des emails (reset password) via lettre.
//!
//! SendGrid, Mailgun et Gmail passent tous par SMTP; le transport `file`
//! écrit les messages sur disque pour le développement.

use std::path::Path;

use async_trait::async_trait;
use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};

use crate::config::{MailConfig, MailTransportConfig};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("file transport error: {0}")]
    File(#[from] lettre::transport::file::Error),

    #[error("failed to prepare mail directory: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_link: &str,
    ) -> Result<(), MailError>;
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

pub struct SmtpMailer {
    transport: Transport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let transport = match &config.transport {
            MailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .timeout(Some(config.timeout));
                if let Some(port) = port {
                    builder = builder.port(*port);
                }
                Transport::Smtp(builder.build())
            }
            MailTransportConfig::File { dir } => {
                let dir = Path::new(dir);
                if !dir.exists() {
                    std::fs::create_dir_all(dir)?;
                }
                Transport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };

        let from = Mailbox::new(Some(config.from_name.clone()), config.from_address.parse()?);

        Ok(Self { transport, from })
    }

    /// Vérifie la connexion SMTP au démarrage (no-op pour le transport fichier)
    pub async fn test_connection(&self) -> Result<bool, MailError> {
        match &self.transport {
            Transport::Smtp(smtp) => Ok(smtp.test_connection().await?),
            Transport::File(_) => Ok(true),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_link: &str,
    ) -> Result<(), MailError> {
        let to = Mailbox::new(to_name.map(str::to_string), to_email.parse()?);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Reset Your MemeCODE Account Password")
            .multipart(MultiPart::alternative_plain_html(
                password_reset_text(to_name, reset_link),
                password_reset_html(to_email, to_name, reset_link),
            ))?;

        match &self.transport {
            Transport::Smtp(smtp) => {
                smtp.send(message).await?;
            }
            Transport::File(file) => {
                file.send(message).await?;
            }
        }

        tracing::info!("Password reset email sent");
        Ok(())
    }
}

fn greeting(to_name: Option<&str>) -> String {
    match to_name {
        Some(name) if !name.is_empty() => format!("Hello {name}!"),
        _ => "Hello!".to_string(),
    }
}

pub fn password_reset_text(to_name: Option<&str>, reset_link: &str) -> String {
    let greeting = greeting(to_name);
    format!(
        "Password Reset Request - MemeCODE

{greeting}

We received a request to reset your password for your MemeCODE account.

To reset your password, visit this link:
{reset_link}

This link will expire in 1 hour for security reasons.

If you didn't request this reset, please ignore this email.

Best regards,
The MemeCODE Team
"
    )
}

pub fn password_reset_html(to_email: &str, to_name: Option<&str>, reset_link: &str) -> String {
    let greeting = greeting(to_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .button {{ display: inline-block; background: #3b82f6; color: white; padding: 15px 30px; text-decoration: none; border-radius: 8px; font-weight: bold; }}
        .warning {{ background: #fef3cd; border: 1px solid #ffd60a; padding: 15px; border-radius: 8px; margin: 20px 0; }}
        .footer {{ text-align: center; margin-top: 30px; color: #666; font-size: 14px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Password Reset Request</h1>
        <h2>{greeting}</h2>

        <p>We received a request to reset your password for your MemeCODE account. If you didn't make this request, you can safely ignore this email.</p>

        <p style="text-align: center;"><a href="{reset_link}" class="button">Reset My Password</a></p>

        <p>Or copy and paste this link into your browser:</p>
        <p style="word-break: break-all; font-family: monospace;">{reset_link}</p>

        <div class="warning">
            <strong>Important:</strong>
            <ul>
                <li>This link will expire in 1 hour for security reasons</li>
                <li>If you didn't request this reset, please ignore this email</li>
            </ul>
        </div>

        <div class="footer">
            <p>This email was sent to {to_email}</p>
        </div>
    </div>
</body>
</html>"#
    )
}
