//! Passerelle de paiement (Razorpay)
//!
//! Le trait `PaymentGateway` isole l'appel réseau qui crée la commande côté
//! Razorpay; les tests utilisent un faux gateway ou wiremock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RazorpayConfig;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Payment service not configured")]
    NotConfigured,

    #[error("Payment gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Payment gateway returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    /// Montant en plus petite unité (paise)
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Commande créée côté gateway
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Clé publique envoyée au frontend pour ouvrir le widget de paiement
    fn public_key(&self) -> Option<&str>;

    /// Secret utilisé pour vérifier les signatures de paiement
    fn signing_secret(&self) -> Option<&str>;

    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: Option<String>,
    key_secret: Option<String>,
    api_url: String,
}

impl RazorpayGateway {
    pub fn new(config: &RazorpayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn public_key(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    fn signing_secret(&self) -> Option<&str> {
        self.key_secret.as_deref()
    }

    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let (Some(key_id), Some(key_secret)) = (&self.key_id, &self.key_secret) else {
            return Err(GatewayError::NotConfigured);
        };

        tracing::debug!(amount = request.amount, currency = %request.currency, "Creating Razorpay order");

        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_url))
            .basic_auth(key_id, Some(key_secret))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<GatewayOrder>().await?)
    }
}
