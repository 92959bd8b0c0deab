//! Outils partagés par les tests: base SQLite en mémoire, faux gateway Razorpay,
//! mailer qui enregistre les envois.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::config::AppConfig;
use crate::db;
use crate::models::orders::{self, OrderStatus};
use crate::services::mailer::{MailError, Mailer};
use crate::services::payment_gateway::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway};
use crate::services::rate_limiter::InMemoryRateLimiter;
use crate::state::AppState;

pub const GATEWAY_KEY: &str = "rzp_test_key";
pub const GATEWAY_SECRET: &str = "rzp_test_secret";
pub const JWT_SECRET: &str = "test-jwt-secret";

static ORDER_SEQ: AtomicUsize = AtomicUsize::new(1);

fn next_order_id() -> String {
    format!("order_test_{}", ORDER_SEQ.fetch_add(1, Ordering::SeqCst))
}

pub fn test_config(vars: &[(&str, &str)]) -> AppConfig {
    let mut map: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ("JWT_SECRET".to_string(), JWT_SECRET.to_string()),
        ("BCRYPT_COST".to_string(), "4".to_string()),
        ("PAYMENT_MODE".to_string(), "strict".to_string()),
        ("FRONTEND_URL".to_string(), "http://localhost:3000".to_string()),
    ]);
    for (key, value) in vars {
        map.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_lookup(|key| map.get(key).cloned()).expect("valid test config")
}

pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite in memory");
    db::sync_schema(&db).await.expect("schema");
    db
}

/// Faux gateway: renvoie des ids `order_test_N` et garde la dernière requête
pub struct FakeGateway {
    fail: bool,
    last_request: Mutex<Option<GatewayOrderRequest>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            fail: false,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            last_request: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<GatewayOrderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn public_key(&self) -> Option<&str> {
        Some(GATEWAY_KEY)
    }

    fn signing_secret(&self) -> Option<&str> {
        Some(GATEWAY_SECRET)
    }

    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        *self.last_request.lock().unwrap() = Some(request.clone());

        if self.fail {
            return Err(GatewayError::Api {
                status: 503,
                body: "gateway down".to_string(),
            });
        }

        Ok(GatewayOrder {
            id: next_order_id(),
            amount: request.amount,
            currency: request.currency.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub name: Option<String>,
    pub link: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_link: &str,
    ) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Io(std::io::Error::other("smtp down")));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to_email.to_string(),
            name: to_name.map(str::to_string),
            link: reset_link.to_string(),
        });
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
    pub mailer: Arc<RecordingMailer>,
    pub rate_limiter: Arc<InMemoryRateLimiter>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::build(test_config(&[]), FakeGateway::new(), RecordingMailer::default()).await
    }

    pub async fn with_config(vars: &[(&str, &str)]) -> Self {
        Self::build(test_config(vars), FakeGateway::new(), RecordingMailer::default()).await
    }

    pub async fn with_gateway(gateway: FakeGateway) -> Self {
        Self::build(test_config(&[]), gateway, RecordingMailer::default()).await
    }

    pub async fn with_mailer(mailer: RecordingMailer, vars: &[(&str, &str)]) -> Self {
        Self::build(test_config(vars), FakeGateway::new(), mailer).await
    }

    pub async fn build(config: AppConfig, gateway: FakeGateway, mailer: RecordingMailer) -> Self {
        let gateway = Arc::new(gateway);
        let mailer = Arc::new(mailer);
        let rate_limiter = Arc::new(InMemoryRateLimiter::new());

        let state = AppState {
            db: test_db().await,
            config: Arc::new(config),
            gateway: gateway.clone(),
            mailer: mailer.clone(),
            rate_limiter: rate_limiter.clone(),
        };

        Self {
            state,
            gateway,
            mailer,
            rate_limiter,
        }
    }

    async fn insert_order(&self, amount: i32, status: OrderStatus) -> orders::Model {
        let now = Utc::now().naive_utc();
        orders::ActiveModel {
            razorpay_order_id: Set(next_order_id()),
            razorpay_payment_id: Set(None),
            razorpay_signature: Set(None),
            amount: Set(amount),
            currency: Set("INR".to_string()),
            status: Set(status),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("insert order")
    }

    pub async fn created_order(&self, amount: i32) -> orders::Model {
        self.insert_order(amount, OrderStatus::Created).await
    }

    pub async fn completed_order(&self, amount: i32) -> orders::Model {
        self.insert_order(amount, OrderStatus::Completed).await
    }
}
