use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::errors::{AppError, ValidationError};
use crate::models::dto::{CreateOrderRequest, VerifyPaymentRequest};
use crate::models::orders::{self, OrderStatus};
use crate::services::payment_gateway::GatewayOrderRequest;
use crate::state::AppState;
use crate::utils::signature;
use crate::utils::validation::{required, validate_request};

pub const DEFAULT_CURRENCY: &str = "INR";

pub struct OrderService;

/// Commande créée chez Razorpay et enregistrée en base
#[derive(Debug, Clone)]
pub struct IssuedOrder {
    pub order: orders::Model,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    /// created -> completed vient d'être écrit
    Completed(orders::Model),
    /// Déjà completed: rien n'est réécrit
    AlreadyCompleted(orders::Model),
}

impl VerificationOutcome {
    pub fn order(&self) -> &orders::Model {
        match self {
            VerificationOutcome::Completed(order) | VerificationOutcome::AlreadyCompleted(order) => order,
        }
    }
}

impl OrderService {
    /// Crée la commande chez Razorpay puis l'enregistre avec status = created.
    /// Si l'insertion échoue après l'appel Razorpay, la commande Razorpay reste
    /// orpheline et expirera sans être payée.
    pub async fn create_order(
        state: &AppState,
        request: CreateOrderRequest,
    ) -> Result<IssuedOrder, AppError> {
        let amount = request.amount.ok_or(ValidationError::MissingField("Amount"))?;
        validate_request(&request)?;

        let currency = request
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();

        let public_key = state
            .gateway
            .public_key()
            .ok_or_else(|| AppError::service_unavailable("Payment service not configured", "RAZORPAY_KEY_ID is not set"))?
            .to_string();

        let gateway_request = GatewayOrderRequest {
            amount,
            currency,
            receipt: format!("receipt_{}", Utc::now().timestamp_millis()),
        };

        let gateway_order = state
            .gateway
            .create_order(&gateway_request)
            .await
            .map_err(|e| AppError::service_unavailable("Failed to create payment order", e))?;

        tracing::info!(order_id = %gateway_order.id, amount = gateway_order.amount, "Razorpay order created");

        let stored_amount = i32::try_from(gateway_order.amount).map_err(|_| {
            AppError::service_unavailable(
                "Failed to create payment order",
                format!("gateway returned out of range amount {}", gateway_order.amount),
            )
        })?;

        let now = Utc::now().naive_utc();
        let new_order = orders::ActiveModel {
            razorpay_order_id: Set(gateway_order.id.clone()),
            razorpay_payment_id: Set(None),
            razorpay_signature: Set(None),
            amount: Set(stored_amount),
            currency: Set(gateway_order.currency.clone()),
            status: Set(OrderStatus::Created),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        let order = new_order.insert(&state.db).await.map_err(|e| {
            tracing::error!(order_id = %gateway_order.id, "Order created at gateway but not stored: {}", e);
            AppError::from(e)
        })?;

        Ok(IssuedOrder { order, public_key })
    }

    /// Vérifie la signature HMAC renvoyée par le widget puis passe la commande
    /// en completed. Aucune écriture si la signature est fausse.
    pub async fn verify_payment(
        state: &AppState,
        request: VerifyPaymentRequest,
    ) -> Result<VerificationOutcome, AppError> {
        let order_id = required(&request.razorpay_order_id, "razorpay_order_id")?;
        let payment_id = required(&request.razorpay_payment_id, "razorpay_payment_id")?;
        let provided_signature = required(&request.razorpay_signature, "razorpay_signature")?;

        let secret = state.gateway.signing_secret().ok_or_else(|| {
            AppError::service_unavailable("Payment service not configured", "RAZORPAY_KEY_SECRET is not set")
        })?;

        if !signature::verify_payment_signature(secret, order_id, payment_id, provided_signature) {
            tracing::warn!(order_id, "Invalid payment signature");
            return Err(AppError::InvalidSignature);
        }

        let order = orders::Entity::find()
            .filter(orders::Column::RazorpayOrderId.eq(order_id))
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment order not found".to_string()))?;

        let next_status = match order.status.complete() {
            Ok(next) => next,
            Err(transition) => {
                tracing::info!(order_id, "{}", transition);
                return Ok(VerificationOutcome::AlreadyCompleted(order));
            }
        };

        let now = Utc::now().naive_utc();

        // le filtre sur status garde la transition unique si deux vérifications se croisent
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::RazorpayPaymentId, Expr::value(payment_id.to_string()))
            .col_expr(orders::Column::RazorpaySignature, Expr::value(provided_signature.to_string()))
            .col_expr(orders::Column::Status, Expr::value(next_status))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Created))
            .exec(&state.db)
            .await?;

        if result.rows_affected == 0 {
            let current = orders::Entity::find_by_id(order.id)
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Payment order not found".to_string()))?;
            return Ok(VerificationOutcome::AlreadyCompleted(current));
        }

        tracing::info!(order_id, "Payment verified");

        Ok(VerificationOutcome::Completed(orders::Model {
            razorpay_payment_id: Some(payment_id.to_string()),
            razorpay_signature: Some(provided_signature.to_string()),
            status: next_status,
            updated_at: Some(now),
            ..order
        }))
    }
}
