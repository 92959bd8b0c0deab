use actix_web::{post, web, HttpResponse, ResponseError};

use crate::errors::AppError;
use crate::models::dto::{CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse};
use crate::services::order_service::OrderService;
use crate::state::AppState;

/// POST /api/create-order - Créer une commande Razorpay (PUBLIC)
#[post("/create-order")]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let issued = OrderService::create_order(&state, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        order_id: issued.order.razorpay_order_id,
        amount: i64::from(issued.order.amount),
        currency: issued.order.currency,
        key: issued.public_key,
    }))
}

/// POST /api/verify-payment - Vérifier la signature du paiement (PUBLIC)
/// Les refus gardent le format `{success: false, message}` attendu par le widget.
#[post("/verify-payment")]
pub async fn verify_payment(
    state: web::Data<AppState>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    match OrderService::verify_payment(&state, body.into_inner()).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
            success: true,
            message: "Payment verified successfully".to_string(),
            order_id: outcome.order().razorpay_order_id.clone(),
        })),
        Err(err @ (AppError::InvalidSignature | AppError::NotFound(_) | AppError::Validation(_))) => {
            Ok(HttpResponse::build(err.status_code()).json(serde_json::json!({
                "success": false,
                "message": err.to_string()
            })))
        }
        Err(err) => Err(err),
    }
}

pub fn payment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_order).service(verify_payment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::{self, OrderStatus};
    use crate::test_utils::{TestContext, GATEWAY_SECRET};
    use crate::utils::signature;
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::EntityTrait;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_checkout_flow() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .service(web::scope("/api").configure(payment_routes)),
        )
        .await;

        // 1. Création de la commande
        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .set_json(json!({ "amount": 9900, "currency": "INR" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["amount"], 9900);
        assert_eq!(created["currency"], "INR");
        assert_eq!(created["key"], "rzp_test_key");
        let order_id = created["orderId"].as_str().unwrap().to_string();

        // 2. Signature forgée: refus, aucune écriture
        let forged = signature::payment_signature("not-the-secret", &order_id, "pay_42");
        let req = test::TestRequest::post()
            .uri("/api/verify-payment")
            .set_json(json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_42",
                "razorpay_signature": forged
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid signature");

        // 3. Bonne signature: commande completed
        let sig = signature::payment_signature(GATEWAY_SECRET, &order_id, "pay_42");
        let req = test::TestRequest::post()
            .uri("/api/verify-payment")
            .set_json(json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_42",
                "razorpay_signature": sig
            }))
            .to_request();
        let verified: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(verified["success"], true);
        assert_eq!(verified["orderId"], order_id.as_str());

        let stored = orders::Entity::find().all(&ctx.state.db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, OrderStatus::Completed);
    }

    #[actix_web::test]
    async fn test_unknown_order_and_missing_amount() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .service(web::scope("/api").configure(payment_routes)),
        )
        .await;

        let sig = signature::payment_signature(GATEWAY_SECRET, "order_ghost", "pay_1");
        let req = test::TestRequest::post()
            .uri("/api/verify-payment")
            .set_json(json!({
                "external_order_id": "order_ghost",
                "external_payment_id": "pay_1",
                "signature": sig
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Payment order not found");

        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .set_json(json!({ "currency": "INR" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Amount is required");
    }
}
