use actix_web::{get, web, HttpResponse};

use crate::errors::AppError;
use crate::models::dto::{ProfileResponse, UserDetailsResponse};
use crate::services::account_service::AccountService;
use crate::state::AppState;

/// GET /api/user-details/{order_id} - Compte lié à une commande (PUBLIC)
#[get("/user-details/{order_id}")]
pub async fn user_details(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (account, order) = AccountService::details_by_order(&state, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(UserDetailsResponse {
        payment_id: account.order_id,
        profile: ProfileResponse::from(account),
        razorpay_payment_id: order.razorpay_payment_id,
        amount: order.amount,
    }))
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(user_details);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::SubmitDetailsRequest;
    use crate::test_utils::TestContext;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_user_details_join() {
        let ctx = TestContext::new().await;
        let order = ctx.completed_order(9900).await;
        AccountService::provision(
            &ctx.state,
            SubmitDetailsRequest {
                order_id: Some(order.razorpay_order_id.clone()),
                email: Some("kiran@example.com".to_string()),
                password: Some("secret123".to_string()),
                name: Some("Kiran".to_string()),
                age: Some(19),
                phone_number: Some("9123456780".to_string()),
                gender: Some("male".to_string()),
                college_name: Some("CBIT".to_string()),
                college_address: Some("Gandipet".to_string()),
                current_status: Some("student".to_string()),
                reason: Some("Placements".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .service(web::scope("/api").configure(user_routes)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/user-details/{}", order.razorpay_order_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "kiran@example.com");
        assert_eq!(body["amount"], 9900);
        assert_eq!(body["payment_id"], order.id);
        assert!(body.get("password_hash").is_none());

        let req = test::TestRequest::get().uri("/api/user-details/order_none").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
