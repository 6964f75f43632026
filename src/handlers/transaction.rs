use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::user_id_from_request;
use crate::services::TransactionService;

#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Billing history, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_transactions(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match transaction_service.list_transactions(user_id).await {
        Ok(transactions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": transactions
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn transaction_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/transactions", web::get().to(get_transactions));
}
