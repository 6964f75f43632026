use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::user_id_from_request;
use crate::models::UsageSummary;
use crate::services::UsageService;

#[utoipa::path(
    get,
    path = "/usage",
    tag = "usage",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Usage for the active subscription period", body = UsageSummary),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_usage(
    usage_service: web::Data<UsageService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match usage_service.compute_usage(user_id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn usage_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/usage", web::get().to(get_usage));
}
