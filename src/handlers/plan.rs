use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::services::PlanService;

#[utoipa::path(
    get,
    path = "/plans",
    tag = "plans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan catalog"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_plans(plan_service: web::Data<PlanService>) -> Result<HttpResponse> {
    match plan_service.list_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn plan_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/plans", web::get().to(get_plans));
}
