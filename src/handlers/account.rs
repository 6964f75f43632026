use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::user_id_from_request;
use crate::models::*;
use crate::services::ProfileService;

#[utoipa::path(
    get,
    path = "/account/profile",
    tag = "account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile reloaded from storage", body = SessionProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.load_profile(user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/account/session",
    tag = "account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cached session snapshot (may be stale)", body = SessionProfile),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_session(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    // Serve the cached snapshot; fall back to a reload on a cold cache.
    if let Some(profile) = profile_service.session(user_id) {
        return Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        })));
    }

    match profile_service.load_profile(user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/account",
    tag = "account",
    request_body = UpdateAccountRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account updated", body = SessionProfile),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_account(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
    request: web::Json<UpdateAccountRequest>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.update_account(user_id, request.into_inner()).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn account_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/account")
            .route("/profile", web::get().to(get_profile))
            .route("/session", web::get().to(get_session))
            .route("", web::put().to(update_account)),
    );
}
