use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

use crate::handlers::user_id_from_request;
use crate::models::*;
use crate::services::{ProfileService, SubscriptionService};

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending subscription created", body = SubscriptionResponse),
        (status = 400, description = "Plan not available"),
        (status = 404, description = "Plan not found"),
        (status = 409, description = "A pending subscription already exists")
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .create_subscription(user_id, request.into_inner())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/{id}/activate",
    tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription activated, payment recorded"),
        (status = 400, description = "Subscription is not pending"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn activate_subscription(
    subscription_service: web::Data<SubscriptionService>,
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .activate_subscription(user_id, path.into_inner())
        .await
    {
        Ok((subscription, transaction)) => {
            // Reload the cached profile so the session reflects the new plan.
            if let Err(e) = profile_service.load_profile(user_id).await {
                log::warn!("Profile reload after activation failed: {e}");
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": {
                    "subscription": subscription,
                    "transaction": transaction
                }
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscriptions/cancel",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active subscription canceled"),
        (status = 409, description = "Zero or multiple active subscriptions")
    )
)]
pub async fn cancel_subscription(
    subscription_service: web::Data<SubscriptionService>,
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.cancel_subscription(user_id).await {
        Ok((subscription, transaction)) => {
            if let Err(e) = profile_service.load_profile(user_id).await {
                log::warn!("Profile reload after cancellation failed: {e}");
            }
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": {
                    "subscription": subscription,
                    "transaction": transaction
                }
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending subscription removed"),
        (status = 400, description = "Subscription is not pending"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn delete_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service
        .delete_subscription(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Subscription removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/cart",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending subscriptions with their plans"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_cart(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.pending_subscriptions(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("/cart", web::get().to(get_cart))
            .route("/cancel", web::post().to(cancel_subscription))
            .route("/{id}/activate", web::post().to(activate_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
