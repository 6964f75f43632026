use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use futures_util::stream;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::events::ChangeFeed;
use crate::handlers::user_id_from_request;
use crate::models::*;
use crate::services::TicketService;

#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    request_body = CreateTicketRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ticket and first message created", body = CreateTicketResponse),
        (status = 400, description = "Empty subject or message")
    )
)]
pub async fn create_ticket(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    request: web::Json<CreateTicketRequest>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service.create_ticket(user_id, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets",
    tag = "tickets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's tickets, most recently updated first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_tickets(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service.list_tickets(user_id).await {
        Ok(tickets) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tickets
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/stats",
    tag = "tickets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ticket counts by status", body = TicketStats),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_ticket_stats(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service.ticket_stats(user_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ticket details", body = TicketResponse),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn get_ticket(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service.get_ticket(user_id, path.into_inner()).await {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ticket
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tickets/{id}/messages",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Conversation thread, oldest first"),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn get_messages(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service.get_messages(user_id, path.into_inner()).await {
        Ok(messages) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": messages
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/tickets/{id}/messages",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = AddMessageRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Message appended", body = MessageResponse),
        (status = 400, description = "Empty message or closed ticket"),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn add_message(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddMessageRequest>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service
        .add_message(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(message) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": message
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/tickets/{id}/priority",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = UpdatePriorityRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Priority updated", body = TicketResponse),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn update_priority(
    ticket_service: web::Data<TicketService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePriorityRequest>,
) -> Result<HttpResponse> {
    let user_id = match user_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ticket_service
        .update_priority(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(ticket) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ticket
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Restrict the stream to events for one ticket.
    pub ticket_id: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/tickets/events",
    tag = "tickets",
    params(("ticket_id" = Option<i64>, Query, description = "Restrict the stream to one ticket")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Server-sent event stream of ticket changes"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn ticket_events(
    feed: web::Data<ChangeFeed>,
    query: web::Query<EventsQuery>,
) -> HttpResponse {
    let rx = feed.subscribe();
    let filter = query.ticket_id;

    let stream = stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(wanted) = filter {
                        if event.ticket_id() != wanted {
                            continue;
                        }
                    }
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            log::error!("Failed to serialize change event: {e}");
                            continue;
                        }
                    };
                    let chunk = web::Bytes::from(format!("data: {data}\n\n"));
                    return Some((Ok::<_, actix_web::Error>(chunk), rx));
                }
                Err(RecvError::Lagged(missed)) => {
                    // Client fell behind the channel; it should reload its
                    // ticket list after a gap.
                    log::warn!("Event stream lagged, {missed} events dropped");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-cache"))
        .content_type("text/event-stream")
        .streaming(stream)
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tickets")
            .route("", web::post().to(create_ticket))
            .route("", web::get().to(get_tickets))
            .route("/stats", web::get().to(get_ticket_stats))
            .route("/events", web::get().to(ticket_events))
            .route("/{id}", web::get().to(get_ticket))
            .route("/{id}/messages", web::get().to(get_messages))
            .route("/{id}/messages", web::post().to(add_message))
            .route("/{id}/priority", web::put().to(update_priority)),
    );
}
