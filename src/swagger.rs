use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    BillingPeriod, SenderRole, SubscriptionStatus, TicketPriority, TicketStatus,
    TransactionEventType,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::sign_up,
        handlers::auth::sign_in,
        handlers::auth::sign_out,
        handlers::auth::refresh,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::change_password,
        handlers::account::get_profile,
        handlers::account::get_session,
        handlers::account::update_account,
        handlers::plan::get_plans,
        handlers::subscription::create_subscription,
        handlers::subscription::activate_subscription,
        handlers::subscription::cancel_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::get_cart,
        handlers::transaction::get_transactions,
        handlers::ticket::create_ticket,
        handlers::ticket::get_tickets,
        handlers::ticket::get_ticket_stats,
        handlers::ticket::get_ticket,
        handlers::ticket::get_messages,
        handlers::ticket::add_message,
        handlers::ticket::update_priority,
        handlers::ticket::ticket_events,
        handlers::usage::get_usage,
    ),
    components(
        schemas(
            SignUpRequest,
            SignInRequest,
            RefreshRequest,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ResetPasswordRequest,
            ChangePasswordRequest,
            AuthResponse,
            AccountResponse,
            UpdateAccountRequest,
            SessionProfile,
            PlanSummary,
            PlanResponse,
            BillingPeriod,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            SubscriptionStatus,
            CartItemResponse,
            TransactionResponse,
            TransactionEventType,
            CreateTicketRequest,
            CreateTicketResponse,
            AddMessageRequest,
            UpdatePriorityRequest,
            TicketResponse,
            MessageResponse,
            TicketStats,
            TicketStatus,
            TicketPriority,
            SenderRole,
            UsageSummary,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "account", description = "Account and session API"),
        (name = "plans", description = "Plan catalog API"),
        (name = "subscriptions", description = "Subscription lifecycle API"),
        (name = "transactions", description = "Billing history API"),
        (name = "tickets", description = "Support ticket API"),
        (name = "usage", description = "Data usage API"),
    ),
    info(
        title = "Fiberlink Portal API",
        version = "1.0.0",
        description = "Customer portal REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
