use crate::error::AppError;
use actix_web::{HttpMessage, HttpRequest};
use uuid::Uuid;

pub mod account;
pub mod auth;
pub mod plan;
pub mod subscription;
pub mod ticket;
pub mod transaction;
pub mod usage;

pub use account::account_config;
pub use auth::auth_config;
pub use plan::plan_config;
pub use subscription::subscription_config;
pub use ticket::ticket_config;
pub use transaction::transaction_config;
pub use usage::usage_config;

/// User id inserted by the auth middleware.
pub(crate) fn user_id_from_request(req: &HttpRequest) -> Result<Uuid, AppError> {
    req.extensions()
        .get::<Uuid>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}
