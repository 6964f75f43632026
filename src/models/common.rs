use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error half of the response envelope, `{success: false, error: {...}}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
