use crate::entities::{SubscriptionStatus, subscriptions};
use crate::models::PlanResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_auto_renew() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
    #[serde(default = "default_auto_renew")]
    pub auto_renew: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<subscriptions::Model> for SubscriptionResponse {
    fn from(sub: subscriptions::Model) -> Self {
        Self {
            subscription_id: sub.subscription_id,
            user_id: sub.user_id,
            plan_id: sub.plan_id,
            status: sub.status,
            start_date: sub.start_date,
            current_period_end: sub.current_period_end,
            auto_renew: sub.auto_renew,
            created_at: sub.created_at,
        }
    }
}

/// A pending subscription joined with its plan, as shown in the cart.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub subscription: SubscriptionResponse,
    pub plan: Option<PlanResponse>,
}
