use crate::entities::{BillingPeriod, plans};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub plan_id: Uuid,
    pub name: String,
    pub code: String,
    pub price_amount: f64,
    pub price_currency: String,
    pub billing_period: BillingPeriod,
    pub download_mbps: i32,
    pub upload_mbps: i32,
    /// `None` means unlimited.
    pub data_cap_gb: Option<i32>,
    pub is_active: bool,
}

impl From<plans::Model> for PlanResponse {
    fn from(plan: plans::Model) -> Self {
        Self {
            plan_id: plan.plan_id,
            name: plan.name,
            code: plan.code,
            price_amount: plan.price_amount,
            price_currency: plan.price_currency,
            billing_period: plan.billing_period,
            download_mbps: plan.download_mbps,
            upload_mbps: plan.upload_mbps,
            data_cap_gb: plan.data_cap_gb,
            is_active: plan.is_active,
        }
    }
}
