use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Plan pointer held by the session profile. `id` is `None` for the synthetic
/// Free default, which is not a catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlanSummary {
    pub id: Option<Uuid>,
    pub name: String,
    pub code: String,
    pub status: String,
}

impl PlanSummary {
    pub fn free() -> Self {
        Self {
            id: None,
            name: "Free".to_string(),
            code: "Free".to_string(),
            status: "inactive".to_string(),
        }
    }
}

/// The merged account + plan snapshot the portal reads everywhere. Rebuilt by
/// the profile loader whenever account or subscription state changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub plan: PlanSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_plan_defaults() {
        let plan = PlanSummary::free();
        assert_eq!(plan.id, None);
        assert_eq!(plan.name, "Free");
        assert_eq!(plan.code, "Free");
        assert_eq!(plan.status, "inactive");
    }
}
