use crate::entities::plan_entity as plans;
use crate::error::AppResult;
use crate::models::PlanResponse;
use sea_orm::{DatabaseConnection, EntityTrait, Order, QueryOrder};

#[derive(Clone)]
pub struct PlanService {
    pool: DatabaseConnection,
}

impl PlanService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// The read-only plan catalog, newest first.
    pub async fn list_plans(&self) -> AppResult<Vec<PlanResponse>> {
        let rows = plans::Entity::find()
            .order_by(plans::Column::CreatedAt, Order::Desc)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PlanResponse::from).collect())
    }
}
