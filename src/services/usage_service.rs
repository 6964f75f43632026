use crate::entities::{
    SubscriptionStatus, plan_entity as plans, subscription_entity as subscriptions,
    user_usage_entity as user_usage,
};
use crate::error::AppResult;
use crate::models::{UsageSummary, bytes_to_gb};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

#[derive(Clone)]
pub struct UsageService {
    pool: DatabaseConnection,
}

impl UsageService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Sum metered usage for the active subscription period. Pure read
    /// aggregation, recomputed on every call. A user without an active
    /// subscription gets a zeroed summary.
    pub async fn compute_usage(&self, user_id: Uuid) -> AppResult<UsageSummary> {
        let active = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .one(&self.pool)
            .await?;

        let Some(subscription) = active else {
            return Ok(UsageSummary::empty());
        };

        let plan = plans::Entity::find_by_id(subscription.plan_id)
            .one(&self.pool)
            .await?;

        let rows = user_usage::Entity::find()
            .filter(user_usage::Column::UserId.eq(user_id))
            .filter(user_usage::Column::SubscriptionId.eq(subscription.subscription_id))
            .all(&self.pool)
            .await?;

        let bytes_up: i64 = rows.iter().map(|u| u.bytes_up).sum();
        let bytes_down: i64 = rows.iter().map(|u| u.bytes_down).sum();
        let total_bytes_used = bytes_up + bytes_down;
        let gb_used = bytes_to_gb(total_bytes_used);
        let gb_total = plan.as_ref().and_then(|p| p.data_cap_gb);

        Ok(UsageSummary {
            bytes_up,
            bytes_down,
            total_bytes_used,
            gb_used,
            gb_total,
            percent_used: UsageSummary::percent_of_cap(gb_used, gb_total),
            subscription_id: Some(subscription.subscription_id),
            plan_name: plan.map(|p| p.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BillingPeriod;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn plan(plan_id: Uuid, data_cap_gb: Option<i32>) -> plans::Model {
        plans::Model {
            plan_id,
            name: "Fiber 100".to_string(),
            code: "FIB100".to_string(),
            price_amount: 29.99,
            price_currency: "USD".to_string(),
            billing_period: BillingPeriod::Monthly,
            download_mbps: 100,
            upload_mbps: 20,
            data_cap_gb,
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    fn active_subscription(user_id: Uuid, plan_id: Uuid) -> subscriptions::Model {
        subscriptions::Model {
            subscription_id: Uuid::new_v4(),
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            start_date: Some(Utc::now()),
            current_period_end: None,
            auto_renew: true,
            created_at: Some(Utc::now()),
        }
    }

    fn usage_row(user_id: Uuid, subscription_id: Uuid, up: i64, down: i64) -> user_usage::Model {
        user_usage::Model {
            id: 1,
            user_id,
            subscription_id,
            bytes_up: up,
            bytes_down: down,
            recorded_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_usage_sums_rows_against_plan_cap() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let sub = active_subscription(user_id, plan_id);
        let sub_id = sub.subscription_id;

        let gb = 1i64 << 30;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sub]])
            .append_query_results([vec![plan(plan_id, Some(100))]])
            .append_query_results([vec![
                usage_row(user_id, sub_id, 10 * gb, 30 * gb),
                usage_row(user_id, sub_id, 2 * gb, 8 * gb),
            ]])
            .into_connection();

        let service = UsageService::new(db);
        let summary = service.compute_usage(user_id).await.unwrap();

        assert_eq!(summary.bytes_up, 12 * gb);
        assert_eq!(summary.bytes_down, 38 * gb);
        assert_eq!(summary.gb_used, 50.0);
        assert_eq!(summary.gb_total, Some(100));
        assert_eq!(summary.percent_used, Some(50.0));
        assert_eq!(summary.subscription_id, Some(sub_id));
    }

    #[tokio::test]
    async fn test_usage_is_idempotent_without_new_rows() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let sub = active_subscription(user_id, plan_id);
        let sub_id = sub.subscription_id;
        let rows = vec![usage_row(user_id, sub_id, 123, 456)];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sub.clone()]])
            .append_query_results([vec![plan(plan_id, None)]])
            .append_query_results([rows.clone()])
            .append_query_results([vec![sub]])
            .append_query_results([vec![plan(plan_id, None)]])
            .append_query_results([rows])
            .into_connection();

        let service = UsageService::new(db);
        let first = service.compute_usage(user_id).await.unwrap();
        let second = service.compute_usage(user_id).await.unwrap();

        assert_eq!(first.gb_used, second.gb_used);
        assert_eq!(first.total_bytes_used, 579);
        // Unlimited plan: no cap, no percentage.
        assert_eq!(first.gb_total, None);
        assert_eq!(first.percent_used, None);
    }

    #[tokio::test]
    async fn test_usage_without_active_subscription_is_zeroed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .into_connection();

        let service = UsageService::new(db);
        let summary = service.compute_usage(Uuid::new_v4()).await.unwrap();

        assert_eq!(summary.total_bytes_used, 0);
        assert_eq!(summary.subscription_id, None);
    }
}
