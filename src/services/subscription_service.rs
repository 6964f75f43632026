use crate::config::SubscriptionConfig;
use crate::entities::{
    BillingPeriod, SubscriptionStatus, TransactionEventType, plan_entity as plans,
    subscription_entity as subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::TransactionService;
use chrono::{DateTime, Months, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

/// End of the billing period that starts at `start`.
pub fn period_end(start: DateTime<Utc>, period: &BillingPeriod) -> DateTime<Utc> {
    let months = match period {
        BillingPeriod::Monthly => 1,
        BillingPeriod::Annual => 12,
    };
    start.checked_add_months(Months::new(months)).unwrap_or(start)
}

/// Subscription lifecycle: (none) -> pending -> active -> canceled, with
/// pending -> (none) via delete. Every billing-state transition appends
/// exactly one transactions_history row, in the same database transaction
/// as the status write.
#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    transaction_service: TransactionService,
    policy: SubscriptionConfig,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection, policy: SubscriptionConfig) -> Self {
        let transaction_service = TransactionService::new(pool.clone());
        Self {
            pool,
            transaction_service,
            policy,
        }
    }

    /// Put a plan in the cart: insert a `pending` subscription row. Writes no
    /// transaction row; billing starts at activation.
    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        request: CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionResponse> {
        let plan = plans::Entity::find_by_id(request.plan_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        if !plan.is_active {
            return Err(AppError::ValidationError(
                "Plan is not available for subscription".to_string(),
            ));
        }

        if !self.policy.allow_multiple_pending {
            let existing = subscriptions::Entity::find()
                .filter(subscriptions::Column::UserId.eq(user_id))
                .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Pending))
                .one(&self.pool)
                .await?;

            if existing.is_some() {
                return Err(AppError::Conflict(
                    "A pending subscription already exists".to_string(),
                ));
            }
        }

        let subscription = subscriptions::ActiveModel {
            subscription_id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            plan_id: Set(plan.plan_id),
            status: Set(SubscriptionStatus::Pending),
            start_date: Set(None),
            current_period_end: Set(None),
            auto_renew: Set(request.auto_renew),
            created_at: Set(Some(Utc::now())),
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Pending subscription {} created for user {user_id} on plan {}",
            subscription.subscription_id,
            plan.plan_id
        );
        Ok(SubscriptionResponse::from(subscription))
    }

    /// Checkout: pending -> active, plus one `payment` transaction for the
    /// plan price. Both writes share one database transaction.
    pub async fn activate_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> AppResult<(SubscriptionResponse, TransactionResponse)> {
        let txn = self.pool.begin().await?;

        let subscription = subscriptions::Entity::find_by_id(subscription_id)
            .one(&txn)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        if subscription.status != SubscriptionStatus::Pending {
            return Err(AppError::ValidationError(
                "Only a pending subscription can be activated".to_string(),
            ));
        }

        let plan = plans::Entity::find_by_id(subscription.plan_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let now = Utc::now();
        let mut model = subscription.into_active_model();
        model.status = Set(SubscriptionStatus::Active);
        model.start_date = Set(Some(now));
        model.current_period_end = Set(Some(period_end(now, &plan.billing_period)));
        let updated = model.update(&txn).await?;

        let transaction = self
            .transaction_service
            .append(
                &txn,
                user_id,
                Some(updated.subscription_id),
                plan.price_amount,
                &plan.price_currency,
                TransactionEventType::Payment,
                format!("Payment for plan {}", plan.name),
            )
            .await?;

        txn.commit().await?;

        log::info!(
            "Subscription {} activated for user {user_id} ({} {})",
            updated.subscription_id,
            plan.price_amount,
            plan.price_currency
        );
        Ok((SubscriptionResponse::from(updated), transaction))
    }

    /// Cancel the single active subscription, appending a $0 cancellation
    /// row. Zero or more than one active row is an ambiguous state.
    pub async fn cancel_subscription(
        &self,
        user_id: Uuid,
    ) -> AppResult<(SubscriptionResponse, TransactionResponse)> {
        let txn = self.pool.begin().await?;

        let mut active = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .all(&txn)
            .await?;

        let subscription = match active.len() {
            1 => active.remove(0),
            0 => {
                return Err(AppError::AmbiguousState(
                    "No active subscription to cancel".to_string(),
                ));
            }
            n => {
                return Err(AppError::AmbiguousState(format!(
                    "Expected one active subscription, found {n}"
                )));
            }
        };

        let plan = plans::Entity::find_by_id(subscription.plan_id)
            .one(&txn)
            .await?;
        let (plan_name, currency) = match &plan {
            Some(plan) => (plan.name.clone(), plan.price_currency.clone()),
            None => ("unknown".to_string(), "USD".to_string()),
        };

        let mut model = subscription.into_active_model();
        model.status = Set(SubscriptionStatus::Canceled);
        model.auto_renew = Set(false);
        let updated = model.update(&txn).await?;

        let transaction = self
            .transaction_service
            .append(
                &txn,
                user_id,
                Some(updated.subscription_id),
                0.0,
                &currency,
                TransactionEventType::PlanCancellation,
                format!("Cancellation of plan {plan_name}"),
            )
            .await?;

        txn.commit().await?;

        log::info!(
            "Subscription {} canceled for user {user_id}",
            updated.subscription_id
        );
        Ok((SubscriptionResponse::from(updated), transaction))
    }

    /// Empty the cart: remove a subscription that was never activated. Valid
    /// only while pending; leaves no transaction row behind.
    pub async fn delete_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> AppResult<()> {
        let subscription = subscriptions::Entity::find_by_id(subscription_id)
            .one(&self.pool)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;

        if subscription.status != SubscriptionStatus::Pending {
            return Err(AppError::ValidationError(
                "Only a pending subscription can be deleted".to_string(),
            ));
        }

        subscription.delete(&self.pool).await?;
        Ok(())
    }

    /// Cart contents: pending subscriptions joined with their plans.
    pub async fn pending_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<CartItemResponse>> {
        let pending = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Pending))
            .all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(pending.len());
        for subscription in pending {
            let plan = plans::Entity::find_by_id(subscription.plan_id)
                .one(&self.pool)
                .await?;
            items.push(CartItemResponse {
                subscription: SubscriptionResponse::from(subscription),
                plan: plan.map(PlanResponse::from),
            });
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn plan(plan_id: Uuid) -> plans::Model {
        plans::Model {
            plan_id,
            name: "Fiber 100".to_string(),
            code: "FIB100".to_string(),
            price_amount: 29.99,
            price_currency: "USD".to_string(),
            billing_period: BillingPeriod::Monthly,
            download_mbps: 100,
            upload_mbps: 20,
            data_cap_gb: Some(500),
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    fn subscription(
        user_id: Uuid,
        plan_id: Uuid,
        status: SubscriptionStatus,
    ) -> subscriptions::Model {
        subscriptions::Model {
            subscription_id: Uuid::new_v4(),
            user_id,
            plan_id,
            status,
            start_date: None,
            current_period_end: None,
            auto_renew: true,
            created_at: Some(Utc::now()),
        }
    }

    fn payment_row(
        user_id: Uuid,
        subscription_id: Uuid,
        amount: f64,
        event_type: TransactionEventType,
    ) -> crate::entities::transactions_history::Model {
        crate::entities::transactions_history::Model {
            id: Uuid::new_v4(),
            user_id,
            subscription_id: Some(subscription_id),
            amount,
            currency: "USD".to_string(),
            event_type,
            description: None,
            status: "completed".to_string(),
            created_at: Some(Utc::now()),
        }
    }

    fn singleton_policy() -> SubscriptionConfig {
        SubscriptionConfig {
            allow_multiple_pending: false,
        }
    }

    fn cart_policy() -> SubscriptionConfig {
        SubscriptionConfig {
            allow_multiple_pending: true,
        }
    }

    #[test]
    fn test_period_end() {
        let start = DateTime::parse_from_rfc3339("2025-01-15T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let monthly = period_end(start, &BillingPeriod::Monthly);
        assert_eq!(monthly.to_rfc3339(), "2025-02-15T00:00:00+00:00");

        let annual = period_end(start, &BillingPeriod::Annual);
        assert_eq!(annual.to_rfc3339(), "2026-01-15T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_create_subscription_is_pending() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .append_query_results([vec![subscription(
                user_id,
                plan_id,
                SubscriptionStatus::Pending,
            )]])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let created = service
            .create_subscription(
                user_id,
                CreateSubscriptionRequest {
                    plan_id,
                    auto_renew: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_pending_is_conflict_under_singleton_policy() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([vec![subscription(
                user_id,
                plan_id,
                SubscriptionStatus::Pending,
            )]])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let err = service
            .create_subscription(
                user_id,
                CreateSubscriptionRequest {
                    plan_id,
                    auto_renew: true,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cart_policy_allows_second_pending() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        // No duplicate-guard query under the cart policy: plan lookup then
        // insert, twice.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([vec![subscription(
                user_id,
                plan_id,
                SubscriptionStatus::Pending,
            )]])
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([vec![subscription(
                user_id,
                plan_id,
                SubscriptionStatus::Pending,
            )]])
            .into_connection();

        let service = SubscriptionService::new(db, cart_policy());
        let request = || CreateSubscriptionRequest {
            plan_id,
            auto_renew: true,
        };

        let first = service.create_subscription(user_id, request()).await.unwrap();
        let second = service.create_subscription(user_id, request()).await.unwrap();

        assert_eq!(first.status, SubscriptionStatus::Pending);
        assert_eq!(second.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn test_activate_appends_payment_transaction() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let pending = subscription(user_id, plan_id, SubscriptionStatus::Pending);
        let subscription_id = pending.subscription_id;
        let mut activated = pending.clone();
        activated.status = SubscriptionStatus::Active;
        activated.start_date = Some(Utc::now());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending]])
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([vec![activated]])
            .append_query_results([vec![payment_row(
                user_id,
                subscription_id,
                29.99,
                TransactionEventType::Payment,
            )]])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let (subscription, transaction) = service
            .activate_subscription(user_id, subscription_id)
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(transaction.event_type, TransactionEventType::Payment);
        assert_eq!(transaction.amount, 29.99);
    }

    #[tokio::test]
    async fn test_activate_rejects_non_pending() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let active = subscription(user_id, plan_id, SubscriptionStatus::Active);
        let subscription_id = active.subscription_id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active]])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let err = service
            .activate_subscription(user_id, subscription_id)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_cancel_appends_zero_amount_transaction() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let active = subscription(user_id, plan_id, SubscriptionStatus::Active);
        let subscription_id = active.subscription_id;
        let mut canceled = active.clone();
        canceled.status = SubscriptionStatus::Canceled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active]])
            .append_query_results([vec![plan(plan_id)]])
            .append_query_results([vec![canceled]])
            .append_query_results([vec![payment_row(
                user_id,
                subscription_id,
                0.0,
                TransactionEventType::PlanCancellation,
            )]])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let (subscription, transaction) = service.cancel_subscription(user_id).await.unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Canceled);
        assert_eq!(transaction.event_type, TransactionEventType::PlanCancellation);
        assert_eq!(transaction.amount, 0.0);
    }

    #[tokio::test]
    async fn test_cancel_without_active_subscription_is_ambiguous() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());
        let err = service.cancel_subscription(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::AmbiguousState(_)));
    }

    #[tokio::test]
    async fn test_delete_is_restricted_to_pending() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let pending = subscription(user_id, plan_id, SubscriptionStatus::Pending);
        let active = subscription(user_id, plan_id, SubscriptionStatus::Active);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![active.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let service = SubscriptionService::new(db, singleton_policy());

        service
            .delete_subscription(user_id, pending.subscription_id)
            .await
            .unwrap();

        let err = service
            .delete_subscription(user_id, active.subscription_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
