use crate::entities::{
    SubscriptionStatus, account_entity as accounts, plan_entity as plans,
    subscription_entity as subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::session::SessionStore;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

/// The only path that reconciles the session store with remote truth. Runs
/// after sign-in, after subscription activation and after cancellation.
#[derive(Clone)]
pub struct ProfileService {
    pool: DatabaseConnection,
    session_store: SessionStore,
}

impl ProfileService {
    pub fn new(pool: DatabaseConnection, session_store: SessionStore) -> Self {
        Self {
            pool,
            session_store,
        }
    }

    /// Fetch the account row and the single active subscription, merge them
    /// into a `SessionProfile` and write it through the session store.
    /// A missing subscription is not an error: the plan defaults to Free.
    pub async fn load_profile(&self, user_id: Uuid) -> AppResult<SessionProfile> {
        let account = accounts::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let active = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .one(&self.pool)
            .await?;

        let plan = match active {
            Some(sub) => {
                let plan_row = plans::Entity::find_by_id(sub.plan_id).one(&self.pool).await?;
                match plan_row {
                    Some(plan) => PlanSummary {
                        id: Some(plan.plan_id),
                        name: plan.name,
                        code: plan.code,
                        status: sub.status.to_string(),
                    },
                    None => {
                        // Catalog row missing for an active subscription;
                        // treat like no subscription rather than failing the
                        // whole profile.
                        log::warn!(
                            "Active subscription {} references unknown plan {}",
                            sub.subscription_id,
                            sub.plan_id
                        );
                        PlanSummary::free()
                    }
                }
            }
            None => PlanSummary::free(),
        };

        let profile = SessionProfile {
            user_id: account.user_id,
            full_name: account.full_name,
            email: account.email,
            phone: account.phone,
            address: account.address,
            city: account.city,
            country: account.country,
            plan,
        };

        self.session_store.set_profile(user_id, profile.clone());
        Ok(profile)
    }

    /// Synchronous read of the cached snapshot; stale until the next reload.
    pub fn session(&self, user_id: Uuid) -> Option<SessionProfile> {
        self.session_store.get(user_id)
    }

    pub fn sign_out(&self, user_id: Uuid) {
        self.session_store.clear_profile(user_id);
    }

    /// Update the account row, then reload through the single writer path.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        request: UpdateAccountRequest,
    ) -> AppResult<SessionProfile> {
        if request.full_name.is_none()
            && request.phone.is_none()
            && request.address.is_none()
            && request.city.is_none()
            && request.country.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        if let Some(full_name) = &request.full_name
            && full_name.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "Full name must not be empty".to_string(),
            ));
        }

        let mut model = accounts::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?
            .into_active_model();

        if let Some(full_name) = request.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(phone) = request.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            model.address = Set(Some(address));
        }
        if let Some(city) = request.city {
            model.city = Set(Some(city));
        }
        if let Some(country) = request.country {
            model.country = Set(Some(country));
        }
        model.updated_at = Set(Some(Utc::now()));
        model.update(&self.pool).await?;

        self.load_profile(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BillingPeriod;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn account(user_id: Uuid) -> accounts::Model {
        accounts::Model {
            user_id,
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            address: None,
            city: None,
            country: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

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

    #[tokio::test]
    async fn test_load_profile_defaults_to_free_plan() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account(user_id)]])
            .append_query_results([Vec::<subscriptions::Model>::new()])
            .into_connection();

        let service = ProfileService::new(db, SessionStore::new(None));
        let profile = service.load_profile(user_id).await.unwrap();

        assert_eq!(profile.plan, PlanSummary::free());
        assert_eq!(profile.email, "jane@example.com");
        // The loader is the single writer into the session store.
        assert_eq!(service.session(user_id).unwrap(), profile);
    }

    #[tokio::test]
    async fn test_load_profile_with_active_subscription() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account(user_id)]])
            .append_query_results([vec![active_subscription(user_id, plan_id)]])
            .append_query_results([vec![plan(plan_id)]])
            .into_connection();

        let service = ProfileService::new(db, SessionStore::new(None));
        let profile = service.load_profile(user_id).await.unwrap();

        assert_eq!(profile.plan.id, Some(plan_id));
        assert_eq!(profile.plan.name, "Fiber 100");
        assert_eq!(profile.plan.code, "FIB100");
        assert_eq!(profile.plan.status, "active");
    }

    #[tokio::test]
    async fn test_load_profile_missing_account_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<accounts::Model>::new()])
            .into_connection();

        let service = ProfileService::new(db, SessionStore::new(None));
        let err = service.load_profile(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
