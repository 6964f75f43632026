use crate::entities::{TransactionEventType, transaction_entity as transactions};
use crate::error::AppResult;
use crate::models::TransactionResponse;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct TransactionService {
    pool: DatabaseConnection,
}

impl TransactionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Billing history, newest first.
    pub async fn list_transactions(&self, user_id: Uuid) -> AppResult<Vec<TransactionResponse>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by(transactions::Column::CreatedAt, Order::Desc)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TransactionResponse::from).collect())
    }

    /// Append one billing row. Generic over the connection so the caller can
    /// run it inside the same database transaction as the subscription write.
    pub async fn append<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        subscription_id: Option<Uuid>,
        amount: f64,
        currency: &str,
        event_type: TransactionEventType,
        description: String,
    ) -> AppResult<TransactionResponse> {
        let row = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            subscription_id: Set(subscription_id),
            amount: Set(amount),
            currency: Set(currency.to_string()),
            event_type: Set(event_type),
            description: Set(Some(description)),
            status: Set("completed".to_string()),
            created_at: Set(Some(Utc::now())),
        }
        .insert(db)
        .await?;

        Ok(TransactionResponse::from(row))
    }
}
