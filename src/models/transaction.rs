use crate::entities::{TransactionEventType, transactions_history};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub amount: f64,
    pub currency: String,
    pub event_type: TransactionEventType,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<transactions_history::Model> for TransactionResponse {
    fn from(tx: transactions_history::Model) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            subscription_id: tx.subscription_id,
            amount: tx.amount,
            currency: tx.currency,
            event_type: tx.event_type,
            description: tx.description,
            status: tx.status,
            created_at: tx.created_at,
        }
    }
}
