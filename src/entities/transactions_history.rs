use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "transaction_event_type"
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionEventType {
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "plan_cancellation")]
    PlanCancellation,
}

impl std::fmt::Display for TransactionEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionEventType::Payment => write!(f, "payment"),
            TransactionEventType::PlanCancellation => write!(f, "plan_cancellation"),
        }
    }
}

// Append-only billing log: rows are inserted once per subscription state
// transition and never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
