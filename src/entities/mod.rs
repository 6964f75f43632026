pub mod accounts;
pub mod plans;
pub mod subscriptions;
pub mod support_messages;
pub mod tickets;
pub mod transactions_history;
pub mod user_usage;

pub use accounts as account_entity;
pub use plans as plan_entity;
pub use subscriptions as subscription_entity;
pub use support_messages as support_message_entity;
pub use tickets as ticket_entity;
pub use transactions_history as transaction_entity;
pub use user_usage as user_usage_entity;

pub use plans::BillingPeriod;
pub use subscriptions::SubscriptionStatus;
pub use support_messages::SenderRole;
pub use tickets::{TicketPriority, TicketStatus};
pub use transactions_history::TransactionEventType;
