use crate::entities::{SenderRole, TicketPriority, TicketStatus, support_messages, tickets};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    #[schema(example = "Connection drops every evening")]
    pub subject: String,
    /// Defaults to `normal` when omitted.
    pub priority: Option<TicketPriority>,
    pub initial_message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddMessageRequest {
    pub message_text: String,
    #[serde(default)]
    pub attachments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePriorityRequest {
    pub priority: TicketPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub ticket_id: i64,
    pub user_id: Uuid,
    pub subject: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<tickets::Model> for TicketResponse {
    fn from(ticket: tickets::Model) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            user_id: ticket.user_id,
            subject: ticket.subject,
            priority: ticket.priority,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub ticket_id: i64,
    pub sender_id: Uuid,
    pub sender_role: SenderRole,
    pub message_text: String,
    pub attachments: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<support_messages::Model> for MessageResponse {
    fn from(message: support_messages::Model) -> Self {
        Self {
            id: message.id,
            ticket_id: message.ticket_id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            message_text: message.message_text,
            attachments: message.attachments,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTicketResponse {
    pub ticket: TicketResponse,
    pub first_message: MessageResponse,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct TicketStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub closed: u64,
}
