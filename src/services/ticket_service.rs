use crate::entities::{
    SenderRole, TicketStatus, support_message_entity as support_messages,
    ticket_entity as tickets,
};
use crate::error::{AppError, AppResult};
use crate::events::{ChangeEvent, ChangeFeed, ChangePayload};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet,
    Order, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct TicketService {
    pool: DatabaseConnection,
    feed: ChangeFeed,
}

impl TicketService {
    pub fn new(pool: DatabaseConnection, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }

    async fn find_owned_ticket(&self, user_id: Uuid, ticket_id: i64) -> AppResult<tickets::Model> {
        tickets::Entity::find_by_id(ticket_id)
            .one(&self.pool)
            .await?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))
    }

    /// Ticket and first message are written in one database transaction, the
    /// atomicity the portal relies on.
    pub async fn create_ticket(
        &self,
        user_id: Uuid,
        request: CreateTicketRequest,
    ) -> AppResult<CreateTicketResponse> {
        if request.subject.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Subject must not be empty".to_string(),
            ));
        }
        if request.initial_message.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Initial message must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let ticket = tickets::ActiveModel {
            ticket_id: NotSet,
            user_id: Set(user_id),
            subject: Set(request.subject),
            priority: Set(request.priority.unwrap_or(crate::entities::TicketPriority::Normal)),
            status: Set(TicketStatus::Open),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let message = support_messages::ActiveModel {
            id: NotSet,
            ticket_id: Set(ticket.ticket_id),
            sender_id: Set(user_id),
            sender_role: Set(SenderRole::Customer),
            message_text: Set(request.initial_message),
            attachments: Set(None),
            created_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let response = CreateTicketResponse {
            ticket: TicketResponse::from(ticket),
            first_message: MessageResponse::from(message),
        };

        log::info!(
            "Ticket {} created for user {user_id}",
            response.ticket.ticket_id
        );
        self.feed.publish(ChangeEvent::now(ChangePayload::TicketCreated {
            ticket: response.ticket.clone(),
        }));

        Ok(response)
    }

    /// Most-recently-updated first.
    pub async fn list_tickets(&self, user_id: Uuid) -> AppResult<Vec<TicketResponse>> {
        let rows = tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .order_by(tickets::Column::UpdatedAt, Order::Desc)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TicketResponse::from).collect())
    }

    pub async fn get_ticket(&self, user_id: Uuid, ticket_id: i64) -> AppResult<TicketResponse> {
        let ticket = self.find_owned_ticket(user_id, ticket_id).await?;
        Ok(TicketResponse::from(ticket))
    }

    pub async fn get_messages(
        &self,
        user_id: Uuid,
        ticket_id: i64,
    ) -> AppResult<Vec<MessageResponse>> {
        self.find_owned_ticket(user_id, ticket_id).await?;

        let rows = support_messages::Entity::find()
            .filter(support_messages::Column::TicketId.eq(ticket_id))
            .order_by(support_messages::Column::CreatedAt, Order::Asc)
            .all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MessageResponse::from).collect())
    }

    /// Append a customer message. Rejected once the ticket is closed; the
    /// status is re-checked here because the storage layer does not enforce
    /// the policy.
    pub async fn add_message(
        &self,
        user_id: Uuid,
        ticket_id: i64,
        request: AddMessageRequest,
    ) -> AppResult<MessageResponse> {
        if request.message_text.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Message must not be empty".to_string(),
            ));
        }

        let ticket = self.find_owned_ticket(user_id, ticket_id).await?;
        if ticket.status == TicketStatus::Closed {
            return Err(AppError::ValidationError(
                "Cannot reply to a closed ticket".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let message = support_messages::ActiveModel {
            id: NotSet,
            ticket_id: Set(ticket_id),
            sender_id: Set(user_id),
            sender_role: Set(SenderRole::Customer),
            message_text: Set(request.message_text),
            attachments: Set(request.attachments),
            created_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let mut model = ticket.into_active_model();
        model.updated_at = Set(Some(now));
        let updated = model.update(&txn).await?;

        txn.commit().await?;

        let response = MessageResponse::from(message);
        self.feed.publish(ChangeEvent::now(ChangePayload::MessageAdded {
            message: response.clone(),
        }));
        self.feed.publish(ChangeEvent::now(ChangePayload::TicketUpdated {
            ticket: TicketResponse::from(updated),
        }));

        Ok(response)
    }

    pub async fn ticket_stats(&self, user_id: Uuid) -> AppResult<TicketStats> {
        let rows = tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await?;

        let mut stats = TicketStats {
            total: rows.len() as u64,
            ..TicketStats::default()
        };
        for ticket in rows {
            match ticket.status {
                TicketStatus::Open => stats.open += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Closed => stats.closed += 1,
            }
        }

        Ok(stats)
    }

    pub async fn update_priority(
        &self,
        user_id: Uuid,
        ticket_id: i64,
        request: UpdatePriorityRequest,
    ) -> AppResult<TicketResponse> {
        let ticket = self.find_owned_ticket(user_id, ticket_id).await?;

        let mut model = ticket.into_active_model();
        model.priority = Set(request.priority);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&self.pool).await?;

        let response = TicketResponse::from(updated);
        self.feed.publish(ChangeEvent::now(ChangePayload::TicketUpdated {
            ticket: response.clone(),
        }));

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TicketPriority;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn ticket(user_id: Uuid, ticket_id: i64, status: TicketStatus) -> tickets::Model {
        tickets::Model {
            ticket_id,
            user_id,
            subject: "Help".to_string(),
            priority: TicketPriority::High,
            status,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn message(ticket_id: i64, sender_id: Uuid) -> support_messages::Model {
        support_messages::Model {
            id: 1,
            ticket_id,
            sender_id,
            sender_role: SenderRole::Customer,
            message_text: "X".to_string(),
            attachments: None,
            created_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_create_ticket_opens_with_first_message() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ticket(user_id, 1, TicketStatus::Open)]])
            .append_query_results([vec![message(1, user_id)]])
            .into_connection();

        let service = TicketService::new(db, ChangeFeed::default());
        let mut rx = service.feed.subscribe();

        let created = service
            .create_ticket(
                user_id,
                CreateTicketRequest {
                    subject: "Help".to_string(),
                    priority: Some(TicketPriority::High),
                    initial_message: "X".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.ticket.status, TicketStatus::Open);
        assert_eq!(created.first_message.ticket_id, created.ticket.ticket_id);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.ticket_id(), created.ticket.ticket_id);
    }

    #[tokio::test]
    async fn test_add_message_rejected_when_closed() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ticket(user_id, 1, TicketStatus::Closed)]])
            .into_connection();

        let service = TicketService::new(db, ChangeFeed::default());
        let err = service
            .add_message(
                user_id,
                1,
                AddMessageRequest {
                    message_text: "hello?".to_string(),
                    attachments: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_ticket_not_visible_to_other_users() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ticket(owner, 1, TicketStatus::Open)]])
            .into_connection();

        let service = TicketService::new(db, ChangeFeed::default());
        let err = service.get_ticket(Uuid::new_v4(), 1).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ticket_stats_counts_by_status() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                ticket(user_id, 1, TicketStatus::Open),
                ticket(user_id, 2, TicketStatus::Open),
                ticket(user_id, 3, TicketStatus::Closed),
            ]])
            .into_connection();

        let service = TicketService::new(db, ChangeFeed::default());
        let stats = service.ticket_stats(user_id).await.unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.closed, 1);
    }
}
