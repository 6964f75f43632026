use crate::models::{MessageResponse, TicketResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Row-change notification published by the ticket service and streamed to
/// clients over SSE.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: ChangePayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangePayload {
    TicketCreated { ticket: TicketResponse },
    TicketUpdated { ticket: TicketResponse },
    MessageAdded { message: MessageResponse },
}

impl ChangeEvent {
    pub fn now(payload: ChangePayload) -> Self {
        Self {
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn ticket_id(&self) -> i64 {
        match &self.payload {
            ChangePayload::TicketCreated { ticket } | ChangePayload::TicketUpdated { ticket } => {
                ticket.ticket_id
            }
            ChangePayload::MessageAdded { message } => message.ticket_id,
        }
    }
}

/// In-process change feed. Subscribers that lag past the channel capacity
/// miss events and should reload the list they mirror.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChangeEvent) {
        // Send only fails when nobody is subscribed, which is not an error.
        if let Err(e) = self.sender.send(event) {
            log::debug!("Change event dropped, no subscribers: {e}");
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Insert an event into a buffer ordered by `occurred_at`, so consumers see
/// timestamp order even when feed delivery is out of sequence. Events with
/// equal timestamps keep arrival order.
pub fn merge_ordered(buffer: &mut Vec<ChangeEvent>, event: ChangeEvent) {
    let idx = buffer.partition_point(|e| e.occurred_at <= event.occurred_at);
    buffer.insert(idx, event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{TicketPriority, TicketStatus};
    use chrono::Duration;
    use uuid::Uuid;

    fn ticket_event(ticket_id: i64, occurred_at: DateTime<Utc>) -> ChangeEvent {
        ChangeEvent {
            occurred_at,
            payload: ChangePayload::TicketUpdated {
                ticket: TicketResponse {
                    ticket_id,
                    user_id: Uuid::new_v4(),
                    subject: "subject".to_string(),
                    priority: TicketPriority::Normal,
                    status: TicketStatus::Open,
                    created_at: Some(occurred_at),
                    updated_at: Some(occurred_at),
                },
            },
        }
    }

    #[test]
    fn test_merge_ordered_reorders_late_arrivals() {
        let base = Utc::now();
        let mut buffer = Vec::new();

        merge_ordered(&mut buffer, ticket_event(1, base));
        merge_ordered(&mut buffer, ticket_event(3, base + Duration::seconds(2)));
        // Arrives after the event above but happened before it.
        merge_ordered(&mut buffer, ticket_event(2, base + Duration::seconds(1)));

        let ids: Vec<i64> = buffer.iter().map(|e| e.ticket_id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_ordered_keeps_arrival_order_for_ties() {
        let base = Utc::now();
        let mut buffer = Vec::new();

        merge_ordered(&mut buffer, ticket_event(1, base));
        merge_ordered(&mut buffer, ticket_event(2, base));

        let ids: Vec<i64> = buffer.iter().map(|e| e.ticket_id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_feed_delivers_to_subscribers() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();

        feed.publish(ticket_event(7, Utc::now()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.ticket_id(), 7);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let feed = ChangeFeed::new(8);
        feed.publish(ticket_event(1, Utc::now()));
    }
}
