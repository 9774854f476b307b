// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Element Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// Background saga work (compensations, directory notifications) reports its
// outcome here so that it is never silently dropped.
//
// In-memory only: events are lost on restart.

use crate::domain::element::ElementId;
use crate::domain::events::ElementEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to element events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<ElementEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish an element event to all subscribers
    pub fn publish_element_event(&self, event: ElementEvent) {
        debug!("Publishing event: {:?}", event);

        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all element events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to the events of a single element
    pub fn subscribe_element(&self, element_id: ElementId) -> ElementEventReceiver {
        ElementEventReceiver {
            receiver: self.sender.subscribe(),
            element_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all element events
pub struct EventReceiver {
    receiver: broadcast::Receiver<ElementEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<ElementEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<ElementEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver filtered on one element id
pub struct ElementEventReceiver {
    receiver: broadcast::Receiver<ElementEvent>,
    element_id: ElementId,
}

impl ElementEventReceiver {
    pub async fn recv(&mut self) -> Result<ElementEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(map_recv_error)?;
            if event.element_id() == Some(self.element_id) {
                return Ok(event);
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deleted(element_id: ElementId) -> ElementEvent {
        ElementEvent::ElementDeleted {
            element_id,
            user: "u1".to_string(),
            deleted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let element_id = ElementId::new();
        event_bus.publish_element_event(deleted(element_id));

        match receiver.recv().await.unwrap() {
            ElementEvent::ElementDeleted { element_id: id, .. } => assert_eq!(id, element_id),
            other => panic!("Wrong event type received: {:?}", other),
        }
        assert!(matches!(receiver.try_recv(), Err(EventBusError::Empty)));
    }

    #[tokio::test]
    async fn test_element_event_filtering() {
        let event_bus = EventBus::new(10);
        let element_id = ElementId::new();
        let mut receiver = event_bus.subscribe_element(element_id);

        event_bus.publish_element_event(deleted(ElementId::new()));
        event_bus.publish_element_event(ElementEvent::BulkDeletionCompleted {
            requested: 2,
            failed: 0,
            directory_cleaned: true,
            completed_at: Utc::now(),
        });
        event_bus.publish_element_event(deleted(element_id));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.element_id(), Some(element_id));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish_element_event(deleted(ElementId::new()));

        let _ = receiver1.recv().await.unwrap();
        let _ = receiver2.recv().await.unwrap();
    }
}
