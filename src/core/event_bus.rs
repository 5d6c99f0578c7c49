// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Event bus for pipeline notifications

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use serde::{Serialize, Serializer};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::engine::SimulationResult;

/// Event types in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventType {
    SynthesisReady,
    Complete,
    Failed,
    Discarded,
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: u64,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize)]
pub enum EventPayload {
    /// Partial (synthesis only) or complete result
    #[serde(serialize_with = "serialize_shared")]
    Result(Arc<SimulationResult>),
    Error { message: String },
    Stale { stage: String },
}

fn serialize_shared<S: Serializer>(result: &Arc<SimulationResult>, serializer: S) -> Result<S::Ok, S::Error> {
    result.as_ref().serialize(serializer)
}

/// Central event bus for pub/sub communication
pub struct EventBus {
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish_synthesis_ready(&self, result: Arc<SimulationResult>) {
        let request_id = result.request_id;
        self.publish_event(EventType::SynthesisReady, request_id, EventPayload::Result(result));
    }

    pub fn publish_complete(&self, result: Arc<SimulationResult>) {
        let request_id = result.request_id;
        self.publish_event(EventType::Complete, request_id, EventPayload::Result(result));
    }

    pub fn publish_failed(&self, request_id: Uuid, message: &str) {
        self.publish_event(
            EventType::Failed,
            request_id,
            EventPayload::Error {
                message: message.to_string(),
            },
        );
    }

    pub fn publish_discarded(&self, request_id: Uuid, stage: &str) {
        self.publish_event(
            EventType::Discarded,
            request_id,
            EventPayload::Stale {
                stage: stage.to_string(),
            },
        );
    }

    fn publish_event(&self, event_type: EventType, request_id: Uuid, payload: EventPayload) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            event_type,
            timestamp: Utc::now(),
            request_id,
            payload,
        };
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Events published so far
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_numbered_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe_events();
        let id = Uuid::new_v4();

        bus.publish_failed(id, "boom");
        bus.publish_discarded(id, "spectral");

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(first.event_type, EventType::Failed);
        assert_eq!(second.id, 1);
        assert_eq!(second.event_type, EventType::Discarded);
        assert_eq!(second.request_id, id);
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(0);
        bus.publish_failed(Uuid::new_v4(), "nobody listening");
        assert_eq!(bus.published(), 1);
    }
}
