//! Domain events emitted after content writes.
//!
//! Events are published fire-and-forget: failures are logged and counted, never returned.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use common::metrics::EVENTS_PUBLISHED_TOTAL;

pub mod redis;

pub use self::redis::RedisPublisher;

pub const TOPIC_ARTICLES: &str = "portfolio.articles";
pub const TOPIC_PROJECTS: &str = "portfolio.projects";

pub const ARTICLE_CREATED: &str = "article.created";
pub const ARTICLE_UPDATED: &str = "article.updated";
pub const ARTICLE_DELETED: &str = "article.deleted";
pub const PROJECT_CREATED: &str = "project.created";
pub const PROJECT_UPDATED: &str = "project.updated";
pub const PROJECT_DELETED: &str = "project.deleted";

pub const EVENT_VERSION: &str = "1.0";
pub const DEFAULT_SOURCE: &str = "backend";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("publisher error: {0}")]
    Publish(String),
    #[error("event serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Payload of `*.deleted` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRef {
    pub id: Uuid,
}

/// Envelope shared by every published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub version: String,
    pub data: serde_json::Value,
}

impl DomainEvent {
    pub fn new(event_type: &str, source: &str, data: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            timestamp: Utc::now(),
            source: source.to_string(),
            version: EVENT_VERSION.to_string(),
            data,
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), EventError>;
}

/// Publisher used when events are disabled.
#[derive(Debug, Default, Clone)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), EventError> {
        debug!(topic, event_type = %event.event_type, "event_dropped_noop");
        Ok(())
    }
}

/// Keeps every published event in memory; used by tests.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, DomainEvent)>>,
}

impl RecordingPublisher {
    /// `(topic, event)` pairs in publish order.
    pub fn events(&self) -> Vec<(String, DomainEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events().into_iter().map(|(_, e)| e.event_type).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|_| EventError::Publish("lock poisoned".into()))?
            .push((topic.to_string(), event.clone()));
        Ok(())
    }
}

/// Wraps a publisher with the envelope source and failure logging.
#[derive(Clone)]
pub struct EventBus {
    publisher: Arc<dyn EventPublisher>,
    source: String,
}

impl EventBus {
    pub fn new(publisher: Arc<dyn EventPublisher>, source: impl Into<String>) -> Self {
        Self { publisher, source: source.into() }
    }

    pub fn noop() -> Self { Self::new(Arc::new(NoopPublisher), DEFAULT_SOURCE) }

    pub async fn emit<T: Serialize>(&self, topic: &str, event_type: &str, data: &T) {
        let data = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                warn!(event_type, error = %e, "event_encode_failed");
                EVENTS_PUBLISHED_TOTAL.with_label_values(&[event_type, "error"]).inc();
                return;
            }
        };
        let event = DomainEvent::new(event_type, &self.source, data);
        match self.publisher.publish(topic, &event).await {
            Ok(()) => {
                EVENTS_PUBLISHED_TOTAL.with_label_values(&[event_type, "ok"]).inc();
                debug!(topic, event_type, event_id = %event.event_id, "event_published");
            }
            Err(e) => {
                EVENTS_PUBLISHED_TOTAL.with_label_values(&[event_type, "error"]).inc();
                warn!(topic, event_type, error = %e, "event_publish_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _: &str, _: &DomainEvent) -> Result<(), EventError> {
            Err(EventError::Publish("broker down".into()))
        }
    }

    #[tokio::test]
    async fn envelope_fields_are_filled() {
        let rec = Arc::new(RecordingPublisher::default());
        let bus = EventBus::new(rec.clone(), DEFAULT_SOURCE);
        bus.emit(TOPIC_ARTICLES, ARTICLE_DELETED, &json!({"id": "x"})).await;
        let events = rec.events();
        assert_eq!(events.len(), 1);
        let (topic, ev) = &events[0];
        assert_eq!(topic, "portfolio.articles");
        assert_eq!(ev.event_type, "article.deleted");
        assert_eq!(ev.source, "backend");
        assert_eq!(ev.version, "1.0");
        assert_eq!(ev.data, json!({"id": "x"}));
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let bus = EventBus::new(Arc::new(FailingPublisher), DEFAULT_SOURCE);
        bus.emit(TOPIC_PROJECTS, PROJECT_CREATED, &json!({})).await;
    }

    #[test]
    fn envelope_serializes_with_expected_keys() {
        let ev = DomainEvent::new(PROJECT_UPDATED, "backend", json!({"id": 1}));
        let v = serde_json::to_value(&ev).unwrap();
        for key in ["event_id", "event_type", "timestamp", "source", "version", "data"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }
}
