//! Redis pub/sub publisher: each event is `PUBLISH`ed as JSON on a channel named after its topic.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::{DomainEvent, EventError, EventPublisher};

#[derive(Clone)]
pub struct RedisPublisher {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPublisher").field("connection", &"<ConnectionManager>").finish()
    }
}

impl RedisPublisher {
    pub async fn connect(url: &str) -> Result<Self, EventError> {
        let client = Client::open(url).map_err(|e| EventError::Publish(format!("failed to create Redis client: {e}")))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| EventError::Publish(format!("failed to connect to Redis: {e}")))?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), EventError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.connection.clone();
        let _receivers: i64 = conn
            .publish(topic, payload)
            .await
            .map_err(|e| EventError::Publish(format!("failed to publish to '{topic}': {e}")))?;
        Ok(())
    }
}
