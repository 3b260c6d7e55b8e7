//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Best-effort delivery of stall statistics events to the message broker.
//
// | Component     | Description                                                      |
// |---------------|------------------------------------------------------------------|
// | BrokerClient  | Seam to the transport; sends one payload to an exchange/key       |
// | EventRoutes   | Exchange and routing keys the events go to                       |
// | EventPublisher| Serializes, sends under a timeout, logs and drops every failure   |
// | PublishError  | Why an attempt failed; only ever logged                          |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{Instrument, debug, error, info_span};

use super::events::{PriceChangedEvent, RatingChangedEvent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// No connection to the broker.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    #[error("broker rejected the message: {0}")]
    Rejected(String),
}

/// Transport used by [`EventPublisher`].
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn send(&self, exchange: &str, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError>;
}

#[cfg(test)]
use mockall::mock;

#[cfg(test)]
mock! {
    pub BrokerClient {}

    #[async_trait]
    impl BrokerClient for BrokerClient {
        async fn send(&self, exchange: &str, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError>;
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("publish timed out after {0:?}")]
    Timeout(Duration),
}

/// Where stall statistics events are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRoutes {
    pub exchange: String,
    pub rating_changed_key: String,
    pub price_changed_key: String,
}

impl Default for EventRoutes {
    fn default() -> Self {
        Self {
            exchange: "review.exchange".to_owned(),
            rating_changed_key: "review.rating.changed".to_owned(),
            price_changed_key: "review.price.changed".to_owned(),
        }
    }
}

/// Fire-and-forget publisher.
///
/// `publish` never returns an error and never retries: a serialization error,
/// a broker error or a timeout is logged and the event is dropped. A
/// downstream consumer catches up with the next successful snapshot for the
/// same stall.
pub struct EventPublisher {
    client: Arc<dyn BrokerClient>,
    routes: EventRoutes,
    timeout: Duration,
}

impl EventPublisher {
    pub fn new(client: Arc<dyn BrokerClient>, routes: EventRoutes, timeout: Duration) -> Self {
        Self {
            client,
            routes,
            timeout,
        }
    }

    pub fn routes(&self) -> &EventRoutes {
        &self.routes
    }

    /// Attempts one delivery of `event` to `exchange` under `routing_key`.
    pub async fn publish<E: Serialize + Sync>(&self, event: &E, exchange: &str, routing_key: &str) {
        match self.try_publish(event, exchange, routing_key).await {
            Ok(()) => debug!(exchange, routing_key, "event published"),
            Err(err) => error!(exchange, routing_key, error = %err, "event dropped"),
        }
    }

    pub async fn publish_rating_changed(&self, event: &RatingChangedEvent) {
        self.publish(event, &self.routes.exchange, &self.routes.rating_changed_key)
            .instrument(info_span!("rating_changed", stall_id = event.stall_id))
            .await
    }

    pub async fn publish_price_changed(&self, event: &PriceChangedEvent) {
        self.publish(event, &self.routes.exchange, &self.routes.price_changed_key)
            .instrument(info_span!("price_changed", stall_id = event.stall_id))
            .await
    }

    async fn try_publish<E: Serialize + Sync>(
        &self,
        event: &E,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)?;
        tokio::time::timeout(self.timeout, self.client.send(exchange, routing_key, payload))
            .await
            .map_err(|_| PublishError::Timeout(self.timeout))??;
        Ok(())
    }
}
