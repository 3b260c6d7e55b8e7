//! RabbitMQ-backed [`BrokerClient`] plus the stand-in used when the broker
//! cannot be reached at startup.

use async_trait::async_trait;
use rabbitmq::{
    Message, Publisher, PublisherContext, PublisherDispatcher, RabbitMQ, RabbitMQBuilder,
    RabbitMQError,
};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::publisher::{BrokerClient, BrokerError};

/// Publishes through the background task of a `rabbitmq::Publisher`.
///
/// `send` only enqueues, so it returns as soon as the message is handed to the
/// task; the task applies its own timeout and logs broker-side failures.
#[derive(Clone)]
pub struct RabbitBroker {
    dispatcher: PublisherDispatcher,
}

/// Owns the connection and publisher behind a [`RabbitBroker`].
pub struct RabbitConnection {
    rabbit: RabbitMQ,
    publisher: Publisher,
}

impl RabbitConnection {
    /// Stops the publisher task and closes the connection.
    pub async fn shutdown(self) {
        if let Err(err) = self.publisher.close().await {
            warn!("error while closing publisher: {}", err);
        }
        if let Err(err) = self.rabbit.close().await {
            warn!("error while closing RabbitMQ connection: {}", err);
        }
    }
}

impl RabbitBroker {
    /// Connects to `rabbit_url` and declares the durable topic `exchange`.
    ///
    /// # Errors
    /// Any connection or declaration error from the broker.
    pub async fn connect(
        rabbit_url: &str,
        app_id: &str,
        exchange: &str,
        publish_timeout: Duration,
    ) -> Result<(Self, RabbitConnection), RabbitMQError> {
        let mut rabbit = RabbitMQBuilder::new(rabbit_url, app_id)
            .publish_timeout(publish_timeout)
            .topic_publisher(exchange)
            .build()
            .await?;
        let publisher = rabbit.take_publisher(exchange)?;
        info!("publishing stall statistics to exchange {}", exchange);

        Ok((
            Self {
                dispatcher: publisher.get_dispatcher(),
            },
            RabbitConnection { rabbit, publisher },
        ))
    }
}

#[async_trait]
impl BrokerClient for RabbitBroker {
    async fn send(&self, exchange: &str, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        if exchange != self.dispatcher.exchange() {
            return Err(BrokerError::Rejected(format!(
                "no publisher declared for exchange {}",
                exchange
            )));
        }
        let ctx = PublisherContext::new(&Uuid::new_v4().to_string());
        self.dispatcher
            .publish(Message::new(payload, routing_key), ctx)
            .map_err(|err| BrokerError::Unavailable(err.to_string()))
    }
}

/// Broker client for a service that started without a broker connection.
///
/// Every send fails, so events are logged and dropped while reviews keep being
/// written.
#[derive(Debug, Clone)]
pub struct DisconnectedBroker {
    reason: String,
}

impl DisconnectedBroker {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl BrokerClient for DisconnectedBroker {
    async fn send(&self, _exchange: &str, _routing_key: &str, _payload: Vec<u8>) -> Result<(), BrokerError> {
        Err(BrokerError::Unavailable(self.reason.clone()))
    }
}
