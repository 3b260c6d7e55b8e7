pub mod events;
pub mod publisher;
pub mod rabbit_broker;

pub use publisher::{BrokerClient, BrokerError, EventPublisher, EventRoutes, PublishError};
pub use rabbit_broker::{DisconnectedBroker, RabbitBroker, RabbitConnection};
