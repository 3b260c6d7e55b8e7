use thiserror::Error;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Enums:                                                   |
/// |   - InboundError                                         |
/// +----------------------------------------------------------+

/// Errors raised while handling a message taken from a queue.
#[derive(Debug, Error)]
pub enum InboundError {
    /// The payload is not a valid event for its routing key.
    #[error("Malformed payload for {routing_key}: {source}")]
    Malformed {
        routing_key: String,
        #[source]
        source: serde_json::Error,
    },

    /// No handler is registered for the routing key.
    #[error("Unexpected routing key: {0}")]
    UnknownRoutingKey(String),
}
