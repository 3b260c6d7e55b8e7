/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------------------------------------------------------+
/// | Exports:                                                 |
/// |   - inbound_error                                        |
/// |   - handlers                                             |
/// +----------------------------------------------------------+

/// Error types for messages arriving from the broker.
pub mod inbound_error;

/// Handlers for inbound broker messages.
pub mod handlers;

pub use inbound_error::InboundError;
