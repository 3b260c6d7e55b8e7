use tracing::{debug, info};

use crate::domain::services::stall_stats::StallStatsCache;
use crate::inbounds::InboundError;
use crate::outbounds::EventRoutes;
use crate::outbounds::events::{PriceChangedEvent, RatingChangedEvent};

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Functions:                                               |
/// |   - handle_stats_event                                   |
/// +----------------------------------------------------------+

/// Decodes a statistics snapshot according to its routing key and applies it
/// to the cache.
///
/// Returns whether the cache changed; `false` means the snapshot was older
/// than the one already held for that stall.
///
/// # Errors
///
/// * `InboundError::UnknownRoutingKey` - If the key matches neither event
/// * `InboundError::Malformed` - If the payload does not decode
pub fn handle_stats_event(
    routing_key: &str,
    payload: &[u8],
    routes: &EventRoutes,
    cache: &StallStatsCache,
) -> Result<bool, InboundError> {
    let malformed = |source| InboundError::Malformed {
        routing_key: routing_key.to_owned(),
        source,
    };

    if routing_key == routes.rating_changed_key {
        let event: RatingChangedEvent = serde_json::from_slice(payload).map_err(malformed)?;
        let applied = cache.apply_rating(&event);
        if applied {
            info!(
                stall_id = event.stall_id,
                average = event.new_average_rating,
                count = event.review_count,
                "rating updated"
            );
        }
        Ok(applied)
    } else if routing_key == routes.price_changed_key {
        let event: PriceChangedEvent = serde_json::from_slice(payload).map_err(malformed)?;
        let applied = cache.apply_price(&event);
        if applied {
            info!(
                stall_id = event.stall_id,
                average = event.new_average_price,
                count = event.price_count,
                "price updated"
            );
        }
        Ok(applied)
    } else {
        debug!(routing_key, "no handler for routing key");
        Err(InboundError::UnknownRoutingKey(routing_key.to_owned()))
    }
}
