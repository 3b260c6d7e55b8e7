pub mod stall;

pub use stall::{PriceChangedEvent, RatingChangedEvent};
