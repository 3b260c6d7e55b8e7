/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------------------------------------------------------+
/// | Exports:                                                 |
/// |   - stall_stats_handler                                  |
/// +----------------------------------------------------------+

/// Handler for rating and price snapshots
pub mod stall_stats_handler;

pub use stall_stats_handler::handle_stats_event;
