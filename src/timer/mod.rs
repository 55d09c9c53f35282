pub mod timer_handlers;
pub mod timer_registry;
pub mod timer_tracker;

pub use timer_handlers::TimerSnapshot;
pub use timer_registry::TimerRegistry;
pub use timer_tracker::{format_elapsed, TimerStatus, TimerTracker, TimerUpdate};
