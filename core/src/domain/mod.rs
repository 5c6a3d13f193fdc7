//! Domain layer containing business entities and temporal value types.

pub mod clock;
pub mod entities;
pub mod time_window;

// Re-export commonly used domain types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::*;
pub use time_window::TimeWindow;
