//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the scheduling core and the outside world.
//! They are defined here (in `app`) so that both the scheduler and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod actuator;
pub mod calendar;
pub mod clock;

pub use actuator::Actuator;
pub use calendar::CalendarSource;
pub use clock::{Clock, SystemClock};
