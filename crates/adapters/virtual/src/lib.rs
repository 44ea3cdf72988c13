//! # meetin-adapter-virtual
//!
//! In-memory stand-ins for the outside world, used by `meetind --dry-run`
//! and by tests.
//!
//! | Component | Port | Behaviour |
//! |-----------|------|-----------|
//! | [`VirtualLight`] | `Actuator` | Tracks on/off, brightness and effect, keeps the command history |
//! | [`ScriptedCalendar`] | `CalendarSource` | Returns fixed events overlapping the queried window, records queries |
//!
//! ## Dependency rule
//!
//! Depends on `meetin-app` (port traits) and `meetin-domain` only.

mod calendar;
mod light;

pub use calendar::{Query, ScriptedCalendar};
pub use light::{LightState, VirtualError, VirtualLight};
