//! # meetin-app
//!
//! Application layer: the scheduling loop and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `CalendarSource`: list the events around a boundary
//!   - `Actuator`: deliver `turn_off` / `turn_on` commands to the light
//!   - `Clock`: read the wall clock
//! - Provide cancellation-aware waits
//! - Run the `SchedulerLoop`: align to half-hour boundaries, poll, select an
//!   event, signal it, hold, repeat until cancelled
//!
//! ## Dependency rule
//! Depends on `meetin-domain` only (plus `tokio` timers and `tokio-util`'s
//! cancellation token). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod ports;
pub mod scheduler;
pub mod wait;
