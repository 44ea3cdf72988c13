//! # meetin-domain
//!
//! Pure domain model for the meetin meeting light.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Align wall-clock time to fixed polling boundaries ([`time`])
//! - Define **calendar events** and filter out cancelled/all-day ones ([`calendar`])
//! - Select the event that drives the light and bucket it into a signal ([`selection`])
//! - Define the **services** sent to the light (`turn_off`, `turn_on`) ([`service`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod calendar;
pub mod selection;
pub mod service;
