//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MeetinError`]
//! when a failure crosses a port boundary. Collaborator failures are boxed so
//! the domain never names adapter error types.

use chrono::TimeDelta;

/// Boxed error produced by an external collaborator (calendar, actuator).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error surfaced by the scheduling core.
#[derive(Debug, thiserror::Error)]
pub enum MeetinError {
    /// Computing a wait target failed.
    #[error("time alignment error")]
    Alignment(#[from] AlignmentError),

    /// The calendar source failed to answer a query.
    #[error("calendar source error")]
    Calendar(#[source] BoxError),

    /// The actuator rejected or failed to deliver a command.
    #[error("actuator error")]
    Actuator(#[source] BoxError),
}

impl MeetinError {
    /// Wrap a calendar source failure.
    pub fn calendar(err: impl Into<BoxError>) -> Self {
        Self::Calendar(err.into())
    }

    /// Wrap an actuator failure.
    pub fn actuator(err: impl Into<BoxError>) -> Self {
        Self::Actuator(err.into())
    }
}

/// Errors raised while aligning a timestamp to a polling period.
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    /// The period is zero or negative.
    #[error("alignment period must be positive, got {0}")]
    NonPositivePeriod(TimeDelta),

    /// chrono could not truncate the timestamp to the period.
    #[error("failed to truncate timestamp to the alignment period")]
    Rounding(#[from] chrono::RoundingError),

    /// Advancing to the next boundary overflowed the representable range.
    #[error("next boundary is out of the representable range")]
    OutOfRange,
}
