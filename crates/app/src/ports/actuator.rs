//! Actuator port: the light being driven.

use std::future::Future;

use meetin_domain::error::MeetinError;
use meetin_domain::service::ActuatorCommand;

/// Something that performs a state change when handed a command.
///
/// Commands are issued strictly in sequence; the scheduler awaits each one
/// before sending the next and does not wait for any further confirmation.
pub trait Actuator: Send + Sync {
    /// Deliver a command (`command.action()` plus `command.payload()`).
    fn invoke(
        &self,
        command: &ActuatorCommand,
    ) -> impl Future<Output = Result<(), MeetinError>> + Send;
}

impl<T: Actuator> Actuator for &T {
    fn invoke(
        &self,
        command: &ActuatorCommand,
    ) -> impl Future<Output = Result<(), MeetinError>> + Send {
        (**self).invoke(command)
    }
}
