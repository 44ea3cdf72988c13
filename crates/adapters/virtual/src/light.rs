//! Virtual light: responds to `turn_on` and `turn_off`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use meetin_app::ports::Actuator;
use meetin_domain::error::MeetinError;
use meetin_domain::selection::Signal;
use meetin_domain::service::{ActuatorCommand, Service};

/// Errors raised by the virtual light.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The command addresses another entity.
    #[error("unknown entity {0:?}")]
    UnknownEntity(String),
}

impl From<VirtualError> for MeetinError {
    fn from(err: VirtualError) -> Self {
        MeetinError::actuator(err)
    }
}

/// What the light currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightState {
    pub on: bool,
    pub brightness: Option<u8>,
    pub effect: Option<Signal>,
}

#[derive(Debug, Default)]
struct Inner {
    state: LightState,
    history: Vec<ActuatorCommand>,
}

/// A simulated light driven by actuator commands.
#[derive(Debug)]
pub struct VirtualLight {
    entity_id: String,
    inner: Mutex<Inner>,
}

impl Default for VirtualLight {
    fn default() -> Self {
        Self::new("light.virtual_light")
    }
}

impl VirtualLight {
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LightState {
        self.lock().state
    }

    /// Every command applied so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ActuatorCommand> {
        self.lock().history.clone()
    }

    /// Apply a command, returning the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownEntity`] if the command targets another
    /// entity.
    pub fn apply(&self, command: &ActuatorCommand) -> Result<LightState, VirtualError> {
        if command.entity_id != self.entity_id {
            return Err(VirtualError::UnknownEntity(command.entity_id.clone()));
        }
        let mut inner = self.lock();
        inner.state = match command.service {
            Service::TurnOn => LightState {
                on: true,
                brightness: command.brightness.or(inner.state.brightness),
                effect: command.effect,
            },
            Service::TurnOff => LightState {
                on: false,
                ..inner.state
            },
        };
        inner.history.push(command.clone());
        tracing::info!(entity_id = %self.entity_id, %command, on = inner.state.on, "virtual light");
        Ok(inner.state)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuator for VirtualLight {
    async fn invoke(&self, command: &ActuatorCommand) -> Result<(), MeetinError> {
        self.apply(command)?;
        Ok(())
    }
}
