//! Service: a command sent to the light, e.g. `light.turn_on`.
//!
//! The scheduler only ever issues two services, so they are modelled as a
//! closed enum with a JSON payload built from typed fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::selection::Signal;

/// Service name understood by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    TurnOff,
    TurnOn,
}

impl Service {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnOff => "turn_off",
            Self::TurnOn => "turn_on",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call to the actuator: a service plus its target and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub service: Service,
    /// Fully qualified entity, e.g. `light.meetin_ring`.
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Signal>,
}

impl ActuatorCommand {
    /// Switch the light off.
    #[must_use]
    pub fn turn_off(entity_id: impl Into<String>) -> Self {
        Self {
            service: Service::TurnOff,
            entity_id: entity_id.into(),
            brightness: None,
            effect: None,
        }
    }

    /// Switch the light on with the effect announcing a meeting.
    #[must_use]
    pub fn turn_on(entity_id: impl Into<String>, brightness: u8, effect: Signal) -> Self {
        Self {
            service: Service::TurnOn,
            entity_id: entity_id.into(),
            brightness: Some(brightness),
            effect: Some(effect),
        }
    }

    /// Service name, e.g. `"turn_on"`.
    #[must_use]
    pub fn action(&self) -> &'static str {
        self.service.as_str()
    }

    /// Key/value parameters sent along with the service name.
    #[must_use]
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("entity_id".to_string(), Value::from(self.entity_id.as_str()));
        if let Some(brightness) = self.brightness {
            payload.insert("brightness".to_string(), Value::from(brightness));
        }
        if let Some(effect) = self.effect {
            payload.insert("effect".to_string(), Value::from(effect.as_str()));
        }
        payload
    }
}

impl std::fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.effect {
            Some(effect) => write!(f, "{}({}, effect={effect})", self.service, self.entity_id),
            None => write!(f, "{}({})", self.service, self.entity_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_turn_off_payload_with_entity_only() {
        let cmd = ActuatorCommand::turn_off("light.meetin_ring");
        assert_eq!(cmd.action(), "turn_off");
        assert_eq!(
            Value::Object(cmd.payload()),
            serde_json::json!({"entity_id": "light.meetin_ring"})
        );
    }

    #[test]
    fn should_build_turn_on_payload_with_effect() {
        let cmd = ActuatorCommand::turn_on("light.meetin_ring", 128, Signal::Hour);
        assert_eq!(cmd.action(), "turn_on");
        assert_eq!(
            Value::Object(cmd.payload()),
            serde_json::json!({
                "entity_id": "light.meetin_ring",
                "brightness": 128,
                "effect": "60m",
            })
        );
    }

    #[test]
    fn should_display_command() {
        let on = ActuatorCommand::turn_on("light.x", 10, Signal::HalfHour);
        assert_eq!(on.to_string(), "turn_on(light.x, effect=30m)");
        assert_eq!(ActuatorCommand::turn_off("light.x").to_string(), "turn_off(light.x)");
    }

    #[test]
    fn should_serialize_service_in_snake_case() {
        assert_eq!(serde_json::to_string(&Service::TurnOff).unwrap(), "\"turn_off\"");
    }
}
