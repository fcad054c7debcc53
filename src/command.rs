//! Instrument command vocabulary.
//!
//! The console speaks a fixed set of four commands. Each request to the backend carries
//! exactly one `{kind, value}` pair, so a [`Command`] is itself the single-entry request.
use serde::{Deserialize, Serialize};

/// The command keys understood by the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    /// Switch the output on or off.
    Enable,
    /// Voltage setpoint in volts.
    SetVoltage,
    /// Current limit in amps.
    SetCurrent,
    /// Hardware reset.
    Reset,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandKind::Enable => "ENABLE",
            CommandKind::SetVoltage => "SET_VOLTAGE",
            CommandKind::SetCurrent => "SET_CURRENT",
            CommandKind::Reset => "RESET",
        };
        f.write_str(name)
    }
}

/// Typed command payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    /// Boolean payload, used by `ENABLE`.
    Flag(bool),
    /// Numeric payload.
    Number(f64),
}

/// One command request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Which setting to change.
    pub kind: CommandKind,
    /// The new value.
    pub value: CommandValue,
}

impl Command {
    /// Output on/off.
    pub fn enable(on: bool) -> Self {
        Self {
            kind: CommandKind::Enable,
            value: CommandValue::Flag(on),
        }
    }

    /// Voltage setpoint.
    pub fn set_voltage(volts: f64) -> Self {
        Self {
            kind: CommandKind::SetVoltage,
            value: CommandValue::Number(volts),
        }
    }

    /// Current limit.
    pub fn set_current(amps: f64) -> Self {
        Self {
            kind: CommandKind::SetCurrent,
            value: CommandValue::Number(amps),
        }
    }

    /// Hardware reset; the payload is always zero.
    pub fn reset() -> Self {
        Self {
            kind: CommandKind::Reset,
            value: CommandValue::Number(0.0),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            CommandValue::Flag(b) => write!(f, "{}={}", self.kind, b),
            CommandValue::Number(v) => write!(f, "{}={}", self.kind, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_single_entry_request() {
        let json = serde_json::to_string(&Command::set_voltage(3.7)).unwrap();
        assert_eq!(json, r#"{"kind":"SET_VOLTAGE","value":3.7}"#);

        let json = serde_json::to_string(&Command::enable(false)).unwrap();
        assert_eq!(json, r#"{"kind":"ENABLE","value":false}"#);
    }

    #[test]
    fn reset_payload_is_zero() {
        assert_eq!(Command::reset().value, CommandValue::Number(0.0));
        assert_eq!(Command::reset().to_string(), "RESET=0");
    }
}
