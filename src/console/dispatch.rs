//! Turning operator input into instrument commands.

use crate::command::Command;
use crate::error::{AppResult, ConsoleError, SetpointKind};

/// Parses setpoint text as typed by the operator.
///
/// Surrounding whitespace is ignored. Anything that is not a finite number, including `nan`
/// and `inf`, is rejected.
pub fn parse_setpoint(kind: SetpointKind, text: &str) -> AppResult<f64> {
    let invalid = || ConsoleError::InvalidInput {
        field: kind,
        text: text.to_string(),
    };
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}

/// The single command that applies a setpoint.
pub fn setpoint_command(kind: SetpointKind, value: f64) -> Command {
    match kind {
        SetpointKind::Voltage => Command::set_voltage(value),
        SetpointKind::Current => Command::set_current(value),
    }
}
