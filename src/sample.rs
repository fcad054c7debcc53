//! Instrument samples.
//!
//! A [`Sample`] is one timestamped reading of the supply: the measured output, the
//! setpoints the instrument is currently regulating to, and whether the output is on.
//! `time` is the elapsed time since the start of the test, so the first sample of a
//! session sits close to zero.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single reading captured from the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Elapsed time since the start of the test.
    pub time: Duration,
    /// Measured output voltage in volts.
    pub voltage: f64,
    /// Measured output current in amperes.
    pub current: f64,
    /// Voltage setpoint in volts.
    pub set_voltage: f64,
    /// Current limit setpoint in amperes.
    pub set_current: f64,
    /// Output enabled.
    pub is_on: bool,
}

impl Sample {
    /// Elapsed time in seconds, the x coordinate used for plotting.
    pub fn seconds(&self) -> f64 {
        self.time.as_secs_f64()
    }

    /// Reads one named field.
    pub fn field(&self, field: SampleField) -> FieldValue {
        match field {
            SampleField::Time => FieldValue::Time(self.time),
            SampleField::Voltage => FieldValue::Number(self.voltage),
            SampleField::Current => FieldValue::Number(self.current),
            SampleField::SetVoltage => FieldValue::Number(self.set_voltage),
            SampleField::SetCurrent => FieldValue::Number(self.set_current),
            SampleField::IsOn => FieldValue::Flag(self.is_on),
        }
    }
}

/// Field names addressable through `SampleStore::lastval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleField {
    /// Seconds since the session started.
    Time,
    /// Measured voltage.
    Voltage,
    /// Measured current.
    Current,
    /// Voltage setpoint.
    SetVoltage,
    /// Current limit.
    SetCurrent,
    /// Output state.
    IsOn,
}

impl SampleField {
    /// All fields, in export column order.
    pub const ALL: [SampleField; 6] = [
        SampleField::Time,
        SampleField::Voltage,
        SampleField::Current,
        SampleField::SetVoltage,
        SampleField::SetCurrent,
        SampleField::IsOn,
    ];

    /// Column name used in exports.
    pub fn name(&self) -> &'static str {
        match self {
            SampleField::Time => "time",
            SampleField::Voltage => "voltage",
            SampleField::Current => "current",
            SampleField::SetVoltage => "set_voltage",
            SampleField::SetCurrent => "set_current",
            SampleField::IsOn => "is_on",
        }
    }
}

impl std::str::FromStr for SampleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("Unknown sample field '{}'", s))
    }
}

/// A typed field value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    /// Elapsed time.
    Time(Duration),
    /// Measurement or setpoint.
    Number(f64),
    /// Output state.
    Flag(bool),
}

impl FieldValue {
    /// Numeric view of the value; flags map to 0/1 and times to seconds.
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Time(t) => t.as_secs_f64(),
            FieldValue::Number(v) => *v,
            FieldValue::Flag(b) => f64::from(u8::from(*b)),
        }
    }

    /// Boolean view of the value; numbers are true when non-zero.
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Time(t) => !t.is_zero(),
            FieldValue::Number(v) => *v != 0.0,
            FieldValue::Flag(b) => *b,
        }
    }
}
