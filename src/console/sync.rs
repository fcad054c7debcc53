//! Mirrors backend samples into the editable controls.
//!
//! A control only takes the pushed value while it is [`ControlState::Synced`]. A control that
//! holds focus or is mid-submit keeps whatever the operator typed.

use super::controls::{ControlId, ControlPanel, ControlState};
use crate::error::SetpointKind;
use crate::sample::Sample;

/// Which controls one sync pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Controls overwritten from the sample.
    pub updated: Vec<ControlId>,
    /// Focused controls left untouched.
    pub skipped: Vec<ControlId>,
}

/// Formats a setpoint for display.
pub fn format_setpoint(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Copies the sample's setpoints and output state into every unfocused control.
pub fn sync_controls(panel: &mut ControlPanel, sample: &Sample, decimals: usize) -> SyncReport {
    let mut report = SyncReport::default();

    let setpoints = [
        (SetpointKind::Voltage, sample.set_voltage),
        (SetpointKind::Current, sample.set_current),
    ];
    for (kind, value) in setpoints {
        let field = panel.setpoint_mut(kind);
        if field.state().accepts_sync() {
            field.set_text(format_setpoint(value, decimals));
            report.updated.push(kind.into());
        } else {
            report.skipped.push(kind.into());
        }
    }

    if panel.enabled.state() == ControlState::Synced {
        panel.enabled.set_checked(sample.is_on);
        report.updated.push(ControlId::Enabled);
    } else {
        report.skipped.push(ControlId::Enabled);
    }

    if !report.skipped.is_empty() {
        tracing::trace!(skipped = ?report.skipped, "Left focused controls untouched");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample(set_voltage: f64, set_current: f64, is_on: bool) -> Sample {
        Sample {
            time: Duration::from_secs(3),
            voltage: set_voltage,
            current: 0.0,
            set_voltage,
            set_current,
            is_on,
        }
    }

    #[test]
    fn formats_with_configured_decimals() {
        assert_eq!(format_setpoint(3.7, 2), "3.70");
        assert_eq!(format_setpoint(12.346, 2), "12.35");
        assert_eq!(format_setpoint(1.0, 0), "1");
    }

    #[test]
    fn unfocused_controls_follow_the_sample() {
        let mut panel = ControlPanel::default();
        let report = sync_controls(&mut panel, &sample(4.2, 1.5, true), 2);

        assert_eq!(panel.voltage.text(), "4.20");
        assert_eq!(panel.current.text(), "1.50");
        assert!(panel.enabled.checked());
        assert_eq!(report.updated.len(), 3);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn focused_controls_keep_operator_text() {
        let mut panel = ControlPanel::default();
        panel.voltage.focus_in();
        panel.voltage.set_text("3.");
        panel.enabled.focus_in();

        let report = sync_controls(&mut panel, &sample(4.2, 1.5, true), 2);

        assert_eq!(panel.voltage.text(), "3.");
        assert_eq!(panel.current.text(), "1.50");
        assert!(!panel.enabled.checked());
        assert_eq!(
            report.skipped,
            vec![ControlId::VoltageSetpoint, ControlId::Enabled]
        );
    }

    #[test]
    fn repeated_sync_on_focused_field_is_a_no_op() {
        let mut panel = ControlPanel::default();
        panel.current.focus_in();
        panel.current.set_text("2.5");
        for v in [1.0, 2.0, 3.0] {
            sync_controls(&mut panel, &sample(v, v, false), 2);
            assert_eq!(panel.current.text(), "2.5");
        }
    }
}
