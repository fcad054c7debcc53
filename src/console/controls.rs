//! Editable control state owned by the view-model.
//!
//! Every synced control carries an explicit [`ControlState`]. The toolkit only reports focus
//! and submit events; whether a backend push may overwrite a control is decided here.

use crate::error::SetpointKind;

/// Edit state of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    /// Displays the latest backend value.
    #[default]
    Synced,
    /// Holds input focus; backend pushes leave it alone.
    Editing,
    /// A committed value is being sent; focus is released once it is out.
    PendingSubmit,
}

impl ControlState {
    /// Whether a backend push may overwrite the displayed value.
    pub fn accepts_sync(&self) -> bool {
        matches!(self, ControlState::Synced)
    }
}

/// Identifies a synced control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Voltage setpoint field.
    VoltageSetpoint,
    /// Current setpoint field.
    CurrentSetpoint,
    /// Output-enabled checkbox.
    Enabled,
}

impl ControlId {
    /// Every synced control.
    pub const ALL: [ControlId; 3] = [
        ControlId::VoltageSetpoint,
        ControlId::CurrentSetpoint,
        ControlId::Enabled,
    ];
}

impl From<SetpointKind> for ControlId {
    fn from(kind: SetpointKind) -> Self {
        match kind {
            SetpointKind::Voltage => ControlId::VoltageSetpoint,
            SetpointKind::Current => ControlId::CurrentSetpoint,
        }
    }
}

/// Where a change to the enabled toggle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The operator clicked the toggle.
    User,
    /// The view-model mirrored a backend sample.
    Sync,
}

/// A free-text numeric setpoint field.
#[derive(Debug, Clone, Default)]
pub struct SetpointField {
    text: String,
    state: ControlState,
}

impl SetpointField {
    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable text for the toolkit to bind an input widget to.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Replaces the displayed text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Current edit state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Whether backend pushes are currently held off.
    pub fn has_focus(&self) -> bool {
        !self.state.accepts_sync()
    }

    /// The control gained input focus.
    pub fn focus_in(&mut self) {
        self.state = ControlState::Editing;
    }

    /// Focus left without a submit; the next push overwrites any unsent text.
    pub fn focus_out(&mut self) {
        if self.state == ControlState::Editing {
            self.state = ControlState::Synced;
        }
    }

    pub(crate) fn begin_submit(&mut self) {
        self.state = ControlState::PendingSubmit;
    }

    /// Submit rejected; the operator keeps editing.
    pub(crate) fn resume_editing(&mut self) {
        self.state = ControlState::Editing;
    }

    pub(crate) fn release_focus(&mut self) {
        self.state = ControlState::Synced;
    }
}

/// The output-enabled checkbox.
#[derive(Debug, Clone, Default)]
pub struct EnableToggle {
    checked: bool,
    state: ControlState,
}

impl EnableToggle {
    /// Displayed checkbox state.
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Current edit state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Whether backend pushes are currently held off.
    pub fn has_focus(&self) -> bool {
        !self.state.accepts_sync()
    }

    /// The control gained input focus.
    pub fn focus_in(&mut self) {
        self.state = ControlState::Editing;
    }

    /// Focus left; resumes syncing unless a submit is in flight.
    pub fn focus_out(&mut self) {
        if self.state == ControlState::Editing {
            self.state = ControlState::Synced;
        }
    }

    pub(crate) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub(crate) fn begin_submit(&mut self) {
        self.state = ControlState::PendingSubmit;
    }

    pub(crate) fn release_focus(&mut self) {
        self.state = ControlState::Synced;
    }
}

/// All controls mirrored from the backend.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    /// Voltage setpoint field.
    pub voltage: SetpointField,
    /// Current setpoint field.
    pub current: SetpointField,
    /// Output-enabled checkbox.
    pub enabled: EnableToggle,
}

impl ControlPanel {
    /// The field for `kind`.
    pub fn setpoint(&self, kind: SetpointKind) -> &SetpointField {
        match kind {
            SetpointKind::Voltage => &self.voltage,
            SetpointKind::Current => &self.current,
        }
    }

    /// The field for `kind`, mutably.
    pub fn setpoint_mut(&mut self, kind: SetpointKind) -> &mut SetpointField {
        match kind {
            SetpointKind::Voltage => &mut self.voltage,
            SetpointKind::Current => &mut self.current,
        }
    }

    /// Edit state of control `id`.
    pub fn state(&self, id: ControlId) -> ControlState {
        match id {
            ControlId::VoltageSetpoint => self.voltage.state(),
            ControlId::CurrentSetpoint => self.current.state(),
            ControlId::Enabled => self.enabled.state(),
        }
    }

    /// Routes a toolkit focus-in event.
    pub fn focus_in(&mut self, id: ControlId) {
        match id {
            ControlId::VoltageSetpoint => self.voltage.focus_in(),
            ControlId::CurrentSetpoint => self.current.focus_in(),
            ControlId::Enabled => self.enabled.focus_in(),
        }
    }

    /// Routes a toolkit focus-out event.
    pub fn focus_out(&mut self, id: ControlId) {
        match id {
            ControlId::VoltageSetpoint => self.voltage.focus_out(),
            ControlId::CurrentSetpoint => self.current.focus_out(),
            ControlId::Enabled => self.enabled.focus_out(),
        }
    }

    /// Ends editing on every control the toolkit no longer reports as focused.
    ///
    /// Covers focus that vanished without a focus-out event, e.g. when the widget stopped
    /// being drawn.
    pub fn reconcile_focus(&mut self, is_focused: impl Fn(ControlId) -> bool) {
        for id in ControlId::ALL {
            if self.state(id) == ControlState::Editing && !is_focused(id) {
                tracing::debug!(?id, "Focus lost without focus-out");
                self.focus_out(id);
            }
        }
    }
}
