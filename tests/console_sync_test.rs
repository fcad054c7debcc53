//! Integration tests for view-model sync and chart redraws driven by backend pushes.

mod common;

use bench_console::config::ConsoleConfig;
use bench_console::console::{Console, ControlId, ControlState, LifecycleState};
use common::{sample, EventLog, RecordingBackend};

fn connected() -> (Console<RecordingBackend>, EventLog) {
    let events = EventLog::default();
    let console = Console::new(
        RecordingBackend::new(events.clone()),
        &ConsoleConfig::default(),
        None,
    );
    (console, events)
}

#[test]
fn construction_subscribes_and_connects() {
    let (console, events) = connected();
    assert_eq!(console.state(), LifecycleState::Connected);
    assert!(console.backend().is_subscribed());
    assert!(events.lock().is_empty());
}

#[test]
fn unfocused_controls_track_every_push() {
    let (mut console, _) = connected();

    for (i, v) in [3.0, 3.25, 4.2].into_iter().enumerate() {
        console
            .backend()
            .push(sample(i as f64, v, v, v / 2.0, i % 2 == 0));
        assert_eq!(console.pump(), 1);

        let controls = console.controls();
        assert_eq!(controls.voltage.text(), format!("{v:.2}"));
        assert_eq!(controls.current.text(), format!("{:.2}", v / 2.0));
        assert_eq!(controls.enabled.checked(), i % 2 == 0);
    }
}

#[test]
fn focused_field_keeps_partial_input() {
    let (mut console, _) = connected();
    console.backend().push(sample(0.0, 1.0, 1.0, 1.0, false));
    console.pump();

    console.controls_mut().focus_in(ControlId::VoltageSetpoint);
    console.controls_mut().voltage.set_text("12.");

    for t in 1..=5 {
        console
            .backend()
            .push(sample(f64::from(t), 5.0, 5.0, 2.0, true));
    }
    assert_eq!(console.pump(), 5);

    assert_eq!(console.controls().voltage.text(), "12.");
    assert_eq!(console.controls().current.text(), "2.00");
    assert!(console.controls().enabled.checked());
}

#[test]
fn focus_out_without_submit_resumes_sync() {
    let (mut console, _) = connected();
    console.controls_mut().focus_in(ControlId::CurrentSetpoint);
    console.controls_mut().current.set_text("9");
    console.controls_mut().focus_out(ControlId::CurrentSetpoint);
    assert_eq!(
        console.controls().state(ControlId::CurrentSetpoint),
        ControlState::Synced
    );

    console.backend().push(sample(1.0, 3.0, 3.0, 1.5, false));
    console.pump();
    assert_eq!(console.controls().current.text(), "1.50");
}

#[test]
fn no_data_push_changes_nothing() {
    let (mut console, _) = connected();
    console.controls_mut().voltage.set_text("7.00");

    console.backend().push_raw(None);
    assert_eq!(console.pump(), 1);

    assert_eq!(console.controls().voltage.text(), "7.00");
    assert!(console.chart().frame().is_none());
    assert_eq!(console.chart().redraws(), 0);
    assert!(console.status().is_empty());
}

#[test]
fn every_sample_redraws_the_whole_window() {
    let (mut console, _) = connected();
    for t in 0..4 {
        console
            .backend()
            .push(sample(f64::from(t) * 30.0, 4.0, 3.5, 1.0, true));
    }
    console.pump();

    assert_eq!(console.chart().redraws(), 4);
    let frame = console.chart().frame().unwrap();
    assert_eq!(frame.primary.trace.points.len(), 4);
    assert_eq!(frame.x.max, 90.0);
    assert_eq!(frame.primary.range.min, 3.5);
    assert_eq!(frame.secondary.range.min, 0.0);
    assert_eq!(frame.secondary.range.max, 10.0);
}

#[test]
fn pushes_after_close_are_ignored() {
    let (mut console, events) = connected();
    let mut geometry = common::RecordingGeometry {
        events,
        fail: false,
    };
    console.close(&Default::default(), &mut geometry);

    console.backend().push(sample(1.0, 3.0, 3.0, 1.0, true));
    console.pump();
    assert_eq!(console.controls().voltage.text(), "");
    assert!(console.chart().frame().is_none());
}

#[test]
fn silently_lost_focus_resumes_sync() {
    let (mut console, _) = connected();
    console.controls_mut().focus_in(ControlId::VoltageSetpoint);
    console.controls_mut().focus_in(ControlId::Enabled);

    console.backend().push(sample(0.0, 3.0, 3.0, 1.0, true));
    console.pump();
    assert_eq!(console.controls().voltage.text(), "");
    assert!(!console.controls().enabled.checked());

    // The panel was hidden, so no focus-out ever arrived.
    console.controls_mut().reconcile_focus(|_| false);
    console.backend().push(sample(1.0, 3.5, 3.5, 1.0, true));
    console.pump();

    assert_eq!(console.controls().voltage.text(), "3.50");
    assert!(console.controls().enabled.checked());
    assert_eq!(
        console.controls().state(ControlId::VoltageSetpoint),
        ControlState::Synced
    );
}
