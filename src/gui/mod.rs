//! The eframe/egui implementation for the GUI.
//!
//! [`ConsoleApp`] binds egui widgets to a [`Console`]. Each frame it first drains pending
//! backend pushes, then draws the tabs and routes widget events back into the console:
//!
//! - setpoint fields report focus-in, focus-out and Enter-to-submit;
//! - the enabled checkbox reports operator clicks as [`ChangeOrigin::User`];
//! - a window close request runs the shutdown sequence with the current window geometry.
//!
//! Focus that disappears without a focus-out event (the Main tab was left while a control
//! was focused) is reconciled against egui's focus memory at the start of every frame.

pub mod plot;
pub mod status_panel;

use egui::{Key, TextEdit};
use std::collections::HashMap;
use std::sync::Arc;

use self::status_panel::StatusFilter;
use crate::config::ConsoleConfig;
use crate::console::{ChangeOrigin, Console, ControlId, LifecycleState};
use crate::error::{ConsoleError, SetpointKind};
use crate::hardware::{SimulatedSupply, Waker};
use crate::sample::SampleField;
use crate::settings::{SettingsStore, WindowGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Main,
    Settings,
}

/// The main GUI struct.
pub struct ConsoleApp {
    console: Console<SimulatedSupply>,
    config: ConsoleConfig,
    settings: SettingsStore,
    geometry: WindowGeometry,
    tab: Tab,
    status_filter: StatusFilter,
    setpoint_max_chars: usize,
    // egui widget ids of the synced controls, as last drawn.
    focus_ids: HashMap<ControlId, egui::Id>,
    // Must outlive `console`; the supply task runs on it.
    _runtime: tokio::runtime::Runtime,
}

impl ConsoleApp {
    /// Starts the simulated supply on `runtime` and connects a console to it.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ConsoleConfig,
        settings: SettingsStore,
        geometry: WindowGeometry,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let supply = SimulatedSupply::spawn(config.instrument.clone(), runtime.handle());

        let ctx = cc.egui_ctx.clone();
        let waker: Waker = Arc::new(move || ctx.request_repaint());
        let console = Console::new(supply, &config, Some(waker));

        Self {
            console,
            setpoint_max_chars: config.display.setpoint_max_chars,
            config,
            settings,
            geometry,
            tab: Tab::Main,
            status_filter: StatusFilter::default(),
            focus_ids: HashMap::new(),
            _runtime: runtime,
        }
    }

    /// Tracks the window geometry so it is known when the close request arrives.
    fn track_geometry(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            let viewport = i.viewport();
            if let Some(inner) = viewport.inner_rect {
                self.geometry.size = [inner.width(), inner.height()];
            }
            if let Some(outer) = viewport.outer_rect {
                self.geometry.pos = [outer.min.x, outer.min.y];
            }
        });
    }

    /// Releases controls still marked as editing that egui no longer has focused.
    fn reconcile_focus(&mut self, ctx: &egui::Context) {
        let focus_ids = &self.focus_ids;
        self.console.controls_mut().reconcile_focus(|id| {
            focus_ids
                .get(&id)
                .is_some_and(|widget| ctx.memory(|m| m.has_focus(*widget)))
        });
    }

    fn handle_close(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        if self.console.state() == LifecycleState::Closed {
            return;
        }
        let report = self.console.close(&self.geometry, &mut self.settings);
        if let Err(e) = report.into_result() {
            tracing::error!(error = %e, "Closing with errors");
        }
    }

    fn setpoint_row(&mut self, ui: &mut egui::Ui, kind: SetpointKind, label: &str) {
        ui.label(label);
        let max_chars = self.setpoint_max_chars;
        let field = self.console.controls_mut().setpoint_mut(kind);
        let response = ui.add(
            TextEdit::singleline(field.text_mut())
                .char_limit(max_chars)
                .desired_width(80.0),
        );

        let id = ControlId::from(kind);
        self.focus_ids.insert(id, response.id);
        if response.gained_focus() {
            self.console.controls_mut().focus_in(id);
        }
        if response.lost_focus() {
            if ui.input(|i| i.key_pressed(Key::Enter)) {
                // Failures are already on the status log.
                if self.console.submit_setpoint(kind).is_err()
                    && self.console.controls().setpoint(kind).has_focus()
                {
                    response.request_focus();
                }
            } else {
                self.console.controls_mut().focus_out(id);
            }
        }
        ui.end_row();
    }

    fn controls_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Output");
        egui::Grid::new("setpoints")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                self.setpoint_row(ui, SetpointKind::Voltage, "Voltage, V");
                self.setpoint_row(ui, SetpointKind::Current, "Current, A");
            });

        ui.add_space(6.0);
        let mut checked = self.console.controls().enabled.checked();
        let response = ui.checkbox(&mut checked, "Output enabled");
        self.focus_ids.insert(ControlId::Enabled, response.id);
        if response.gained_focus() {
            self.console.controls_mut().focus_in(ControlId::Enabled);
        }
        if response.changed() {
            let _ = self.console.toggle_enabled(checked, ChangeOrigin::User);
            response.surrender_focus();
        } else if response.lost_focus() {
            self.console.controls_mut().focus_out(ControlId::Enabled);
        }

        ui.separator();
        self.readouts(ui);

        ui.separator();
        ui.horizontal(|ui| {
            if ui
                .button("Export samples")
                .on_hover_text("Save the plotted samples as CSV")
                .clicked()
            {
                // Export failures are already on the status log.
                if let Err(e @ ConsoleError::InvalidState(_)) = self.console.export_samples() {
                    self.console.report(&e);
                }
            }
            if ui.button("Reset").clicked() {
                if let Err(e) = self.console.reset() {
                    self.console.report(&e);
                }
            }
        });
    }

    fn readouts(&self, ui: &mut egui::Ui) {
        let store = self.console.store().read();
        let number = |field| {
            store
                .lastval(field)
                .map_or_else(|| "-".to_string(), |v| format!("{:.3}", v.as_f64()))
        };
        let output = match store.lastval(SampleField::IsOn).map(|v| v.as_bool()) {
            Some(true) => "on",
            Some(false) => "off",
            None => "-",
        };
        egui::Grid::new("readouts").num_columns(2).show(ui, |ui| {
            ui.label("Measured voltage");
            ui.monospace(number(SampleField::Voltage));
            ui.end_row();
            ui.label("Measured current");
            ui.monospace(number(SampleField::Current));
            ui.end_row();
            ui.label("Output");
            ui.monospace(output);
            ui.end_row();
            ui.label("Samples");
            ui.monospace(store.len().to_string());
            ui.end_row();
        });
    }

    fn settings_tab(&self, ui: &mut egui::Ui) {
        ui.heading("Effective configuration");
        ui.label(format!("Settings file: {}", self.settings.path().display()));
        ui.separator();
        let mut text = serde_json::to_string_pretty(&self.config)
            .unwrap_or_else(|e| format!("<unavailable: {e}>"));
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add(
                TextEdit::multiline(&mut text)
                    .code_editor()
                    .interactive(false)
                    .desired_width(f32::INFINITY),
            );
        });
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.reconcile_focus(ctx);
        self.console.pump();
        self.track_geometry(ctx);

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Main, "Main");
                ui.selectable_value(&mut self.tab, Tab::Settings, "Settings");
            });
        });

        match self.tab {
            Tab::Main => {
                egui::TopBottomPanel::bottom("status_panel")
                    .resizable(true)
                    .min_height(120.0)
                    .show(ctx, |ui| {
                        status_panel::render(
                            ui,
                            self.console.status_mut(),
                            &mut self.status_filter,
                        );
                    });

                egui::SidePanel::left("control_panel")
                    .resizable(false)
                    .min_width(220.0)
                    .show(ctx, |ui| self.controls_panel(ui));

                egui::CentralPanel::default().show(ctx, |ui| {
                    plot::render(ui, self.console.chart().frame());
                });
            }
            Tab::Settings => {
                egui::CentralPanel::default().show(ctx, |ui| self.settings_tab(ui));
            }
        }

        self.handle_close(ctx);
    }
}
