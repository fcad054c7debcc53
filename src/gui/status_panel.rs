//! Renders the status panel at the bottom of the main window.
//!
//! The panel lists what the console reported: rejected input, backend failures, exports and
//! resets. Entries can be filtered by level and by text, and the list sticks to the newest
//! entry unless scroll-to-bottom is turned off.

use egui::{Color32, ScrollArea, Ui};

use crate::console::{StatusEntry, StatusLevel, StatusLog};

/// Filter and scroll state of the panel.
#[derive(Debug, Clone)]
pub struct StatusFilter {
    /// Substring filter; empty shows everything.
    pub text: String,
    /// Least severe level shown.
    pub level: StatusLevel,
    /// Keep the newest entry in view.
    pub scroll_to_bottom: bool,
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: StatusLevel::Info,
            scroll_to_bottom: true,
        }
    }
}

impl StatusFilter {
    /// Whether `entry` passes the filter.
    pub fn matches(&self, entry: &StatusEntry) -> bool {
        entry.level <= self.level && (self.text.is_empty() || entry.message.contains(&self.text))
    }
}

fn level_color(level: StatusLevel) -> Color32 {
    match level {
        StatusLevel::Error => Color32::RED,
        StatusLevel::Warn => Color32::YELLOW,
        StatusLevel::Info => Color32::GRAY,
    }
}

/// Renders the status panel.
pub fn render(ui: &mut Ui, log: &mut StatusLog, filter: &mut StatusFilter) {
    ui.heading("Status");

    ui.horizontal(|ui| {
        ui.label("Filter Level:");
        egui::ComboBox::from_id_salt("status_level_filter")
            .selected_text(format!("{:?}", filter.level))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut filter.level, StatusLevel::Error, "Error");
                ui.selectable_value(&mut filter.level, StatusLevel::Warn, "Warn");
                ui.selectable_value(&mut filter.level, StatusLevel::Info, "Info");
            });

        ui.label("Filter Text:");
        let _ = ui.text_edit_singleline(&mut filter.text);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Clear").clicked() {
                log.clear();
            }
            ui.toggle_value(&mut filter.scroll_to_bottom, "Scroll to Bottom");
        });
    });

    ui.separator();

    let text_style = egui::TextStyle::Monospace;
    let row_height = ui.text_style_height(&text_style);
    let visible: Vec<&StatusEntry> = log.entries().filter(|e| filter.matches(e)).collect();

    ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(filter.scroll_to_bottom)
        .show_rows(ui, row_height, visible.len(), |ui, row_range| {
            for entry in &visible[row_range] {
                ui.horizontal(|ui| {
                    ui.colored_label(level_color(entry.level), format!("[{:?}]", entry.level));
                    ui.label(entry.timestamp.format("%H:%M:%S%.3f").to_string());
                    ui.label(&entry.message);
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_level_and_text() {
        let mut log = StatusLog::new(10);
        log.push(StatusLevel::Info, "Exported samples to ./tmp/a.csv");
        log.push(StatusLevel::Warn, "Backend command failed: session closed");
        log.push(StatusLevel::Error, "Shutdown failed with errors");

        let mut filter = StatusFilter {
            level: StatusLevel::Warn,
            ..StatusFilter::default()
        };
        assert_eq!(log.entries().filter(|e| filter.matches(e)).count(), 2);

        filter.level = StatusLevel::Info;
        filter.text = "Exported".to_string();
        let hits: Vec<_> = log.entries().filter(|e| filter.matches(e)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].level, StatusLevel::Info);
    }
}
