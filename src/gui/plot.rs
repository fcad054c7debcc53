//! Draws a [`ChartFrame`] with `egui_plot`.
//!
//! `egui_plot` has a single coordinate system, so the current trace is mapped into voltage
//! coordinates and the right-hand axis labels are mapped back. The axis legends are drawn as
//! text items pinned to the vertical middle of each side.

use egui::{Align2, Color32, RichText};
use egui_plot::{AxisHints, HPlacement, Line, Plot, PlotBounds, PlotPoint, PlotPoints, Text};

use crate::console::{Axis, ChartFrame, LegendPlacement, TraceStyle};

fn trace_color(style: TraceStyle) -> Color32 {
    match style {
        TraceStyle::Solid => Color32::LIGHT_BLUE,
        TraceStyle::Red => Color32::RED,
    }
}

/// Elapsed seconds as `HH:MM:SS`.
pub fn format_elapsed(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

fn legend(frame: &ChartFrame, axis: &Axis) -> Text {
    let mid = (frame.primary.range.min + frame.primary.range.max) / 2.0;
    let (x, anchor) = match axis.legend {
        LegendPlacement::CenterLeft => (frame.x.min, Align2::LEFT_CENTER),
        LegendPlacement::CenterRight => (frame.x.max, Align2::RIGHT_CENTER),
    };
    let color = trace_color(axis.trace.style);
    Text::new(
        PlotPoint::new(x, mid),
        RichText::new(format!("● {}", axis.trace.name)).color(color),
    )
    .anchor(anchor)
}

/// Renders the chart, or a placeholder while there are no samples.
pub fn render(ui: &mut egui::Ui, frame: Option<&ChartFrame>) {
    let Some(frame) = frame else {
        ui.centered_and_justified(|ui| {
            ui.weak("No samples yet");
        });
        return;
    };

    let primary = frame.primary.range;
    let secondary = frame.secondary.range;

    Plot::new("samples")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_label("Time")
        .x_axis_formatter(|mark, _range| format_elapsed(mark.value))
        .custom_y_axes(vec![
            AxisHints::new_y().label(frame.primary.label),
            AxisHints::new_y()
                .label(frame.secondary.label)
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| {
                    format!("{:.1}", primary.map_to(mark.value, secondary))
                }),
        ])
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [frame.x.min, primary.min],
                [frame.x.max, primary.max],
            ));

            let voltage = &frame.primary.trace;
            plot_ui.line(
                Line::new(PlotPoints::from(voltage.points.clone()))
                    .name(voltage.name)
                    .color(trace_color(voltage.style)),
            );

            let current = &frame.secondary.trace;
            let mapped: Vec<[f64; 2]> = current
                .points
                .iter()
                .map(|&[t, amps]| [t, frame.secondary_to_primary(amps)])
                .collect();
            plot_ui.line(
                Line::new(PlotPoints::from(mapped))
                    .name(current.name)
                    .color(trace_color(current.style)),
            );

            plot_ui.text(legend(frame, &frame.primary));
            plot_ui.text(legend(frame, &frame.secondary));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_labels() {
        assert_eq!(format_elapsed(0.0), "00:00:00");
        assert_eq!(format_elapsed(59.6), "00:01:00");
        assert_eq!(format_elapsed(3725.0), "01:02:05");
        assert_eq!(format_elapsed(-3.0), "00:00:00");
    }
}
