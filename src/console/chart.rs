//! Two-axis voltage/current chart.
//!
//! The renderer turns the whole sample window into a [`ChartFrame`]: a description of what
//! to draw, independent of the plotting toolkit. Each redraw starts from scratch.
//!
//! - **x (time)**: `[0, max(min_window, t_last)]`. The window starts at one minute and grows
//!   with the test; it never shrinks or scrolls.
//! - **primary y (voltage)**: lower bound pinned to the latest voltage setpoint so any sag
//!   below it is clipped at the axis floor; upper bound follows the data.
//! - **secondary y (current)**: always `[0, current_ceiling]`.

use crate::config::DisplayConfig;
use crate::sample::Sample;

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl AxisRange {
    /// A range from `min` to `max`.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range, 0 at `min` and 1 at `max`.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    /// Inverse of [`AxisRange::normalize`].
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * self.span()
    }

    /// Maps `value` to the same relative position in `target`.
    pub fn map_to(&self, value: f64, target: AxisRange) -> f64 {
        target.lerp(self.normalize(value))
    }
}

/// Where an axis legend sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    /// Middle of the left edge.
    CenterLeft,
    /// Middle of the right edge.
    CenterRight,
}

/// Visual style of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    /// Default line.
    Solid,
    /// Red line, used to tell the secondary trace apart.
    Red,
}

/// One plotted series, `[seconds, value]` points in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Legend label.
    pub name: &'static str,
    /// Line style.
    pub style: TraceStyle,
    /// Points in axis coordinates.
    pub points: Vec<[f64; 2]>,
}

/// A y axis with its single trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Axis title.
    pub label: &'static str,
    /// Visible value range.
    pub range: AxisRange,
    /// Where the legend for this axis sits.
    pub legend: LegendPlacement,
    /// The trace plotted against this axis.
    pub trace: Trace,
}

/// Everything needed to draw one chart update.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    /// Time range in seconds.
    pub x: AxisRange,
    /// Left axis, voltage.
    pub primary: Axis,
    /// Right axis, current.
    pub secondary: Axis,
}

impl ChartFrame {
    /// Maps a secondary-axis value onto primary-axis coordinates, for toolkits that draw both
    /// traces in one coordinate system.
    pub fn secondary_to_primary(&self, value: f64) -> f64 {
        self.secondary.range.map_to(value, self.primary.range)
    }
}

/// Scaling constants for the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSettings {
    /// Smallest visible time window.
    pub min_window_secs: f64,
    /// Top of the current axis.
    pub current_ceiling: f64,
    /// Fraction of the voltage excursion added above the peak.
    pub voltage_headroom: f64,
    /// Smallest height of the voltage axis.
    pub min_voltage_span: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for ChartSettings {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            min_window_secs: display.min_window_secs,
            current_ceiling: display.current_ceiling_amps,
            voltage_headroom: display.voltage_headroom,
            min_voltage_span: display.min_voltage_span,
        }
    }
}

/// Builds the frame for a sample window; `None` when there is nothing to draw.
pub fn build_frame(samples: &[Sample], settings: &ChartSettings) -> Option<ChartFrame> {
    let latest = samples.last()?;

    let x = AxisRange::new(0.0, settings.min_window_secs.max(latest.seconds()));

    let floor = latest.set_voltage;
    let peak = samples
        .iter()
        .map(|s| s.voltage)
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let ceiling = if peak > floor {
        peak + settings.voltage_headroom * (peak - floor)
    } else {
        floor
    };
    let ceiling = ceiling.max(floor + settings.min_voltage_span);

    let voltage_points = samples.iter().map(|s| [s.seconds(), s.voltage]).collect();
    let current_points = samples.iter().map(|s| [s.seconds(), s.current]).collect();

    Some(ChartFrame {
        x,
        primary: Axis {
            label: "Voltage, V",
            range: AxisRange::new(floor, ceiling),
            legend: LegendPlacement::CenterLeft,
            trace: Trace {
                name: "voltage",
                style: TraceStyle::Solid,
                points: voltage_points,
            },
        },
        secondary: Axis {
            label: "Current, A",
            range: AxisRange::new(0.0, settings.current_ceiling),
            legend: LegendPlacement::CenterRight,
            trace: Trace {
                name: "current",
                style: TraceStyle::Red,
                points: current_points,
            },
        },
    })
}

/// Holds the most recent frame and rebuilds it on every sample.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    settings: ChartSettings,
    frame: Option<ChartFrame>,
    redraws: u64,
}

impl ChartRenderer {
    /// A renderer with no frame yet.
    pub fn new(settings: ChartSettings) -> Self {
        Self {
            settings,
            frame: None,
            redraws: 0,
        }
    }

    /// Scaling in use.
    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Clears both axes and rebuilds from the full window. An empty window leaves the chart
    /// blank.
    pub fn redraw(&mut self, samples: &[Sample]) -> Option<&ChartFrame> {
        self.frame = build_frame(samples, &self.settings);
        if self.frame.is_some() {
            self.redraws += 1;
        }
        self.frame.as_ref()
    }

    /// The frame to put on screen.
    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    /// Number of frames built so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}
