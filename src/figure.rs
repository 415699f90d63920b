//! Chart model: traces, axes, colors, and layout options.

use crate::result::{MeasurementTable, RunRecord};
use serde::Serialize;
use std::str::FromStr;

/// Qualitative 10-color palette used for algorithm color pairs.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Primary (line) and secondary (fill) colors for the `i`-th algorithm.
///
/// The secondary color sits five palette slots away, so adjacent algorithms
/// never share a similar fill.
pub(crate) fn color_pair(i: usize) -> (&'static str, &'static str) {
    (PALETTE[i % PALETTE.len()], PALETTE[(i + 5) % PALETTE.len()])
}

/// Axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Log,
    Linear,
}

impl Scale {
    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Log => "log",
            Scale::Linear => "linear",
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Scale::Log),
            "linear" => Ok(Scale::Linear),
            other => Err(format!("unknown scale '{}' (expected log or linear)", other)),
        }
    }
}

/// Layout options for [`Figure`] construction.
#[derive(Debug, Clone, Serialize)]
pub struct FigureOptions {
    pub width: u32,
    pub height: u32,
    pub xscale: Scale,
    pub yscale: Scale,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            xscale: Scale::Log,
            yscale: Scale::Log,
        }
    }
}

impl FigureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, w: u32) -> Self {
        self.width = w;
        self
    }

    pub fn height(mut self, h: u32) -> Self {
        self.height = h;
        self
    }

    pub fn xscale(mut self, s: Scale) -> Self {
        self.xscale = s;
        self
    }

    pub fn yscale(mut self, s: Scale) -> Self {
        self.yscale = s;
        self
    }
}

/// What a trace plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    /// Raw per-sample spread at each size, drawn box style.
    Distribution,
    /// Mean running time per size, connected by a line.
    Trend,
}

/// One plotted series.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    /// Algorithm the trace belongs to (legend label for trend traces).
    pub name: String,
    pub kind: TraceKind,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// Line and outline color.
    pub line_color: &'static str,
    /// Fill color for distribution boxes.
    pub fill_color: &'static str,
    /// Whether the trace gets a legend entry.
    pub show_legend: bool,
}

/// One axis: full label text plus scale.
#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: String,
    pub scale: Scale,
}

impl Axis {
    fn new(base: &str, scale: Scale) -> Self {
        let title = match scale {
            Scale::Log => format!("{} [log scale]", base),
            Scale::Linear => base.to_string(),
        };
        Self { title, scale }
    }
}

/// A complete chart: layout, axes, and a trace pair per algorithm.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub traces: Vec<Trace>,
}

impl Figure {
    /// Assemble traces from registration-ordered names and sizes plus the
    /// measurement table.
    ///
    /// Instances whose cell holds no samples are skipped in both traces, so
    /// a figure built before any run has empty traces rather than failing.
    pub(crate) fn build(
        title: &str,
        options: &FigureOptions,
        algorithms: &[&str],
        sizes: &[u64],
        table: &MeasurementTable,
    ) -> Self {
        let mut traces = Vec::with_capacity(algorithms.len() * 2);

        for (i, name) in algorithms.iter().enumerate() {
            let (line_color, fill_color) = color_pair(i);

            let mut xs = Vec::new();
            let mut ys = Vec::new();
            let mut mean_xs = Vec::new();
            let mut mean_ys = Vec::new();

            // One lookup per instance occurrence: instances sharing a size
            // contribute the full merged sample sequence each time.
            for &size in sizes {
                let samples = table.samples(name, size);
                if samples.is_empty() {
                    continue;
                }
                xs.extend(std::iter::repeat(size as f64).take(samples.len()));
                ys.extend_from_slice(samples);
                mean_xs.push(size as f64);
                mean_ys.push(samples.iter().sum::<f64>() / samples.len() as f64);
            }

            traces.push(Trace {
                name: (*name).to_string(),
                kind: TraceKind::Distribution,
                xs,
                ys,
                line_color,
                fill_color,
                show_legend: false,
            });
            traces.push(Trace {
                name: (*name).to_string(),
                kind: TraceKind::Trend,
                xs: mean_xs,
                ys: mean_ys,
                line_color,
                fill_color,
                show_legend: true,
            });
        }

        Self {
            title: title.to_string(),
            width: options.width,
            height: options.height,
            x_axis: Axis::new("Input size: n", options.xscale),
            y_axis: Axis::new("Running time (sec)", options.yscale),
            traces,
        }
    }

    /// Rebuild a figure from a saved run record.
    pub fn from_record(record: &RunRecord, title: &str, options: &FigureOptions) -> Self {
        let names: Vec<&str> = record.algorithms.iter().map(String::as_str).collect();
        Self::build(title, options, &names, &record.sizes, &record.table)
    }

    /// Trend traces (the ones with legend entries), in algorithm order.
    pub fn trend_traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(|t| t.kind == TraceKind::Trend)
    }

    /// Distribution traces, in algorithm order.
    pub fn distribution_traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces
            .iter()
            .filter(|t| t.kind == TraceKind::Distribution)
    }
}
