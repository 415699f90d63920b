//! SVG emission and image output for [`Figure`]s.
//!
//! The chart is emitted as a standalone SVG document. PNG output parses that
//! document back with `usvg` and rasterizes it through `tiny-skia` (behind
//! the `raster` feature).

use crate::error::ExperimentError;
use crate::figure::{Figure, Scale, Trace, TraceKind};
use std::path::Path;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const BOX_HALF_WIDTH: f64 = 7.0;

/// Maps data values onto a pixel span, linearly or logarithmically.
struct AxisMapper {
    scale: Scale,
    lo: f64,
    hi: f64,
    origin: f64,
    span: f64,
    invert: bool,
}

impl AxisMapper {
    /// Derive the plotted domain from `values`; non-finite values are
    /// ignored, and so are non-positive values on a log axis.
    fn new(scale: Scale, values: &[f64], origin: f64, span: f64, invert: bool) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in values {
            if !v.is_finite() {
                continue;
            }
            if scale == Scale::Log && v <= 0.0 {
                continue;
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }

        if !lo.is_finite() || !hi.is_finite() {
            // Nothing plottable; fall back to an arbitrary non-degenerate range.
            (lo, hi) = match scale {
                Scale::Log => (0.1, 10.0),
                Scale::Linear => (0.0, 1.0),
            };
        }
        if lo == hi {
            match scale {
                Scale::Log => {
                    lo /= 10.0;
                    hi *= 10.0;
                }
                Scale::Linear => {
                    lo -= 0.5;
                    hi += 0.5;
                }
            }
        }

        Self {
            scale,
            lo,
            hi,
            origin,
            span,
            invert,
        }
    }

    /// Fraction of the span for a value; out-of-domain values (including
    /// non-positive values on a log axis) clamp to the nearest end.
    fn fraction(&self, v: f64) -> f64 {
        let (v, lo, hi) = match self.scale {
            Scale::Log => (v.max(self.lo).ln(), self.lo.ln(), self.hi.ln()),
            Scale::Linear => (v, self.lo, self.hi),
        };
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    fn pixel(&self, v: f64) -> f64 {
        let f = self.fraction(v);
        let f = if self.invert { 1.0 - f } else { f };
        self.origin + f * self.span
    }

    /// Tick values and labels: decades on a log axis, five even steps on a
    /// linear one.
    fn ticks(&self) -> Vec<(f64, String)> {
        match self.scale {
            Scale::Log => {
                let lo = self.lo.log10().floor() as i32;
                let hi = self.hi.log10().ceil() as i32;
                (lo..=hi)
                    .map(|k| (10f64.powi(k), format!("1e{}", k)))
                    .collect()
            }
            Scale::Linear => {
                const STEPS: usize = 5;
                (0..=STEPS)
                    .map(|i| {
                        let v = self.lo + (self.hi - self.lo) * i as f64 / STEPS as f64;
                        (v, format_tick(v))
                    })
                    .collect()
            }
        }
    }
}

fn format_tick(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1000.0 || v.abs() < 0.01 {
        format!("{:.0e}", v)
    } else {
        let s = format!("{:.3}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Linear-interpolation quantile of an ascending-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Group a distribution trace's samples by x value, preserving first-seen
/// order.
fn group_by_x(trace: &Trace) -> Vec<(f64, Vec<f64>)> {
    let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();
    for (&x, &y) in trace.xs.iter().zip(&trace.ys) {
        match groups.iter_mut().find(|(gx, _)| *gx == x) {
            Some((_, ys)) => ys.push(y),
            None => groups.push((x, vec![y])),
        }
    }
    groups
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Figure {
    /// Render the figure as a standalone SVG document.
    ///
    /// Distribution traces draw one box glyph per x value (whiskers min to
    /// max, quartile box, median tick); trend traces draw a polyline with
    /// point markers. Trend traces appear in the legend.
    pub fn to_svg(&self) -> String {
        let w = self.width as f64;
        let h = self.height as f64;
        let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (h - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

        let all_xs: Vec<f64> = self.traces.iter().flat_map(|t| t.xs.iter().copied()).collect();
        let all_ys: Vec<f64> = self.traces.iter().flat_map(|t| t.ys.iter().copied()).collect();
        let x_map = AxisMapper::new(self.x_axis.scale, &all_xs, MARGIN_LEFT, plot_w, false);
        let y_map = AxisMapper::new(self.y_axis.scale, &all_ys, MARGIN_TOP, plot_h, true);

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
             viewBox=\"0 0 {} {}\" font-family=\"sans-serif\">\n",
            self.width, self.height, self.width, self.height
        ));
        svg.push_str(&format!(
            "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            self.width, self.height
        ));

        // Title
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\" text-anchor=\"middle\">{}</text>\n",
            w / 2.0,
            MARGIN_TOP / 2.0,
            escape_text(&self.title)
        ));

        self.render_grid(&mut svg, &x_map, &y_map, plot_w, plot_h);

        for trace in &self.traces {
            match trace.kind {
                TraceKind::Distribution => render_distribution(&mut svg, trace, &x_map, &y_map),
                TraceKind::Trend => render_trend(&mut svg, trace, &x_map, &y_map),
            }
        }

        self.render_axis_titles(&mut svg, w, h);
        self.render_legend(&mut svg, w);

        svg.push_str("</svg>\n");
        svg
    }

    fn render_grid(
        &self,
        svg: &mut String,
        x_map: &AxisMapper,
        y_map: &AxisMapper,
        plot_w: f64,
        plot_h: f64,
    ) {
        for (v, label) in x_map.ticks() {
            let px = x_map.pixel(v);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e0e0e0\"/>\n",
                px,
                MARGIN_TOP,
                px,
                MARGIN_TOP + plot_h
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{}</text>\n",
                px,
                MARGIN_TOP + plot_h + 18.0,
                label
            ));
        }
        for (v, label) in y_map.ticks() {
            let py = y_map.pixel(v);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e0e0e0\"/>\n",
                MARGIN_LEFT,
                py,
                MARGIN_LEFT + plot_w,
                py
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{}</text>\n",
                MARGIN_LEFT - 8.0,
                py + 4.0,
                label
            ));
        }

        // Plot frame on top of the gridlines.
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"none\" stroke=\"#888888\"/>\n",
            MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h
        ));
    }

    fn render_axis_titles(&self, svg: &mut String, w: f64, h: f64) {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">{}</text>\n",
            MARGIN_LEFT + (w - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
            h - 20.0,
            escape_text(&self.x_axis.title)
        ));
        let y_mid = MARGIN_TOP + (h - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
        svg.push_str(&format!(
            "<text x=\"20\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" \
             transform=\"rotate(-90 20 {:.1})\">{}</text>\n",
            y_mid,
            y_mid,
            escape_text(&self.y_axis.title)
        ));
    }

    fn render_legend(&self, svg: &mut String, w: f64) {
        let entries: Vec<&Trace> = self.traces.iter().filter(|t| t.show_legend).collect();
        if entries.is_empty() {
            return;
        }

        let max_name = entries.iter().map(|t| t.name.len()).max().unwrap_or(0);
        let box_w = 40.0 + 7.5 * max_name as f64;
        let box_h = 10.0 + 18.0 * entries.len() as f64;
        let x0 = w - MARGIN_RIGHT - box_w - 10.0;
        let y0 = MARGIN_TOP + 10.0;

        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"white\" fill-opacity=\"0.8\" stroke=\"#888888\"/>\n",
            x0, y0, box_w, box_h
        ));

        for (i, trace) in entries.iter().enumerate() {
            let row_y = y0 + 18.0 + 18.0 * i as f64;
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" \
                 stroke=\"{}\" stroke-width=\"2\"/>\n",
                x0 + 6.0,
                row_y - 4.0,
                x0 + 28.0,
                row_y - 4.0,
                trace.line_color
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{}</text>\n",
                x0 + 34.0,
                row_y,
                escape_text(&trace.name)
            ));
        }
    }
}

fn render_distribution(svg: &mut String, trace: &Trace, x_map: &AxisMapper, y_map: &AxisMapper) {
    for (x, mut ys) in group_by_x(trace) {
        ys.sort_by(|a, b| a.total_cmp(b));

        let px = x_map.pixel(x);
        let p_min = y_map.pixel(ys[0]);
        let p_max = y_map.pixel(ys[ys.len() - 1]);
        let p_q1 = y_map.pixel(quantile(&ys, 0.25));
        let p_med = y_map.pixel(quantile(&ys, 0.5));
        let p_q3 = y_map.pixel(quantile(&ys, 0.75));

        // Whisker spans the full sample range.
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\"/>\n",
            px, p_min, px, p_max, trace.line_color
        ));
        // Quartile box; y grows downward, so q3 maps above q1.
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"{}\" fill-opacity=\"0.7\" stroke=\"{}\"/>\n",
            px - BOX_HALF_WIDTH,
            p_q3,
            BOX_HALF_WIDTH * 2.0,
            (p_q1 - p_q3).max(0.5),
            trace.fill_color,
            trace.line_color
        ));
        // Median tick.
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" \
             stroke=\"{}\" stroke-width=\"2\"/>\n",
            px - BOX_HALF_WIDTH,
            p_med,
            px + BOX_HALF_WIDTH,
            p_med,
            trace.line_color
        ));
    }
}

fn render_trend(svg: &mut String, trace: &Trace, x_map: &AxisMapper, y_map: &AxisMapper) {
    if trace.xs.is_empty() {
        return;
    }

    let points: Vec<String> = trace
        .xs
        .iter()
        .zip(&trace.ys)
        .map(|(&x, &y)| format!("{:.1},{:.1}", x_map.pixel(x), y_map.pixel(y)))
        .collect();

    svg.push_str(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        points.join(" "),
        trace.line_color
    ));

    for (&x, &y) in trace.xs.iter().zip(&trace.ys) {
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2.5\" fill=\"{}\"/>\n",
            x_map.pixel(x),
            y_map.pixel(y),
            trace.line_color
        ));
    }
}

/// Write a figure to `path`, choosing the format from the file extension.
///
/// `.svg` writes the SVG document directly; `.png` rasterizes it (requires
/// the `raster` feature). Other extensions are rejected.
pub fn write_figure(fig: &Figure, path: impl AsRef<Path>) -> Result<(), ExperimentError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "svg" => {
            std::fs::write(path, fig.to_svg())?;
            Ok(())
        }
        #[cfg(feature = "raster")]
        "png" => write_png(fig, path),
        other => Err(ExperimentError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

#[cfg(feature = "raster")]
fn write_png(fig: &Figure, path: &Path) -> Result<(), ExperimentError> {
    use resvg::usvg::{Options, Tree};
    use tiny_skia::{Pixmap, Transform};

    let svg = fig.to_svg();

    let mut opt = Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = Tree::from_data(svg.as_bytes(), &opt)
        .map_err(|e| ExperimentError::Render(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ExperimentError::Render("zero-sized figure".to_string()))?;

    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .save_png(path)
        .map_err(|e| ExperimentError::Render(e.to_string()))?;
    Ok(())
}

/// Display a figure.
///
/// With no path, the SVG goes to a temp file that is opened in the platform
/// viewer. With a path, the image is written there (format by extension) and
/// then opened. Viewer spawn failures propagate as I/O errors.
pub fn show_figure(fig: &Figure, image_path: Option<&Path>) -> Result<(), ExperimentError> {
    match image_path {
        None => {
            let path = std::env::temp_dir().join("runlab-figure.svg");
            std::fs::write(&path, fig.to_svg())?;
            open_in_viewer(&path)
        }
        Some(path) => {
            write_figure(fig, path)?;
            open_in_viewer(path)
        }
    }
}

#[cfg(target_os = "macos")]
const VIEWER: &str = "open";
#[cfg(not(target_os = "macos"))]
const VIEWER: &str = "xdg-open";

fn open_in_viewer(path: &Path) -> Result<(), ExperimentError> {
    let _child = std::process::Command::new(VIEWER).arg(path).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{FigureOptions, PALETTE};
    use crate::result::MeasurementTable;

    fn sample_figure() -> Figure {
        let mut table = MeasurementTable::new();
        for (size, base) in [(10u64, 0.001f64), (100, 0.01), (1000, 0.1)] {
            for i in 0..4 {
                table.record("bubble_sort", size, base * (1.0 + 0.1 * i as f64));
                table.record("builtin_sort", size, base / 10.0 * (1.0 + 0.1 * i as f64));
            }
        }
        Figure::build(
            "Sorting running times",
            &FigureOptions::default(),
            &["bubble_sort", "builtin_sort"],
            &[10, 100, 1000],
            &table,
        )
    }

    #[test]
    fn should_interpolate_quantiles() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn should_group_samples_by_x_in_first_seen_order() {
        let trace = Trace {
            name: "alg".to_string(),
            kind: TraceKind::Distribution,
            xs: vec![100.0, 10.0, 100.0],
            ys: vec![0.2, 0.1, 0.4],
            line_color: PALETTE[0],
            fill_color: PALETTE[5],
            show_legend: false,
        };

        let groups = group_by_x(&trace);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], (100.0, vec![0.2, 0.4]));
        assert_eq!(groups[1], (10.0, vec![0.1]));
    }

    #[test]
    fn should_map_log_axis_ends_to_span_ends() {
        let map = AxisMapper::new(Scale::Log, &[1.0, 100.0], 0.0, 100.0, false);
        assert!((map.pixel(1.0) - 0.0).abs() < 1e-9);
        assert!((map.pixel(100.0) - 100.0).abs() < 1e-9);
        assert!((map.pixel(10.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn should_clamp_nonpositive_values_on_log_axis() {
        let map = AxisMapper::new(Scale::Log, &[1.0, 100.0], 0.0, 100.0, false);
        assert_eq!(map.pixel(0.0), 0.0);
        assert_eq!(map.pixel(-5.0), 0.0);
    }

    #[test]
    fn should_invert_y_axis_mapping() {
        let map = AxisMapper::new(Scale::Linear, &[0.0, 10.0], 0.0, 100.0, true);
        assert!((map.pixel(0.0) - 100.0).abs() < 1e-9);
        assert!((map.pixel(10.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn should_produce_decade_ticks_on_log_axis() {
        let map = AxisMapper::new(Scale::Log, &[0.5, 200.0], 0.0, 100.0, false);
        let labels: Vec<String> = map.ticks().into_iter().map(|(_, l)| l).collect();
        assert!(labels.contains(&"1e0".to_string()));
        assert!(labels.contains(&"1e2".to_string()));
    }

    #[test]
    fn should_emit_one_polyline_per_trend_trace() {
        let svg = sample_figure().to_svg();
        assert_eq!(svg.matches("<polyline").count(), 2);
        // One box glyph per (algorithm, size) pair.
        assert_eq!(svg.matches("fill-opacity=\"0.7\"").count(), 6);
    }

    #[test]
    fn should_include_titles_and_legend_labels() {
        let svg = sample_figure().to_svg();
        assert!(svg.contains("Sorting running times"));
        assert!(svg.contains("Input size: n [log scale]"));
        assert!(svg.contains("Running time (sec) [log scale]"));
        assert!(svg.contains("bubble_sort"));
        assert!(svg.contains("builtin_sort"));
    }

    #[test]
    fn should_escape_markup_in_labels() {
        let fig = Figure::build(
            "a < b & c",
            &FigureOptions::default(),
            &[],
            &[],
            &MeasurementTable::new(),
        );
        let svg = fig.to_svg();
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn should_render_valid_document_for_empty_figure() {
        let fig = Figure::build(
            "Empty",
            &FigureOptions::default(),
            &["alg"],
            &[10],
            &MeasurementTable::new(),
        );
        let svg = fig.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn should_write_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        write_figure(&sample_figure(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
    }

    #[test]
    fn should_reject_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.gif");

        match write_figure(&sample_figure(), &path) {
            Err(ExperimentError::UnsupportedFormat { extension }) => {
                assert_eq!(extension, "gif");
            }
            other => panic!("expected unsupported format, got {:?}", other),
        }
    }

    #[cfg(feature = "raster")]
    #[test]
    fn should_write_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        write_figure(&sample_figure(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
