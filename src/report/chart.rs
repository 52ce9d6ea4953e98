//! SVG plots of CMC and DET curves.
//!
//! Plots follow the light/dark scheme of the browser via CSS media queries.
//! DET curves use a logarithmic FPIR axis.

use std::fmt::Write as _;

use crate::eval::{CmcPoint, DetPoint};

/// Smallest FPIR drawn on a log axis. Lower values are clamped to it.
const LOG_FLOOR: f64 = 1e-6;

/// Axis and canvas setup for one plot.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    /// Plot title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Draw the X axis in log10 scale.
    pub log_x: bool,
    /// Stroke color of the curve.
    pub color: &'static str,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl PlotStyle {
    fn new(title: String, x_label: &str, y_label: &str, color: &'static str) -> Self {
        Self {
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            log_x: false,
            color,
            width: 640,
            height: 440,
        }
    }
}

/// Rank (x) against TPIR (y).
#[must_use]
pub fn cmc_svg(cmc: &[CmcPoint], engine_name: &str) -> String {
    let points: Vec<(f64, f64)> = cmc.iter().map(|p| (p.rank as f64, p.tpir)).collect();
    let style = PlotStyle::new(format!("CMC: {engine_name}"), "Rank", "TPIR", "#3498db");
    render(&points, &style)
}

/// FPIR (x, log scale) against FNIR (y).
#[must_use]
pub fn det_svg(det: &[DetPoint], engine_name: &str) -> String {
    let points: Vec<(f64, f64)> = det.iter().map(|p| (p.fpir, p.fnir)).collect();
    let mut style = PlotStyle::new(format!("DET: {engine_name}"), "FPIR", "FNIR", "#e74c3c");
    style.log_x = true;
    render(&points, &style)
}

/// Draw one curve. Returns an empty string when there is nothing to draw.
#[must_use]
pub fn render(points: &[(f64, f64)], style: &PlotStyle) -> String {
    if points.is_empty() {
        return String::new();
    }

    let to_x = |x: f64| {
        if style.log_x {
            x.max(LOG_FLOOR).log10()
        } else {
            x
        }
    };
    let (min_x, max_x) = span(points.iter().map(|&(x, _)| to_x(x)));
    let (min_y, max_y) = (0.0, 1.0);

    let (width, height) = (style.width, style.height);
    let (left, right, top, bottom) = (80u32, 30u32, 50u32, 60u32);
    let plot_w = f64::from(width - left - right);
    let plot_h = f64::from(height - top - bottom);

    let sx = |x: f64| f64::from(left) + (to_x(x) - min_x) / (max_x - min_x) * plot_w;
    let sy = |y: f64| f64::from(top) + (1.0 - (y - min_y) / (max_y - min_y)) * plot_h;

    let mut svg = String::with_capacity(4096 + points.len() * 16);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}">"#
    );
    svg.push_str(
        r#"<style>
  :root { --bg: #ffffff; --fg: #1a1a1a; --grid: #e0e0e0; }
  @media (prefers-color-scheme: dark) {
    :root { --bg: #1a1a1a; --fg: #e0e0e0; --grid: #404040; }
  }
  .bg { fill: var(--bg); }
  .title { font: bold 16px system-ui, sans-serif; fill: var(--fg); }
  .label { font: 13px system-ui, sans-serif; fill: var(--fg); }
  .tick { font: 11px system-ui, sans-serif; fill: var(--fg); }
  .grid { stroke: var(--grid); stroke-width: 1; }
  .axis { stroke: var(--fg); stroke-width: 1.5; }
</style>
"#,
    );
    let _ = writeln!(svg, r#"<rect class="bg" width="{width}" height="{height}"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" class="title">{}</text>"#,
        f64::from(width) / 2.0,
        escape(&style.title)
    );

    let x_end = width - right;
    let y_end = height - bottom;
    for i in 0..=4 {
        let frac = f64::from(i) / 4.0;
        let y_val = min_y + frac * (max_y - min_y);
        let y = sy(y_val);
        let _ = writeln!(
            svg,
            r#"<line x1="{left}" y1="{y:.2}" x2="{x_end}" y2="{y:.2}" class="grid"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" class="tick">{y_val:.2}</text>"#,
            left - 8,
            y + 4.0
        );

        let axis_val = min_x + frac * (max_x - min_x);
        let x = f64::from(left) + frac * plot_w;
        let tick = if style.log_x {
            format!("{:.0e}", 10f64.powf(axis_val))
        } else {
            format!("{axis_val:.0}")
        };
        let _ = writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{top}" x2="{x:.2}" y2="{y_end}" class="grid"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x:.2}" y="{}" text-anchor="middle" class="tick">{tick}</text>"#,
            y_end + 18
        );
    }
    let _ = writeln!(
        svg,
        r#"<line x1="{left}" y1="{y_end}" x2="{x_end}" y2="{y_end}" class="axis"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{left}" y1="{top}" x2="{left}" y2="{y_end}" class="axis"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="label">{}</text>"#,
        f64::from(left) + plot_w / 2.0,
        height - 15,
        escape(&style.x_label)
    );
    let mid_y = f64::from(top) + plot_h / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="25" y="{mid_y:.2}" text-anchor="middle" class="label" transform="rotate(-90 25 {mid_y:.2})">{}</text>"#,
        escape(&style.y_label)
    );

    let mut path = String::with_capacity(points.len() * 16);
    for (i, &(x, y)) in points.iter().enumerate() {
        let op = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{op}{:.2},{:.2}", sx(x), sy(y.clamp(min_y, max_y)));
    }
    let _ = writeln!(
        svg,
        r#"<path d="{path}" stroke="{}" stroke-width="2" fill="none"/>"#,
        style.color
    );

    svg.push_str("</svg>\n");
    svg
}

/// Min and max of `values`, widened when they coincide.
fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if max - min < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
