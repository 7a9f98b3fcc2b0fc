use std::fmt::{self, Write as _};
use std::io::Write;

use benchlog_core::{Chart, ChartRenderer};

// Layout constants
const WIDTH: f64 = 760.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 230.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICKS: usize = 5;
const MARKER_SIZE: f64 = 4.0;
const LEGEND_ROW: f64 = 18.0;

const COLORS: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];

#[derive(Clone, Copy)]
enum Marker {
    Circle,
    Square,
    Cross,
    Plus,
    Triangle,
}

const MARKERS: &[Marker] = &[
    Marker::Circle,
    Marker::Square,
    Marker::Plus,
    Marker::Cross,
    Marker::Triangle,
];

impl Marker {
    fn draw(self, svg: &mut String, x: f64, y: f64, color: &str) -> fmt::Result {
        let s = MARKER_SIZE;
        match self {
            Marker::Circle => writeln!(svg, r#"    <circle cx="{x:.1}" cy="{y:.1}" r="{s}" fill="{color}"/>"#),
            Marker::Square => writeln!(
                svg,
                r#"    <rect x="{:.1}" y="{:.1}" width="{}" height="{}" fill="{color}"/>"#,
                x - s,
                y - s,
                2.0 * s,
                2.0 * s
            ),
            Marker::Plus => writeln!(
                svg,
                r#"    <path d="M{:.1},{y:.1}H{:.1}M{x:.1},{:.1}V{:.1}" stroke="{color}" stroke-width="1.5"/>"#,
                x - s,
                x + s,
                y - s,
                y + s
            ),
            Marker::Cross => writeln!(
                svg,
                r#"    <path d="M{:.1},{:.1}L{:.1},{:.1}M{:.1},{:.1}L{:.1},{:.1}" stroke="{color}" stroke-width="1.5"/>"#,
                x - s,
                y - s,
                x + s,
                y + s,
                x - s,
                y + s,
                x + s,
                y - s
            ),
            Marker::Triangle => writeln!(
                svg,
                r#"    <path d="M{x:.1},{:.1}L{:.1},{:.1}L{:.1},{:.1}Z" fill="{color}"/>"#,
                y - s,
                x + s,
                y + s,
                x - s,
                y + s
            ),
        }
    }
}

/// Self-contained SVG line chart: one polyline with markers per series,
/// axes with evenly spaced ticks, and a legend on the right.
///
/// Points above a fixed `y_max` are clipped to the plot area.
pub struct SvgChartRenderer;

fn escape(v: &str) -> String {
    v.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Data range of one axis mapped onto a pixel range.
struct Axis {
    min: f64,
    max: f64,
    px_start: f64,
    px_end: f64,
}

impl Axis {
    fn new(min: f64, max: f64, px_start: f64, px_end: f64) -> Self {
        // a flat range would divide by zero
        let (min, max) = if max > min { (min, max) } else { (min - 1.0, max + 1.0) };
        Self {
            min,
            max,
            px_start,
            px_end,
        }
    }

    fn to_px(&self, v: f64) -> f64 {
        self.px_start + (v - self.min) / (self.max - self.min) * (self.px_end - self.px_start)
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let step = (self.max - self.min) / TICKS as f64;
        (0..=TICKS).map(move |i| self.min + step * i as f64)
    }
}

fn tick_label(v: f64, span: f64) -> String {
    if span >= TICKS as f64 * 2.0 {
        format!("{v:.0}")
    } else if span >= TICKS as f64 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

impl SvgChartRenderer {
    pub fn render_to_string(&self, chart: &Chart) -> String {
        let mut svg = String::new();
        // writing into a String cannot fail
        let _ = self.write_svg(chart, &mut svg);
        svg
    }

    fn write_svg(&self, chart: &Chart, svg: &mut String) -> fmt::Result {
        let plot_left = MARGIN_LEFT;
        let plot_right = WIDTH - MARGIN_RIGHT;
        let plot_top = MARGIN_TOP;
        let plot_bottom = HEIGHT - MARGIN_BOTTOM;

        let points = || chart.series.iter().flat_map(|s| s.points.iter());
        let x_min = points().map(|&(x, _)| x).min().unwrap_or(0) as f64;
        let x_max = points().map(|&(x, _)| x).max().unwrap_or(1) as f64;
        let y_max = chart.y_max.unwrap_or_else(|| {
            let top = points().map(|&(_, y)| y).fold(0.0, f64::max);
            if top > 0.0 {
                top * 1.1
            } else {
                1.0
            }
        });

        let xa = Axis::new(x_min, x_max, plot_left, plot_right);
        let ya = Axis::new(0.0, y_max, plot_bottom, plot_top);

        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" font-family="sans-serif" font-size="11">
  <rect width="100%" height="100%" fill="white"/>
  <defs>
    <clipPath id="plot-area"><rect x="{plot_left}" y="{plot_top}" width="{}" height="{}"/></clipPath>
  </defs>
  <text x="{}" y="{}" text-anchor="middle" font-size="14" font-weight="bold">{}</text>"#,
            plot_right - plot_left,
            plot_bottom - plot_top,
            (plot_left + plot_right) / 2.0,
            MARGIN_TOP / 2.0 + 5.0,
            escape(&chart.title)
        )?;

        // Axes and grid
        writeln!(svg, r##"  <g stroke="#333" stroke-width="1">"##)?;
        writeln!(
            svg,
            r#"    <line x1="{plot_left}" y1="{plot_bottom}" x2="{plot_right}" y2="{plot_bottom}"/>"#
        )?;
        writeln!(
            svg,
            r#"    <line x1="{plot_left}" y1="{plot_top}" x2="{plot_left}" y2="{plot_bottom}"/>"#
        )?;
        writeln!(svg, "  </g>")?;

        writeln!(svg, r#"  <g class="ticks">"#)?;
        for v in xa.ticks() {
            let px = xa.to_px(v);
            writeln!(
                svg,
                r##"    <line x1="{px:.1}" y1="{plot_bottom}" x2="{px:.1}" y2="{}" stroke="#333"/>"##,
                plot_bottom + 5.0
            )?;
            writeln!(
                svg,
                r#"    <text x="{px:.1}" y="{}" text-anchor="middle">{}</text>"#,
                plot_bottom + 18.0,
                tick_label(v, xa.max - xa.min)
            )?;
        }
        for v in ya.ticks() {
            let py = ya.to_px(v);
            writeln!(
                svg,
                r##"    <line x1="{plot_left}" y1="{py:.1}" x2="{plot_right}" y2="{py:.1}" stroke="#e0e0e0"/>"##
            )?;
            writeln!(
                svg,
                r#"    <text x="{}" y="{:.1}" text-anchor="end">{}</text>"#,
                plot_left - 8.0,
                py + 4.0,
                tick_label(v, ya.max - ya.min)
            )?;
        }
        writeln!(svg, "  </g>")?;

        writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="middle">{}</text>"#,
            (plot_left + plot_right) / 2.0,
            HEIGHT - 15.0,
            escape(&chart.x_label)
        )?;
        writeln!(
            svg,
            r#"  <text x="18" y="{0}" text-anchor="middle" transform="rotate(-90 18 {0})">{1}</text>"#,
            (plot_top + plot_bottom) / 2.0,
            escape(&chart.y_label)
        )?;

        // Series
        writeln!(svg, r#"  <g clip-path="url(#plot-area)">"#)?;
        for (i, series) in chart.series.iter().enumerate() {
            let color = COLORS[i % COLORS.len()];
            let marker = MARKERS[i % MARKERS.len()];
            let coords: Vec<(f64, f64)> = series
                .points
                .iter()
                .map(|&(x, y)| (xa.to_px(x as f64), ya.to_px(y)))
                .collect();
            let path: Vec<String> = coords.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
            writeln!(
                svg,
                r#"    <polyline points="{}" fill="none" stroke="{color}" stroke-width="1.5"/>"#,
                path.join(" ")
            )?;
            for &(x, y) in &coords {
                marker.draw(svg, x, y, color)?;
            }
        }
        writeln!(svg, "  </g>")?;

        // Legend
        let legend_x = plot_right + 20.0;
        writeln!(svg, r#"  <g class="legend" font-size="10">"#)?;
        for (i, series) in chart.series.iter().enumerate() {
            let color = COLORS[i % COLORS.len()];
            let y = plot_top + 10.0 + i as f64 * LEGEND_ROW;
            writeln!(
                svg,
                r#"    <line x1="{legend_x}" y1="{y}" x2="{}" y2="{y}" stroke="{color}" stroke-width="1.5"/>"#,
                legend_x + 24.0
            )?;
            MARKERS[i % MARKERS.len()].draw(svg, legend_x + 12.0, y, color)?;
            writeln!(
                svg,
                r#"    <text x="{}" y="{}">{}</text>"#,
                legend_x + 32.0,
                y + 4.0,
                escape(&series.label)
            )?;
        }
        writeln!(svg, "  </g>")?;
        svg.push_str("</svg>\n");
        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render_chart(&self, chart: &Chart, out: &mut dyn Write) -> anyhow::Result<()> {
        out.write_all(self.render_to_string(chart).as_bytes())?;
        Ok(())
    }
}
