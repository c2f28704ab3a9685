//! PNG export of a [`Figure`].
//!
//! The chart is laid out with plotters on an SVG canvas measured in half
//! points, rasterised with resvg at the requested DPI, cropped to its drawn
//! content and encoded as PNG.
//!
//! ```text
//!  Figure ──plotters──▶ SVG ──resvg──▶ RGBA ──crop──▶ PNG bytes
//! ```

use std::io::Cursor;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

use crate::color::SeriesStyle;
use crate::config::PlotterConfig;
use crate::figure::{policy, Figure};

/// SVG canvas units per typographic point. Plotters takes integer stroke
/// widths, so half-point resolution is needed for 1.5 pt lines.
const UNITS_PER_PT: f64 = 2.0;
const PT_PER_IN: f64 = 72.0;
/// Plotters' SVG backend writes `font-size` as the requested size / 1.24.
const SVG_FONT_SCALE: f64 = 1.24;
/// Gap between a tick label and its spine.
const LABEL_PAD_PT: f64 = 3.5;
const Y_TICK_COUNT: usize = 6;

/// Generic family written into the SVG; resolved by [`font_database`].
const FONT_FAMILY: &str = "sans-serif";
const SANS_CANDIDATES: [&str; 5] = [
    "DejaVu Sans",
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "Noto Sans",
];

const LEGEND_FRAME: RGBColor = RGBColor(204, 204, 204);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no series were plotted")]
    NoSeries,
    #[error("drawing chart: {0}")]
    Chart(String),
    #[error("reading rendered SVG: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} px canvas")]
    Raster { width: u32, height: u32 },
    #[error("encoding PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub dpi: u32,
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    /// Padding kept around the content when cropping ("tight" bounding box).
    pub tight_pad_in: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions::from(&PlotterConfig::default())
    }
}

impl From<&PlotterConfig> for ExportOptions {
    fn from(cfg: &PlotterConfig) -> Self {
        ExportOptions {
            dpi: cfg.export_dpi,
            figure_width_in: cfg.figure_width_in,
            figure_height_in: cfg.figure_height_in,
            tight_pad_in: cfg.tight_pad_in,
        }
    }
}

impl ExportOptions {
    pub fn with_dpi(self, dpi: u32) -> Self {
        ExportOptions { dpi, ..self }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn units(points: f64) -> f64 {
    points * UNITS_PER_PT
}

fn stroke(points: f64) -> u32 {
    units(points).round().max(1.0) as u32
}

/// Legend box geometry, in canvas units. Spacing follows the usual
/// matplotlib defaults, in multiples of the font size.
#[derive(Debug, Clone, Copy)]
struct LegendLayout {
    border_axes_pad: i32,
    pad: i32,
    handle_len: i32,
    handle_pad: i32,
    row_pitch: i32,
    width: i32,
    height: i32,
}

impl LegendLayout {
    fn new(figure: &Figure, font: f64) -> Self {
        let pad = 0.4 * font;
        let handle_len = 2.0 * font;
        let handle_pad = 0.8 * font;
        let spacing = 0.5 * font;
        let longest = figure
            .series
            .iter()
            .map(|s| s.style.label.chars().count())
            .max()
            .unwrap_or(0);
        // bold sans glyphs average a bit over half an em
        let text_w = longest as f64 * 0.62 * font;
        let rows = figure.series.len() as f64;

        LegendLayout {
            border_axes_pad: (0.5 * font).round() as i32,
            pad: pad.round() as i32,
            handle_len: handle_len.round() as i32,
            handle_pad: handle_pad.round() as i32,
            row_pitch: (font + spacing).round() as i32,
            width: (2.0 * pad + handle_len + handle_pad + text_w).ceil() as i32,
            height: (2.0 * pad + rows * font + (rows - 1.0).max(0.0) * spacing).ceil() as i32,
        }
    }
}

/// Canvas geometry for one figure.
#[derive(Debug, Clone, Copy)]
struct Layout {
    fig_w: i32,
    fig_h: i32,
    canvas_w: i32,
    canvas_h: i32,
    margin_top: i32,
    margin_right: i32,
    x_label_area: i32,
    y_label_area: i32,
    font: f64,
    line_width: u32,
    legend_line_width: u32,
    spine_width: u32,
    tick_width: u32,
    tick_len: i32,
    label_pad: i32,
    legend: LegendLayout,
}

impl Layout {
    fn new(figure: &Figure, options: &ExportOptions) -> Self {
        let fig_w = units(options.figure_width_in * PT_PER_IN).round() as i32;
        let fig_h = units(options.figure_height_in * PT_PER_IN).round() as i32;
        let font = units(policy::FONT_SIZE);
        let legend = LegendLayout::new(figure, font);

        // Axes box at the default subplot fractions of the figure.
        let margin_right = (0.10 * fig_w as f64).round() as i32;
        let margin_top = (0.12 * fig_h as f64).round() as i32;
        let plot_right = fig_w - margin_right;
        let legend_right = plot_right + legend.border_axes_pad + legend.width + font as i32;
        // the legend hangs from the top of the axes
        let legend_bottom = margin_top + legend.height + font as i32;

        Layout {
            fig_w,
            fig_h,
            canvas_w: fig_w.max(legend_right),
            canvas_h: fig_h.max(legend_bottom),
            margin_top,
            margin_right,
            x_label_area: (0.11 * fig_h as f64).round() as i32,
            y_label_area: (0.125 * fig_w as f64).round() as i32,
            font,
            line_width: stroke(policy::LINE_WIDTH),
            legend_line_width: stroke(policy::LEGEND_LINE_WIDTH),
            spine_width: stroke(policy::SPINE_WIDTH),
            tick_width: stroke(policy::TICK_WIDTH),
            tick_len: units(policy::TICK_LENGTH).round() as i32,
            label_pad: units(LABEL_PAD_PT).round() as i32,
            legend,
        }
    }

    fn bold_font(&self) -> FontDesc<'static> {
        (FONT_FAMILY, self.font * SVG_FONT_SCALE)
            .into_font()
            .style(FontStyle::Bold)
    }
}

/// Decimal places for y tick labels, from the size of a typical tick step.
fn tick_decimals(lo: f64, hi: f64) -> usize {
    let step = (hi - lo) / 5.0;
    if !(step.is_finite() && step > 0.0) {
        return 1;
    }
    (-step.log10().floor()).clamp(0.0, 6.0) as usize
}

/// Tick positions plotters picks for a range; the mesh labels use the same.
fn tick_values(range: Range<f64>, count: usize) -> Vec<f64> {
    RangedCoordf64::from(range).key_points(count)
}

fn rgb(style: &SeriesStyle) -> RGBColor {
    RGBColor(style.color.red, style.color.green, style.color.blue)
}

/// Part of the segment `a -> b` with `lo <= x <= hi`, if any.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (lo, hi): (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = b.0 - a.0;
    let (t0, t1) = if dx == 0.0 {
        if a.0 < lo || a.0 > hi {
            return None;
        }
        (0.0, 1.0)
    } else {
        let (enter, exit) = if dx > 0.0 {
            ((lo - a.0) / dx, (hi - a.0) / dx)
        } else {
            ((hi - a.0) / dx, (lo - a.0) / dx)
        };
        (enter.max(0.0), exit.min(1.0))
    };
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            (a.0 + t * dx, a.1 + t * (b.1 - a.1))
        }
    };
    Some((at(t0), at(t1)))
}

/// Split a polyline into the runs that lie inside the x window, cutting
/// segments at the window edges. Non-finite points end a run.
fn clip_to_x_range(
    points: impl IntoIterator<Item = (f64, f64)>,
    window: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    fn flush(runs: &mut Vec<Vec<(f64, f64)>>, run: &mut Vec<(f64, f64)>) {
        if run.len() >= 2 {
            runs.push(std::mem::take(run));
        } else {
            run.clear();
        }
    }

    let mut runs = Vec::new();
    let mut run = Vec::new();
    let mut prev: Option<(f64, f64)> = None;
    for p in points {
        if !(p.0.is_finite() && p.1.is_finite()) {
            flush(&mut runs, &mut run);
            prev = None;
            continue;
        }
        if let Some(a) = prev {
            match clip_segment(a, p, window) {
                Some((start, end)) => {
                    if run.last() != Some(&start) {
                        flush(&mut runs, &mut run);
                        run.push(start);
                    }
                    run.push(end);
                }
                None => flush(&mut runs, &mut run),
            }
        }
        prev = Some(p);
    }
    flush(&mut runs, &mut run);
    runs
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    layout: &Layout,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;
    let (fig_area, _legend_area) = root.split_horizontally(layout.fig_w);
    let (fig_area, _) = fig_area.split_vertically(layout.fig_h);

    let (y_lo, y_hi) = figure.y_range();
    let decimals = tick_decimals(y_lo, y_hi);

    let mut chart = ChartBuilder::on(&fig_area)
        .margin_top(layout.margin_top)
        .margin_right(layout.margin_right)
        .x_label_area_size(layout.x_label_area)
        .y_label_area_size(layout.y_label_area)
        .build_cartesian_2d(policy::X_MIN..policy::X_MAX, y_lo..y_hi)?;

    // Labels only: the mesh's own axis lines sit on the far edge of the label
    // areas, so they are hidden and the spines and ticks are drawn below. The
    // tick size just sets the label gap (twice its value).
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(policy::X_TICKS.len())
        .y_labels(Y_TICK_COUNT)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.decimals$}"))
        .label_style(layout.bold_font().color(&BLACK))
        .axis_desc_style(layout.bold_font().color(&BLACK))
        .x_desc(figure.x_label())
        .y_desc(figure.y_label())
        .axis_style(TRANSPARENT)
        .set_all_tick_mark_size(layout.label_pad / 2)
        .draw()?;

    for series in &figure.series {
        let style = rgb(&series.style)
            .mix(policy::LINE_OPACITY)
            .stroke_width(layout.line_width);
        for run in clip_to_x_range(series.points(), (policy::X_MIN, policy::X_MAX)) {
            chart.draw_series(LineSeries::new(run, style))?;
        }
    }

    let (left, bottom) = chart.backend_coord(&(policy::X_MIN, y_lo));
    let (right, top) = chart.backend_coord(&(policy::X_MAX, y_hi));

    let spine = BLACK.stroke_width(layout.spine_width);
    for edge in [
        [(left, top), (right, top)],
        [(right, top), (right, bottom)],
        [(right, bottom), (left, bottom)],
        [(left, bottom), (left, top)],
    ] {
        root.draw(&PathElement::new(edge.to_vec(), spine))?;
    }

    // major ticks, pointing into the axes
    let tick = BLACK.stroke_width(layout.tick_width);
    for x in tick_values(policy::X_MIN..policy::X_MAX, policy::X_TICKS.len()) {
        let (px, _) = chart.backend_coord(&(x, y_lo));
        root.draw(&PathElement::new(
            vec![(px, bottom), (px, bottom - layout.tick_len)],
            tick,
        ))?;
    }
    for y in tick_values(y_lo..y_hi, Y_TICK_COUNT) {
        let (_, py) = chart.backend_coord(&(policy::X_MIN, y));
        root.draw(&PathElement::new(
            vec![(left, py), (left + layout.tick_len, py)],
            tick,
        ))?;
    }

    draw_legend(
        root,
        figure,
        layout,
        (right + layout.legend.border_axes_pad, top),
    )
}

/// Legend anchored top-left just outside the axes' right edge.
fn draw_legend<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    layout: &Layout,
    (left, top): (i32, i32),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let lg = &layout.legend;
    let (right, bottom) = (left + lg.width, top + lg.height);
    root.draw(&Rectangle::new([(left, top), (right, bottom)], WHITE.filled()))?;
    root.draw(&PathElement::new(
        vec![(left, top), (right, top), (right, bottom), (left, bottom), (left, top)],
        LEGEND_FRAME.stroke_width(2),
    ))?;

    let text_style = layout
        .bold_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let half_font = (layout.font / 2.0).round() as i32;

    for (row, series) in figure.series.iter().enumerate() {
        let cy = top + lg.pad + row as i32 * lg.row_pitch + half_font;
        let x0 = left + lg.pad;
        let x1 = x0 + lg.handle_len;
        root.draw(&PathElement::new(
            vec![(x0, cy), (x1, cy)],
            rgb(&series.style).stroke_width(layout.legend_line_width),
        ))?;
        root.draw(&Text::new(
            series.style.label.clone(),
            (x1 + lg.handle_pad, cy),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Lay the figure out as an SVG document (canvas units are half points).
pub fn render_svg(figure: &Figure, options: &ExportOptions) -> Result<String, ExportError> {
    if figure.is_empty() {
        return Err(ExportError::NoSeries);
    }
    let layout = Layout::new(figure, options);
    log::debug!(
        "export layout: figure {}x{}, canvas {}x{}",
        layout.fig_w,
        layout.fig_h,
        layout.canvas_w,
        layout.canvas_h
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(
            &mut svg,
            (layout.canvas_w as u32, layout.canvas_h as u32),
        )
        .into_drawing_area();
        draw_chart(&root, figure, &layout).map_err(|e| ExportError::Chart(e.to_string()))?;
        root.present()
            .map_err(|e| ExportError::Chart(e.to_string()))?;
    }
    Ok(svg)
}

/// System fonts, loaded once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            let sans = SANS_CANDIDATES.into_iter().find(|name| {
                db.faces()
                    .any(|face| face.families.iter().any(|(family, _)| family == name))
            });
            match sans {
                Some(name) => db.set_sans_serif_family(name),
                None => log::warn!("no known sans-serif font found; exported text may be missing"),
            }
            log::debug!("loaded {} font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Rasterise an SVG produced by [`render_svg`] onto a white background.
pub fn rasterize(svg: &str, dpi: u32) -> Result<RgbaImage, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = font_database();
    let tree = usvg::Tree::from_str(svg, &opt)?;

    let scale = (dpi as f64 / (PT_PER_IN * UNITS_PER_PT)) as f32;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Raster { width, height })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // Opaque background, so premultiplied RGBA equals straight RGBA.
    RgbaImage::from_raw(width, height, pixmap.take()).ok_or(ExportError::Raster { width, height })
}

/// Crop to the bounding box of non-white pixels, keeping `pad` pixels of
/// margin where the canvas allows, straight into an RGB buffer. A blank image
/// is kept whole.
pub fn crop_to_content(img: &RgbaImage, pad: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in img.enumerate_pixels() {
        if p.0 == [255, 255, 255, 255] {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let (left, top, right, bottom) = match bounds {
        Some((x0, y0, x1, y1)) => (
            x0.saturating_sub(pad),
            y0.saturating_sub(pad),
            (x1 + 1).saturating_add(pad).min(w),
            (y1 + 1).saturating_add(pad).min(h),
        ),
        None => (0, 0, w, h),
    };
    RgbImage::from_fn(right - left, bottom - top, |x, y| {
        let [r, g, b, _] = img.get_pixel(left + x, top + y).0;
        Rgb([r, g, b])
    })
}

fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Render the figure to PNG bytes with a tight bounding box.
pub fn render_png(figure: &Figure, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let svg = render_svg(figure, options)?;
    let full = rasterize(&svg, options.dpi)?;
    let pad = (options.tight_pad_in * options.dpi as f64).round() as u32;
    let cropped = crop_to_content(&full, pad);
    log::info!(
        "rendered {} series at {} dpi: {}x{} px (canvas {}x{})",
        figure.series.len(),
        options.dpi,
        cropped.width(),
        cropped.height(),
        full.width(),
        full.height()
    );
    drop(full);
    encode_png(&cropped)
}

/// Render and write the PNG to `path`.
pub fn save_png(figure: &Figure, options: &ExportOptions, path: &Path) -> Result<(), ExportError> {
    let bytes = render_png(figure, options)?;
    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_text;
    use crate::units::UnitChoice;
    use image::Rgba;

    fn figure_of(unit: UnitChoice, texts: &[&str]) -> Figure {
        let mut fig = Figure::new(unit);
        for (i, text) in texts.iter().enumerate() {
            fig.add_series(i, format!("f{i}.xvg"), parse_text(text).unwrap())
                .unwrap();
        }
        fig
    }

    fn two_series(unit: UnitChoice) -> Figure {
        figure_of(unit, &["0 1.0\n100 2.0\n250 1.5\n", "0 5.0\n100 6.0\n250 5.5\n"])
    }

    fn svg_of(fig: &Figure) -> String {
        render_svg(fig, &ExportOptions::default()).unwrap()
    }

    // -- minimal readers for the SVG plotters writes (one element per line) --

    fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
        let key = format!(" {name}=\"");
        let start = tag.find(&key)? + key.len();
        let len = tag[start..].find('"')?;
        Some(&tag[start..start + len])
    }

    #[derive(Debug)]
    struct Polyline {
        stroke: String,
        width: u32,
        points: Vec<(i32, i32)>,
    }

    impl Polyline {
        fn span(&self) -> i32 {
            let (a, b) = (self.points[0], self.points[self.points.len() - 1]);
            (a.0 - b.0).abs() + (a.1 - b.1).abs()
        }
    }

    fn polylines(svg: &str) -> Vec<Polyline> {
        svg.lines()
            .filter(|l| l.trim_start().starts_with("<polyline"))
            .map(|l| Polyline {
                stroke: attr(l, "stroke").unwrap().to_ascii_uppercase(),
                width: attr(l, "stroke-width").unwrap().parse().unwrap(),
                points: attr(l, "points")
                    .unwrap()
                    .split_whitespace()
                    .map(|p| {
                        let (x, y) = p.split_once(',').unwrap();
                        (x.parse().unwrap(), y.parse().unwrap())
                    })
                    .collect(),
            })
            .collect()
    }

    #[derive(Debug)]
    struct SvgText {
        label: String,
        x: f64,
        y: f64,
        font_size: f64,
    }

    fn texts(svg: &str) -> Vec<SvgText> {
        let lines: Vec<&str> = svg.lines().collect();
        lines
            .windows(2)
            .filter(|w| w[0].trim_start().starts_with("<text"))
            .map(|w| SvgText {
                label: w[1].trim().to_string(),
                x: attr(w[0], "x").unwrap().parse().unwrap(),
                y: attr(w[0], "y").unwrap().parse().unwrap(),
                font_size: attr(w[0], "font-size").unwrap().parse().unwrap(),
            })
            .collect()
    }

    /// `(left, top, right, bottom)` of the axes box, from the four spines.
    fn axes_box(lines: &[Polyline], tick_len: i32) -> (i32, i32, i32, i32) {
        let spines: Vec<&Polyline> = lines
            .iter()
            .filter(|l| l.stroke == "#000000" && l.span() > tick_len)
            .collect();
        assert_eq!(spines.len(), 4, "{spines:?}");
        let pts = spines.iter().flat_map(|l| l.points.iter().copied());
        pts.fold((i32::MAX, i32::MAX, i32::MIN, i32::MIN), |(l, t, r, b), (x, y)| {
            (l.min(x), t.min(y), r.max(x), b.max(y))
        })
    }

    #[test]
    fn empty_figure_is_not_rendered() {
        let fig = Figure::new(UnitChoice::Angstrom);
        assert!(matches!(
            render_png(&fig, &ExportOptions::default()),
            Err(ExportError::NoSeries)
        ));
    }

    #[test]
    fn svg_contains_labels_and_legend() {
        let svg = svg_of(&two_series(UnitChoice::Nanometer));
        let labels: Vec<String> = texts(&svg).into_iter().map(|t| t.label).collect();
        for expected in ["Time (ns)", "RMSD (nm)", "Dataset 1", "Dataset 2", "0", "250"] {
            assert!(labels.iter().any(|l| l == expected), "{expected} missing");
        }
    }

    #[test]
    fn x_ticks_are_every_fifty_ns() {
        let ticks = tick_values(policy::X_MIN..policy::X_MAX, policy::X_TICKS.len());
        assert_eq!(ticks.len(), policy::X_TICKS.len());
        for (got, want) in ticks.iter().zip(policy::X_TICKS) {
            assert!((got - want).abs() < 1e-9, "{ticks:?}");
        }
    }

    #[test]
    fn spines_and_ticks_are_black_and_one_and_a_half_points() {
        let fig = two_series(UnitChoice::Angstrom);
        let layout = Layout::new(&fig, &ExportOptions::default());
        let lines = polylines(&svg_of(&fig));
        let black: Vec<&Polyline> = lines.iter().filter(|l| l.stroke == "#000000").collect();
        assert!(!black.is_empty());
        for line in &black {
            assert_eq!(line.width, stroke(policy::SPINE_WIDTH), "{line:?}");
        }
        axes_box(&lines, layout.tick_len);
    }

    #[test]
    fn ticks_point_into_the_axes() {
        let fig = two_series(UnitChoice::Angstrom);
        let layout = Layout::new(&fig, &ExportOptions::default());
        let lines = polylines(&svg_of(&fig));
        let (left, top, right, bottom) = axes_box(&lines, layout.tick_len);

        let ticks: Vec<&Polyline> = lines
            .iter()
            .filter(|l| l.stroke == "#000000" && l.span() <= layout.tick_len)
            .collect();
        let (mut x_ticks, mut y_ticks) = (0, 0);
        for tick in &ticks {
            assert_eq!(tick.span(), layout.tick_len, "{tick:?}");
            let (a, b) = (tick.points[0], tick.points[1]);
            if a.0 == b.0 {
                assert_eq!((a.1, b.1), (bottom, bottom - layout.tick_len));
                assert!((left..=right).contains(&a.0));
                x_ticks += 1;
            } else {
                assert_eq!((a.0, b.0), (left, left + layout.tick_len));
                assert!((top..=bottom).contains(&a.1));
                y_ticks += 1;
            }
        }
        assert_eq!(x_ticks, policy::X_TICKS.len());
        assert!(y_ticks >= 2);

        // nothing black is drawn outside the axes box
        for line in lines.iter().filter(|l| l.stroke == "#000000") {
            for &(x, y) in &line.points {
                assert!((left..=right).contains(&x) && (top..=bottom).contains(&y));
            }
        }
    }

    #[test]
    fn text_is_fourteen_points() {
        let svg = svg_of(&two_series(UnitChoice::Angstrom));
        let texts = texts(&svg);
        assert!(texts.len() > 4);
        for text in texts {
            // canvas units are half points
            assert!((text.font_size - 28.0).abs() < 1e-6, "{text:?}");
        }
    }

    #[test]
    fn legend_is_right_of_the_axes_in_upload_order() {
        let fig = two_series(UnitChoice::Angstrom);
        let layout = Layout::new(&fig, &ExportOptions::default());
        let svg = svg_of(&fig);
        let (_, top, right, _) = axes_box(&polylines(&svg), layout.tick_len);

        let entries: Vec<SvgText> = texts(&svg)
            .into_iter()
            .filter(|t| t.label.starts_with("Dataset"))
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Dataset 1");
        assert!(entries[0].y < entries[1].y);
        for entry in &entries {
            assert!(entry.x > right as f64 && entry.y > top as f64, "{entry:?}");
        }

        let swatches = polylines(&svg)
            .into_iter()
            .filter(|l| l.width == stroke(policy::LEGEND_LINE_WIDTH))
            .count();
        assert_eq!(swatches, 2);
    }

    #[test]
    fn long_legend_grows_the_canvas() {
        let texts_in: Vec<String> = (0..25).map(|i| format!("0 {i}\n250 {i}.5\n")).collect();
        let refs: Vec<&str> = texts_in.iter().map(String::as_str).collect();
        let fig = figure_of(UnitChoice::Angstrom, &refs);
        let layout = Layout::new(&fig, &ExportOptions::default());
        assert!(layout.canvas_h > layout.fig_h);

        let svg = svg_of(&fig);
        let height: f64 = attr(svg.lines().next().unwrap(), "height")
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(height, layout.canvas_h as f64);

        let ys: Vec<f64> = texts(&svg)
            .into_iter()
            .filter(|t| t.label.starts_with("Dataset"))
            .map(|t| t.y)
            .collect();
        assert_eq!(ys.len(), 25);
        assert!(ys.windows(2).all(|w| w[0] < w[1]), "{ys:?}");
        assert!(ys.iter().all(|&y| y < height));
    }

    #[test]
    fn data_past_the_time_window_is_cut_at_the_edge() {
        let fig = figure_of(UnitChoice::Angstrom, &["0 1\n500 2\n1000 1.5\n"]);
        let layout = Layout::new(&fig, &ExportOptions::default());
        let lines = polylines(&svg_of(&fig));
        let (_, _, right, _) = axes_box(&lines, layout.tick_len);

        let data: Vec<&Polyline> = lines
            .iter()
            .filter(|l| l.stroke == "#FF0000" && l.width == layout.line_width)
            .collect();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].points.len(), 2);
        assert!(data[0].points.iter().all(|&(x, _)| x <= right));
    }

    #[test]
    fn clipping_interpolates_the_crossing() {
        let runs = clip_to_x_range([(0.0, 1.0), (500.0, 2.0), (1000.0, 1.5)], (0.0, 251.0));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0][0], (0.0, 1.0));
        let (x, y) = runs[0][1];
        assert!((x - 251.0).abs() < 1e-9 && (y - 1.502).abs() < 1e-9);

        let entering = clip_to_x_range([(-10.0, 0.0), (10.0, 2.0)], (0.0, 251.0));
        assert_eq!(entering, vec![vec![(0.0, 1.0), (10.0, 2.0)]]);

        assert!(clip_to_x_range([(300.0, 1.0), (400.0, 2.0)], (0.0, 251.0)).is_empty());
    }

    #[test]
    fn non_finite_points_break_the_line() {
        let runs = clip_to_x_range(
            [(0.0, 1.0), (1.0, f64::NAN), (2.0, 1.0), (3.0, 2.0)],
            (0.0, 251.0),
        );
        assert_eq!(runs, vec![vec![(2.0, 1.0), (3.0, 2.0)]]);
    }

    #[test]
    fn layout_uses_half_point_units() {
        let fig = two_series(UnitChoice::Angstrom);
        let layout = Layout::new(&fig, &ExportOptions::default());
        assert_eq!(layout.fig_w, 1440);
        assert_eq!(layout.fig_h, 864);
        assert!(layout.canvas_w > layout.fig_w);
        assert_eq!(layout.canvas_h, layout.fig_h);
        assert_eq!(layout.line_width, 3);
        assert_eq!(layout.legend_line_width, 8);
        assert_eq!(layout.tick_len, 12);
    }

    #[test]
    fn tick_decimals_follow_range() {
        assert_eq!(tick_decimals(0.0, 5.0), 0);
        assert_eq!(tick_decimals(0.0, 0.3), 2);
        assert_eq!(tick_decimals(1.0, 1.0), 1);
    }

    #[test]
    fn crop_keeps_padding_around_content() {
        let mut img = RgbaImage::from_pixel(100, 80, Rgba([255, 255, 255, 255]));
        img.put_pixel(40, 30, Rgba([0, 0, 0, 255]));
        img.put_pixel(60, 50, Rgba([255, 0, 0, 255]));
        let cropped = crop_to_content(&img, 5);
        assert_eq!(cropped.dimensions(), (31, 31));
        assert_eq!(cropped.get_pixel(5, 5), &Rgb([0, 0, 0]));
        assert_eq!(cropped.get_pixel(25, 25), &Rgb([255, 0, 0]));
    }

    #[test]
    fn crop_clamps_to_canvas_and_ignores_blank() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        assert_eq!(crop_to_content(&img, 3).dimensions(), (10, 10));
        img.put_pixel(0, 9, Rgba([0, 0, 0, 255]));
        assert_eq!(crop_to_content(&img, 3).dimensions(), (4, 4));
    }

    #[test]
    fn low_dpi_png_decodes() {
        let options = ExportOptions::default().with_dpi(30);
        let bytes = render_png(&two_series(UnitChoice::Angstrom), &options).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory(&bytes).unwrap();
        // canvas is a little over 10in + legend wide, 6in tall, before cropping
        assert!(img.width() > 0 && img.width() <= 30 * 13);
        assert!(img.height() > 0 && img.height() <= 30 * 6);
    }
}
