//! Static Chart Renderer
//! Rasterizes figures into RGB buffers with plotters and encodes them as PNG.
//!
//! Sizes given at scale 1 (fonts, margins, marker radii) are multiplied by
//! the render scale, so a download at scale 3 is the on-screen chart at
//! three times the resolution.

use crate::charts::catalog::ChartId;
use crate::charts::figure::{
    format_tick, AxisKind, CountFigure, Figure, HeatmapFigure, HistogramFigure, PairGridFigure,
    ScatterFigure, PAIR_PANEL_SIZE,
};
use crate::charts::palette::{Rgb, ThemeStyle};
use crate::config::DisplayOptions;
use crate::error::{ExplorerError, Result};
use crate::stats::StatsCalculator;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::io::Cursor;
use std::sync::OnceLock;
use tracing::{debug, info};

const FONT_FAMILY: &str = "sans-serif";
const TITLE_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 12.0;
const TICK_SIZE: f64 = 10.0;
const COLORBAR_WIDTH: f64 = 80.0;
const COLORBAR_STEPS: usize = 100;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

static FONT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Registers the embedded UI font as the plotting font family.
fn ensure_font() -> Result<()> {
    FONT.get_or_init(|| {
        plotters::style::register_font(
            FONT_FAMILY,
            FontStyle::Normal,
            epaint_default_fonts::UBUNTU_LIGHT,
        )
        .map_err(|_| "embedded font could not be parsed".to_string())
    })
    .clone()
    .map_err(ExplorerError::Render)
}

/// A rendered chart: raw pixels for display and PNG bytes for download.
#[derive(Debug, Clone)]
pub struct ChartResult {
    pub chart: ChartId,
    pub figure: Figure,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8 pixels.
    pub rgb: Vec<u8>,
    pub png: Vec<u8>,
}

/// Theme colors and pixel scale shared by the drawing routines.
struct Canvas {
    style: ThemeStyle,
    scale: f64,
}

impl Canvas {
    fn px(&self, value: f64) -> u32 {
        (value * self.scale).round().max(1.0) as u32
    }

    fn text(&self, size: f64) -> TextStyle<'static> {
        (FONT_FAMILY, size * self.scale)
            .into_font()
            .color(&rgb_color(self.style.foreground))
    }

    fn foreground(&self) -> RGBColor {
        rgb_color(self.style.foreground)
    }

    fn background(&self) -> RGBColor {
        rgb_color(self.style.background)
    }

    fn grid(&self) -> RGBColor {
        rgb_color(self.style.grid)
    }

    /// Radius in pixels of a marker with the given area in square points.
    fn marker_radius(&self, area: f64) -> i32 {
        let diameter_px = area.max(0.0).sqrt() * 100.0 / 72.0;
        ((diameter_px / 2.0) * self.scale).round().max(1.0) as i32
    }
}

fn rgb_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb[0], rgb[1], rgb[2])
}

fn tick(value: &f64) -> String {
    format_tick(*value)
}

/// Data range widened by 5% on each side.
fn padded(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

fn axis_range(kind: &AxisKind, values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    match kind {
        AxisKind::Numeric => padded(values),
        AxisKind::Categorical(levels) => -0.5..(levels.len().max(1) as f64 - 0.5),
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Rasterize a figure at `scale`× its display size and encode it as PNG.
    pub fn render(
        chart: ChartId,
        figure: Figure,
        options: &DisplayOptions,
        scale: u32,
        file_name: String,
    ) -> Result<ChartResult> {
        ensure_font()?;

        let options = options.clamped();
        let scale = scale.max(1);
        let (width, height) = figure.pixel_size(&options, scale);
        let canvas = Canvas {
            style: ThemeStyle::for_theme(options.theme),
            scale: scale as f64,
        };
        debug!(?chart, width, height, scale, "rendering chart");

        let mut rgb = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
            root.fill(&canvas.background())?;

            match &figure {
                Figure::Scatter(fig) => Self::draw_scatter(&root, fig, &canvas)?,
                Figure::Count(fig) => Self::draw_count(&root, fig, &canvas)?,
                Figure::Heatmap(fig) => Self::draw_heatmap(&root, fig, &canvas)?,
                Figure::PairGrid(fig) => Self::draw_pair_grid(&root, fig, &canvas)?,
                Figure::Histogram(fig) => Self::draw_histogram(&root, fig, &canvas)?,
            }

            root.present()?;
        }

        let png = Self::encode_png(width, height, &rgb)?;
        info!(
            ?chart,
            file = %file_name,
            width,
            height,
            bytes = png.len(),
            "chart rendered"
        );

        Ok(ChartResult {
            chart,
            figure,
            file_name,
            width,
            height,
            rgb,
            png,
        })
    }

    /// Encode an RGB8 buffer as PNG bytes.
    pub fn encode_png(width: u32, height: u32, rgb: &[u8]) -> Result<Vec<u8>> {
        let image = RgbImage::from_raw(width, height, rgb.to_vec()).ok_or_else(|| {
            ExplorerError::Render(format!("pixel buffer does not match {width}x{height}"))
        })?;
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(png.into_inner())
    }

    fn draw_scatter(root: &Area<'_>, fig: &ScatterFigure, canvas: &Canvas) -> Result<()> {
        let points = || fig.series.iter().flat_map(|s| s.points.iter());
        let x_range = axis_range(&fig.x.kind, points().map(|p| p.0));
        let y_range = axis_range(&fig.y.kind, points().map(|p| p.1));
        let (x_lo, y_lo) = (x_range.start, y_range.start);

        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, canvas.text(TITLE_SIZE))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(40.0))
            .y_label_area_size(canvas.px(55.0))
            .build_cartesian_2d(x_range, y_range)?;

        {
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(fig.x.label.as_str())
                .y_desc(fig.y.label.as_str())
                .axis_style(canvas.foreground())
                .label_style(canvas.text(TICK_SIZE))
                .axis_desc_style(canvas.text(LABEL_SIZE))
                .bold_line_style(canvas.grid())
                .light_line_style(canvas.background())
                .x_label_formatter(&tick)
                .y_label_formatter(&tick);
            if !fig.grid {
                mesh.disable_mesh();
            }
            if matches!(fig.x.kind, AxisKind::Categorical(_)) {
                mesh.x_labels(0);
            }
            if matches!(fig.y.kind, AxisKind::Categorical(_)) {
                mesh.y_labels(0);
            }
            mesh.draw()?;
        }

        let radius = canvas.marker_radius(fig.marker_area);
        for series in &fig.series {
            let color = rgb_color(series.color).mix(fig.alpha);
            let anno = chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|&p| Circle::new(p, radius, color.filled())),
            )?;
            if let Some(label) = &series.label {
                anno.label(label.clone())
                    .legend(move |(x, y)| Circle::new((x, y), radius, color.filled()));
            }
        }

        if fig.series.iter().any(|s| s.label.is_some()) {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font(canvas.text(TICK_SIZE))
                .background_style(&canvas.background().mix(0.8))
                .border_style(&canvas.grid())
                .draw()?;
        }

        let offset = canvas.px(5.0) as i32;
        if let AxisKind::Categorical(levels) = &fig.x.kind {
            let style = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Center, VPos::Top));
            for (i, level) in levels.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(i as f64, y_lo));
                root.draw(&Text::new(level.as_str(), (x, y + offset), style.clone()))?;
            }
        }
        if let AxisKind::Categorical(levels) = &fig.y.kind {
            let style = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Right, VPos::Center));
            for (i, level) in levels.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(x_lo, i as f64));
                root.draw(&Text::new(level.as_str(), (x - offset, y), style.clone()))?;
            }
        }

        Ok(())
    }

    fn draw_count(root: &Area<'_>, fig: &CountFigure, canvas: &Canvas) -> Result<()> {
        let categories = fig.categories.len().max(1);
        let y_max = (fig.max_count().max(1) as f64) * 1.05;

        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, canvas.text(TITLE_SIZE))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(40.0))
            .y_label_area_size(canvas.px(50.0))
            .build_cartesian_2d(-0.5..(categories as f64 - 0.5), 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .x_desc(fig.x_label.as_str())
            .y_desc("Count")
            .axis_style(canvas.foreground())
            .label_style(canvas.text(TICK_SIZE))
            .axis_desc_style(canvas.text(LABEL_SIZE))
            .y_label_formatter(&tick)
            .draw()?;

        let groups = fig.groups.len().max(1) as f64;
        let bar_width = 0.8 / groups;
        for (g, group) in fig.groups.iter().enumerate() {
            let color = rgb_color(group.color);
            let left_of = |i: usize| i as f64 - 0.4 + bar_width * g as f64;
            chart
                .draw_series(group.counts.iter().enumerate().map(|(i, &count)| {
                    Rectangle::new(
                        [(left_of(i), 0.0), (left_of(i) + bar_width, count as f64)],
                        color.filled(),
                    )
                }))?
                .label(group.label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(canvas.text(TICK_SIZE))
            .background_style(&canvas.background().mix(0.8))
            .border_style(&canvas.grid())
            .draw()?;

        let offset = canvas.px(5.0) as i32;
        let style = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Center, VPos::Top));
        for (i, category) in fig.categories.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(i as f64, 0.0));
            root.draw(&Text::new(category.as_str(), (x, y + offset), style.clone()))?;
        }

        let (legend_x, legend_y) = chart.backend_coord(&(categories as f64 - 0.5, y_max));
        let title_style = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Right, VPos::Bottom));
        root.draw(&Text::new(
            fig.hue_title.as_str(),
            (legend_x - offset, legend_y),
            title_style,
        ))?;

        Ok(())
    }

    fn draw_heatmap(root: &Area<'_>, fig: &HeatmapFigure, canvas: &Canvas) -> Result<()> {
        let n = fig.matrix.columns.len();
        let size = n.max(1) as f64;
        let (width, _) = root.dim_in_pixel();
        let bar_width = canvas.px(COLORBAR_WIDTH).min(width / 3);
        let (cells_area, bar_area) = root.split_horizontally(width - bar_width);

        let mut chart = ChartBuilder::on(&cells_area)
            .caption(&fig.title, canvas.text(TITLE_SIZE))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(30.0))
            .y_label_area_size(canvas.px(90.0))
            .build_cartesian_2d(0.0..size, 0.0..size)?;

        let span = fig.vmax - fig.vmin;
        let fill_of = |value: f64| -> Rgb {
            if value.is_finite() {
                fig.colormap.interpolate((value - fig.vmin) / span)
            } else {
                canvas.style.background
            }
        };

        // Row 0 is drawn at the top.
        chart.draw_series((0..n).flat_map(|i| {
            (0..n).map(move |j| {
                let top = size - i as f64;
                Rectangle::new(
                    [(j as f64, top - 1.0), (j as f64 + 1.0, top)],
                    rgb_color(fill_of(fig.matrix.get(i, j))).filled(),
                )
            })
        }))?;

        for i in 0..n {
            for j in 0..n {
                let value = fig.matrix.get(i, j);
                if !value.is_finite() {
                    continue;
                }
                let cell = fill_of(value);
                let luminance =
                    0.299 * cell[0] as f64 + 0.587 * cell[1] as f64 + 0.114 * cell[2] as f64;
                let ink = if luminance < 128.0 { WHITE } else { BLACK };
                let style = (FONT_FAMILY, TICK_SIZE * canvas.scale)
                    .into_font()
                    .color(&ink)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let center = chart.backend_coord(&(j as f64 + 0.5, size - i as f64 - 0.5));
                root.draw(&Text::new(format!("{value:.2}"), center, style))?;
            }
        }

        let offset = canvas.px(5.0) as i32;
        let bottom = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Center, VPos::Top));
        let left = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Right, VPos::Center));
        for (k, column) in fig.matrix.columns.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(k as f64 + 0.5, 0.0));
            root.draw(&Text::new(column.as_str(), (x, y + offset), bottom.clone()))?;
            let (x, y) = chart.backend_coord(&(0.0, size - k as f64 - 0.5));
            root.draw(&Text::new(column.as_str(), (x - offset, y), left.clone()))?;
        }

        let mut bar = ChartBuilder::on(&bar_area)
            .margin_top(canvas.px(40.0))
            .margin_bottom(canvas.px(40.0))
            .margin_left(canvas.px(8.0))
            .right_y_label_area_size(canvas.px(40.0))
            .build_cartesian_2d(0.0..1.0, fig.vmin..fig.vmax)?;
        bar.configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .y_labels(6)
            .axis_style(canvas.foreground())
            .label_style(canvas.text(TICK_SIZE))
            .y_label_formatter(&tick)
            .draw()?;
        let step = span / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|k| {
            let lo = fig.vmin + step * k as f64;
            Rectangle::new(
                [(0.0, lo), (1.0, lo + step)],
                rgb_color(fig.colormap.interpolate((k as f64 + 0.5) / COLORBAR_STEPS as f64))
                    .filled(),
            )
        }))?;

        Ok(())
    }

    fn draw_pair_grid(root: &Area<'_>, fig: &PairGridFigure, canvas: &Canvas) -> Result<()> {
        let n = fig.variables.len();
        if n == 0 {
            return Ok(());
        }
        let grid_width = canvas.px((n as u32 * PAIR_PANEL_SIZE) as f64);
        let (grid_area, legend_area) = root.split_horizontally(grid_width);
        let panels = grid_area.split_evenly((n, n));
        let radius = canvas.marker_radius(fig.marker_area);
        let ranges: Vec<_> = (0..n).map(|v| padded(fig.all_values(v))).collect();

        for (index, panel) in panels.iter().enumerate() {
            let (row, col) = (index / n, index % n);
            let bottom_row = row + 1 == n;
            let left_col = col == 0;

            if row == col {
                let curves: Vec<(Rgb, Vec<(f64, f64)>)> = fig
                    .groups
                    .iter()
                    .map(|g| {
                        let values: Vec<f64> = g.values[col].iter().flatten().copied().collect();
                        (g.color, StatsCalculator::kde(&values, 100, 3.0))
                    })
                    .collect();
                let peak = curves
                    .iter()
                    .flat_map(|(_, c)| c.iter().map(|p| p.1))
                    .fold(0.0, f64::max);
                let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

                let mut chart = ChartBuilder::on(panel)
                    .margin(canvas.px(4.0))
                    .x_label_area_size(canvas.px(30.0))
                    .y_label_area_size(canvas.px(40.0))
                    .build_cartesian_2d(ranges[col].clone(), 0.0..y_max)?;
                {
                    let mut mesh = chart.configure_mesh();
                    mesh.disable_mesh()
                        .x_labels(if bottom_row { 4 } else { 0 })
                        .y_labels(0)
                        .axis_style(canvas.foreground())
                        .label_style(canvas.text(TICK_SIZE - 1.0))
                        .axis_desc_style(canvas.text(LABEL_SIZE - 1.0))
                        .x_label_formatter(&tick);
                    if bottom_row {
                        mesh.x_desc(fig.variables[col].as_str());
                    }
                    if left_col {
                        mesh.y_desc(fig.variables[row].as_str());
                    }
                    mesh.draw()?;
                }

                for (color, curve) in curves {
                    chart.draw_series(LineSeries::new(
                        curve,
                        rgb_color(color).stroke_width(canvas.px(1.5)),
                    ))?;
                }
            } else {
                let mut chart = ChartBuilder::on(panel)
                    .margin(canvas.px(4.0))
                    .x_label_area_size(canvas.px(30.0))
                    .y_label_area_size(canvas.px(40.0))
                    .build_cartesian_2d(ranges[col].clone(), ranges[row].clone())?;
                {
                    let mut mesh = chart.configure_mesh();
                    mesh.disable_mesh()
                        .x_labels(if bottom_row { 4 } else { 0 })
                        .y_labels(if left_col { 4 } else { 0 })
                        .axis_style(canvas.foreground())
                        .label_style(canvas.text(TICK_SIZE - 1.0))
                        .axis_desc_style(canvas.text(LABEL_SIZE - 1.0))
                        .x_label_formatter(&tick)
                        .y_label_formatter(&tick);
                    if bottom_row {
                        mesh.x_desc(fig.variables[col].as_str());
                    }
                    if left_col {
                        mesh.y_desc(fig.variables[row].as_str());
                    }
                    mesh.draw()?;
                }

                for group in &fig.groups {
                    let color = rgb_color(group.color).mix(0.7);
                    chart.draw_series(
                        group.values[col]
                            .iter()
                            .zip(group.values[row].iter())
                            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                            .map(|p| Circle::new(p, radius, color.filled())),
                    )?;
                }
            }
        }

        let (_, legend_height) = legend_area.dim_in_pixel();
        let line = canvas.px(18.0) as i32;
        let x = canvas.px(12.0) as i32;
        let mut y = legend_height as i32 / 2 - line * (fig.groups.len() as i32 + 1) / 2;
        let heading = canvas.text(LABEL_SIZE).pos(Pos::new(HPos::Left, VPos::Center));
        legend_area.draw(&Text::new(fig.hue_title.as_str(), (x, y), heading))?;
        let entry = canvas.text(TICK_SIZE).pos(Pos::new(HPos::Left, VPos::Center));
        let dot = canvas.px(4.0) as i32;
        for group in &fig.groups {
            y += line;
            legend_area.draw(&Circle::new((x + dot, y), dot, rgb_color(group.color).filled()))?;
            legend_area.draw(&Text::new(group.label.as_str(), (x + 3 * dot, y), entry.clone()))?;
        }
        debug!(panels = n * n, groups = fig.groups.len(), "pair grid drawn");

        Ok(())
    }

    fn draw_histogram(root: &Area<'_>, fig: &HistogramFigure, canvas: &Canvas) -> Result<()> {
        let edges = &fig.histogram.edges;
        let x_range = padded(
            edges
                .iter()
                .copied()
                .chain(fig.density.iter().map(|p| p.0)),
        );
        let peak = fig
            .density
            .iter()
            .map(|p| p.1)
            .fold(fig.histogram.max_count() as f64, f64::max);
        let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

        let mut chart = ChartBuilder::on(root)
            .caption(&fig.title, canvas.text(TITLE_SIZE))
            .margin(canvas.px(10.0))
            .x_label_area_size(canvas.px(40.0))
            .y_label_area_size(canvas.px(50.0))
            .build_cartesian_2d(x_range, 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(fig.x_label.as_str())
            .y_desc(fig.y_label.as_str())
            .axis_style(canvas.foreground())
            .label_style(canvas.text(TICK_SIZE))
            .axis_desc_style(canvas.text(LABEL_SIZE))
            .x_label_formatter(&tick)
            .y_label_formatter(&tick)
            .draw()?;

        let color = rgb_color(fig.color);
        let bars = || {
            edges
                .windows(2)
                .zip(fig.histogram.counts.iter())
                .map(|(edge, &count)| [(edge[0], 0.0), (edge[1], count as f64)])
        };
        chart.draw_series(bars().map(|corners| Rectangle::new(corners, color.mix(0.6).filled())))?;
        chart.draw_series(bars().map(|corners| Rectangle::new(corners, canvas.background())))?;
        chart.draw_series(LineSeries::new(
            fig.density.iter().copied(),
            color.stroke_width(canvas.px(2.0)),
        ))?;

        Ok(())
    }
}
