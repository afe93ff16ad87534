//! Figure model
//! Plain-data description of each chart kind, built from a dataset table.
//! Everything here is independent of the raster backend.

use crate::charts::palette::{Colormap, Rgb, ThemeStyle};
use crate::config::{DisplayOptions, Theme};
use crate::data::DatasetTable;
use crate::error::Result;
use crate::stats::{CorrelationMatrix, Histogram, StatsCalculator};
use std::collections::HashMap;

/// Numeric hue columns with more distinct values than this are binned.
const MAX_DISCRETE_HUE_LEVELS: usize = 10;
const HUE_BINS: usize = 5;
const SCATTER_ALPHA: f64 = 0.7;
const KDE_POINTS: usize = 200;

/// How values are laid out along an axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisKind {
    Numeric,
    /// Category `i` sits at position `i`.
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    pub kind: AxisKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    /// Hue level; `None` for the single series of an uncolored plot.
    pub label: Option<String>,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterFigure {
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub hue_title: Option<String>,
    pub series: Vec<ScatterSeries>,
    /// Marker area in square points.
    pub marker_area: f64,
    pub alpha: f64,
    pub grid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountGroup {
    pub label: String,
    pub color: Rgb,
    /// One count per x category.
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountFigure {
    pub title: String,
    pub x_label: String,
    pub categories: Vec<String>,
    pub hue_title: String,
    pub groups: Vec<CountGroup>,
}

impl CountFigure {
    pub fn max_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapFigure {
    pub title: String,
    pub matrix: CorrelationMatrix,
    pub colormap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairGroup {
    pub label: String,
    pub color: Rgb,
    /// Indexed `[variable][row]`.
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairGridFigure {
    pub variables: Vec<String>,
    pub hue_title: String,
    pub groups: Vec<PairGroup>,
    pub marker_area: f64,
}

impl PairGridFigure {
    /// Present values of `variable` across all groups.
    pub fn all_values(&self, variable: usize) -> impl Iterator<Item = f64> + '_ {
        self.groups
            .iter()
            .flat_map(move |g| g.values[variable].iter().flatten().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub histogram: Histogram,
    /// Density curve scaled to bin counts.
    pub density: Vec<(f64, f64)>,
    pub color: Rgb,
}

/// A chart description, ready to rasterize.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Scatter(ScatterFigure),
    Count(CountFigure),
    Heatmap(HeatmapFigure),
    PairGrid(PairGridFigure),
    Histogram(HistogramFigure),
}

/// Pixel size of one pair grid panel at scale 1.
pub const PAIR_PANEL_SIZE: u32 = 200;
/// Width reserved for the pair grid legend at scale 1.
pub const PAIR_LEGEND_WIDTH: u32 = 110;

impl Figure {
    /// Pixel size at `scale`. Pair grids have a fixed panel size; every
    /// other figure follows the display width and height.
    pub fn pixel_size(&self, options: &DisplayOptions, scale: u32) -> (u32, u32) {
        match self {
            Figure::PairGrid(grid) => {
                let scale = scale.max(1);
                let n = grid.variables.len().max(1) as u32;
                (
                    (n * PAIR_PANEL_SIZE + PAIR_LEGEND_WIDTH) * scale,
                    n * PAIR_PANEL_SIZE * scale,
                )
            }
            _ => options.figure_size(scale),
        }
    }
}

/// Parameters of a scatter chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSpec {
    pub title: String,
    pub x: String,
    pub y: String,
    pub hue: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub marker_area: f64,
    pub grid: bool,
}

/// Builds figures from dataset tables.
pub struct FigureBuilder;

impl FigureBuilder {
    /// Scatter plot of two columns, optionally split by a hue column.
    ///
    /// Non-numeric axis columns are placed at category positions. Rows with a
    /// missing x, y or hue value are dropped.
    pub fn scatter(table: &DatasetTable, spec: &ScatterSpec, style: &ThemeStyle) -> Result<Figure> {
        let (x_positions, x_kind) = Self::axis_positions(table, &spec.x)?;
        let (y_positions, y_kind) = Self::axis_positions(table, &spec.y)?;

        let series = match &spec.hue {
            None => vec![ScatterSeries {
                label: None,
                color: style.color(0),
                points: x_positions
                    .iter()
                    .zip(y_positions.iter())
                    .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                    .collect(),
            }],
            Some(hue) => {
                let (assignment, levels, colors) = Self::hue_levels(table, hue, style)?;
                let mut series: Vec<ScatterSeries> = levels
                    .into_iter()
                    .zip(colors)
                    .map(|(label, color)| ScatterSeries {
                        label: Some(label),
                        color,
                        points: Vec::new(),
                    })
                    .collect();

                for ((x, y), level) in x_positions.iter().zip(y_positions.iter()).zip(assignment) {
                    if let (Some(x), Some(y), Some(level)) = (x, y, level) {
                        series[level].points.push((*x, *y));
                    }
                }
                series
            }
        };

        Ok(Figure::Scatter(ScatterFigure {
            title: spec.title.clone(),
            x: Axis {
                label: spec.x_label.clone(),
                kind: x_kind,
            },
            y: Axis {
                label: spec.y_label.clone(),
                kind: y_kind,
            },
            hue_title: spec.hue.clone(),
            series,
            marker_area: spec.marker_area,
            alpha: SCATTER_ALPHA,
            grid: spec.grid,
        }))
    }

    /// Grouped bar chart of row counts per (x, hue) pair. The default theme
    /// colors hue levels along viridis.
    pub fn count(
        table: &DatasetTable,
        x: &str,
        hue: &str,
        title: &str,
        x_label: &str,
        hue_title: &str,
        theme: Theme,
    ) -> Result<Figure> {
        let categories = table.levels(x)?;
        let hue_levels = table.levels(hue)?;
        let x_labels = table.labels(x)?;
        let hue_labels = table.labels(hue)?;

        let colors = match theme {
            Theme::Default => Colormap::Viridis.sample(hue_levels.len()),
            other => ThemeStyle::for_theme(other).colors(hue_levels.len()),
        };

        let mut groups: Vec<CountGroup> = hue_levels
            .iter()
            .zip(colors)
            .map(|(label, color)| CountGroup {
                label: label.clone(),
                color,
                counts: vec![0; categories.len()],
            })
            .collect();

        let category_index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let hue_index: HashMap<&str, usize> = hue_levels
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        for (x_value, hue_value) in x_labels.iter().zip(hue_labels.iter()) {
            let (Some(x_value), Some(hue_value)) = (x_value, hue_value) else {
                continue;
            };
            if let (Some(&xi), Some(&hi)) = (
                category_index.get(x_value.as_str()),
                hue_index.get(hue_value.as_str()),
            ) {
                groups[hi].counts[xi] += 1;
            }
        }

        Ok(Figure::Count(CountFigure {
            title: title.to_string(),
            x_label: x_label.to_string(),
            categories,
            hue_title: hue_title.to_string(),
            groups,
        }))
    }

    /// Annotated correlation heatmap, or `None` without numeric columns.
    pub fn heatmap(table: &DatasetTable, title: &str) -> Result<Option<Figure>> {
        let Some(matrix) = StatsCalculator::correlation(table)? else {
            return Ok(None);
        };

        let (mut vmin, mut vmax) = matrix.finite_range().unwrap_or((-1.0, 1.0));
        if vmin == vmax {
            vmin -= 1.0;
            vmax += 1.0;
        }

        Ok(Some(Figure::Heatmap(HeatmapFigure {
            title: title.to_string(),
            matrix,
            colormap: Colormap::Coolwarm,
            vmin,
            vmax,
        })))
    }

    /// Scatter matrix of all numeric columns, colored by `hue`.
    pub fn pair_grid(
        table: &DatasetTable,
        hue: &str,
        marker_area: f64,
        style: &ThemeStyle,
    ) -> Result<Figure> {
        let variables = table.numeric_columns();
        let columns: Vec<Vec<Option<f64>>> = variables
            .iter()
            .map(|name| table.numeric_values(name))
            .collect::<Result<_>>()?;

        let levels = table.levels(hue)?;
        let hue_labels = table.labels(hue)?;

        let groups = levels
            .iter()
            .enumerate()
            .map(|(i, level)| {
                let rows: Vec<usize> = hue_labels
                    .iter()
                    .enumerate()
                    .filter(|(_, label)| label.as_deref() == Some(level.as_str()))
                    .map(|(row, _)| row)
                    .collect();
                PairGroup {
                    label: level.clone(),
                    color: style.color(i),
                    values: columns
                        .iter()
                        .map(|col| rows.iter().map(|&r| col[r]).collect())
                        .collect(),
                }
            })
            .collect();

        Ok(Figure::PairGrid(PairGridFigure {
            variables,
            hue_title: hue.to_string(),
            groups,
            marker_area,
        }))
    }

    /// Histogram of a numeric column with a density curve scaled to counts.
    pub fn distribution(table: &DatasetTable, column: &str, style: &ThemeStyle) -> Result<Figure> {
        let values: Vec<f64> = table.numeric_values(column)?.into_iter().flatten().collect();
        let histogram = StatsCalculator::histogram(&values);

        let scale = values.len() as f64 * histogram.bin_width();
        let density = StatsCalculator::kde(&values, KDE_POINTS, 0.0)
            .into_iter()
            .map(|(x, d)| (x, d * scale))
            .collect();

        Ok(Figure::Histogram(HistogramFigure {
            title: format!("Distribution of {column}"),
            x_label: column.to_string(),
            y_label: "Frequency".to_string(),
            histogram,
            density,
            color: style.color(0),
        }))
    }

    /// Positions of a column's values along an axis.
    fn axis_positions(table: &DatasetTable, column: &str) -> Result<(Vec<Option<f64>>, AxisKind)> {
        if table.is_numeric(column)? {
            return Ok((table.numeric_values(column)?, AxisKind::Numeric));
        }

        let levels = table.levels(column)?;
        let positions = table
            .labels(column)?
            .into_iter()
            .map(|label| {
                let label = label?;
                levels.iter().position(|l| *l == label).map(|i| i as f64)
            })
            .collect();
        Ok((positions, AxisKind::Categorical(levels)))
    }

    /// Per-row hue level index, level labels and level colors.
    ///
    /// Text columns and numeric columns with few distinct values are used
    /// as-is; other numeric columns are cut into equal-width intervals
    /// colored along viridis.
    fn hue_levels(
        table: &DatasetTable,
        hue: &str,
        style: &ThemeStyle,
    ) -> Result<(Vec<Option<usize>>, Vec<String>, Vec<Rgb>)> {
        let levels = table.levels(hue)?;
        let numeric = table.is_numeric(hue)?;

        if !numeric || levels.len() <= MAX_DISCRETE_HUE_LEVELS {
            let index: HashMap<&str, usize> = levels
                .iter()
                .enumerate()
                .map(|(i, l)| (l.as_str(), i))
                .collect();
            let assignment = table
                .labels(hue)?
                .iter()
                .map(|label| label.as_deref().and_then(|l| index.get(l).copied()))
                .collect();
            let colors = style.colors(levels.len());
            return Ok((assignment, levels, colors));
        }

        let values = table.numeric_values(hue)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (hi - lo) / HUE_BINS as f64;

        let assignment = values
            .iter()
            .map(|v| {
                v.map(|v| {
                    if width > 0.0 {
                        (((v - lo) / width).floor() as usize).min(HUE_BINS - 1)
                    } else {
                        0
                    }
                })
            })
            .collect();
        let labels = (0..HUE_BINS)
            .map(|i| {
                let start = lo + width * i as f64;
                format!("{} – {}", format_tick(start), format_tick(start + width))
            })
            .collect();
        Ok((assignment, labels, Colormap::Viridis.sample(HUE_BINS)))
    }
}

/// Compact tick formatting: integers without decimals, others with up to
/// two.
pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetKind, DatasetProvider};
    use crate::error::ExplorerError;
    use polars::prelude::*;

    fn style() -> ThemeStyle {
        ThemeStyle::for_theme(Theme::Default)
    }

    fn spec(x: &str, y: &str, hue: Option<&str>) -> ScatterSpec {
        ScatterSpec {
            title: format!("{y} vs {x}"),
            x: x.to_string(),
            y: y.to_string(),
            hue: hue.map(str::to_string),
            x_label: x.to_string(),
            y_label: y.to_string(),
            marker_area: 80.0,
            grid: false,
        }
    }

    fn scatter_of(figure: Figure) -> ScatterFigure {
        match figure {
            Figure::Scatter(s) => s,
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn scatter_without_hue_has_one_series() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let fig = scatter_of(
            FigureBuilder::scatter(&table, &spec("sepal_length", "petal_length", None), &style())
                .unwrap(),
        );
        assert_eq!(fig.series.len(), 1);
        assert_eq!(fig.series[0].label, None);
        assert_eq!(fig.series[0].points.len(), 150);
    }

    #[test]
    fn scatter_with_categorical_hue_has_series_per_level() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let fig = scatter_of(
            FigureBuilder::scatter(
                &table,
                &spec("sepal_length", "sepal_width", Some("species")),
                &style(),
            )
            .unwrap(),
        );
        let labels: Vec<_> = fig.series.iter().map(|s| s.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["setosa", "versicolor", "virginica"]);
        assert!(fig.series.iter().all(|s| s.points.len() == 50));
        assert_ne!(fig.series[0].color, fig.series[1].color);
    }

    #[test]
    fn categorical_axis_uses_level_positions() {
        let df = df!(
            "day" => ["Sun", "Sat", "Sun", "Thur"],
            "tip" => [1.0, 2.0, 3.0, 4.0]
        )
        .unwrap();
        let table = DatasetTable::new(DatasetKind::Tips, df);
        let figure = FigureBuilder::scatter(&table, &spec("day", "tip", None), &style()).unwrap();
        let fig = scatter_of(figure);
        assert_eq!(
            fig.x.kind,
            AxisKind::Categorical(vec!["Thur".into(), "Sat".into(), "Sun".into()])
        );
        assert_eq!(
            fig.series[0].points,
            vec![(2.0, 1.0), (1.0, 2.0), (2.0, 3.0), (0.0, 4.0)]
        );
    }

    #[test]
    fn rows_with_missing_values_are_dropped() {
        let table = DatasetProvider::new().load(DatasetKind::Titanic).unwrap();
        let ages = table.numeric_values("age").unwrap();
        let present = ages.iter().filter(|a| a.is_some()).count();
        let fig = scatter_of(
            FigureBuilder::scatter(&table, &spec("age", "fare", Some("sex")), &style()).unwrap(),
        );
        let plotted: usize = fig.series.iter().map(|s| s.points.len()).sum();
        assert_eq!(plotted, present);
        assert_eq!(fig.series.len(), 2);
    }

    #[test]
    fn continuous_hue_is_binned() {
        let fares: Vec<f64> = (0..40).map(|i| i as f64 * 2.5).collect();
        let df = df!("x" => fares.clone(), "y" => fares.clone(), "fare" => fares).unwrap();
        let table = DatasetTable::new(DatasetKind::Titanic, df);
        let fig = scatter_of(
            FigureBuilder::scatter(&table, &spec("x", "y", Some("fare")), &style()).unwrap(),
        );
        assert_eq!(fig.series.len(), HUE_BINS);
        let plotted: usize = fig.series.iter().map(|s| s.points.len()).sum();
        assert_eq!(plotted, 40);
    }

    #[test]
    fn count_plot_tallies_every_row() {
        let table = DatasetProvider::new().load(DatasetKind::Titanic).unwrap();
        let fig = FigureBuilder::count(
            &table,
            "survived",
            "class",
            "Titanic Survival by Class",
            "Survived",
            "Class",
            Theme::Default,
        )
        .unwrap();
        let Figure::Count(count) = fig else {
            panic!("expected count figure");
        };
        assert_eq!(count.categories, vec!["0", "1"]);
        let labels: Vec<_> = count.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second", "Third"]);
        let total: usize = count.groups.iter().flat_map(|g| g.counts.iter()).sum();
        assert_eq!(total, table.row_count());
        assert_eq!(count.groups[0].color, Colormap::Viridis.sample(3)[0]);
    }

    #[test]
    fn heatmap_is_absent_without_numeric_columns() {
        let df = df!("sex" => ["male", "female"], "who" => ["man", "woman"]).unwrap();
        let table = DatasetTable::new(DatasetKind::Titanic, df);
        assert!(FigureBuilder::heatmap(&table, "Correlation Matrix").unwrap().is_none());
    }

    #[test]
    fn pair_grid_splits_rows_by_species() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let figure = FigureBuilder::pair_grid(&table, "species", 40.0, &style()).unwrap();
        let Figure::PairGrid(grid) = figure else {
            panic!("expected pair grid");
        };
        assert_eq!(grid.variables.len(), 4);
        assert_eq!(grid.groups.len(), 3);
        assert!(grid.groups.iter().all(|g| g.values.len() == 4 && g.values[0].len() == 50));
        assert_eq!(grid.all_values(0).count(), 150);
    }

    #[test]
    fn distribution_rejects_text_columns() {
        let table = DatasetProvider::new().load(DatasetKind::Tips).unwrap();
        let err = FigureBuilder::distribution(&table, "day", &style()).unwrap_err();
        assert!(matches!(err, ExplorerError::NonNumericColumn(_)));
    }

    #[test]
    fn distribution_density_is_scaled_to_counts() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let figure = FigureBuilder::distribution(&table, "petal_length", &style()).unwrap();
        let Figure::Histogram(hist) = figure else {
            panic!("expected histogram");
        };
        assert_eq!(hist.title, "Distribution of petal_length");
        assert_eq!(hist.histogram.counts.iter().sum::<usize>(), 150);
        let peak = hist.density.iter().map(|p| p.1).fold(0.0, f64::max);
        assert!(peak > 1.0 && peak < 2.0 * hist.histogram.max_count() as f64);
    }

    #[test]
    fn pair_grid_size_ignores_display_dimensions() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let fig = FigureBuilder::pair_grid(&table, "species", 40.0, &style()).unwrap();
        let options = DisplayOptions::default();
        assert_eq!(fig.pixel_size(&options, 1), (4 * 200 + 110, 800));
        assert_eq!(fig.pixel_size(&options, 2), (2 * (4 * 200 + 110), 1600));
    }

    #[test]
    fn tick_format_is_compact() {
        assert_eq!(format_tick(3.0), "3");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(0.126), "0.13");
        assert_eq!(format_tick(-1.504), "-1.5");
    }
}
