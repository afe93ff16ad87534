//! Chart Catalog
//! The fixed table of charts per (dataset, tab), with their wording and
//! download filenames, and the dispatch from a request to its figure.

use crate::charts::figure::{Figure, FigureBuilder, ScatterSpec};
use crate::charts::palette::ThemeStyle;
use crate::charts::renderer::{ChartRenderer, ChartResult};
use crate::config::DisplayOptions;
use crate::data::{DataProcessor, DatasetKind, DatasetTable, BILL_PER_PERSON};
use crate::error::{ExplorerError, Result};
use tracing::debug;

pub const NO_NUMERIC_NOTICE: &str =
    "No numeric features to compute correlation for this dataset.";

pub const INTERACTION_CAPTION: &str =
    "Created 'bill_per_person' by dividing 'total_bill' by 'size' to analyze spending per person.";

const HEATMAP_TITLE: &str = "Correlation Matrix";

/// Pair plot marker area; unaffected by the animate option.
const PAIR_MARKER_AREA: f64 = 36.0;

/// Label of the "no hue" choice in the hue selector.
pub const NO_HUE: &str = "None";

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Basic,
    Advanced,
    Interactive,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Basic, Tab::Advanced, Tab::Interactive];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Basic => "📈 Basic Visualizations",
            Tab::Advanced => "📊 Advanced Analysis",
            Tab::Interactive => "🔍 Interactive Explorer",
        }
    }
}

/// Every chart the dashboard can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    IrisScatter,
    TitanicSurvival,
    TipsScatter,
    CorrelationHeatmap,
    IrisPairPlot,
    Distribution,
    TipsInteraction,
    CustomScatter,
}

impl ChartId {
    /// Charts shown for a dataset on a tab, in display order.
    pub fn catalog(dataset: DatasetKind, tab: Tab) -> Vec<ChartId> {
        match tab {
            Tab::Basic => match dataset {
                DatasetKind::Iris => vec![ChartId::IrisScatter],
                DatasetKind::Titanic => vec![ChartId::TitanicSurvival],
                DatasetKind::Tips => vec![ChartId::TipsScatter],
            },
            Tab::Advanced => {
                let mut charts = vec![ChartId::CorrelationHeatmap];
                if dataset == DatasetKind::Iris {
                    charts.push(ChartId::IrisPairPlot);
                }
                charts.push(ChartId::Distribution);
                if dataset == DatasetKind::Tips {
                    charts.push(ChartId::TipsInteraction);
                }
                charts
            }
            Tab::Interactive => vec![ChartId::CustomScatter],
        }
    }

    /// Section heading of the chart's panel.
    pub fn heading(&self) -> &'static str {
        match self {
            ChartId::IrisScatter => "🌺 Iris Scatter Plot",
            ChartId::TitanicSurvival => "🚢 Titanic Survival Count",
            ChartId::TipsScatter => "🍽 Tips Analysis",
            ChartId::CorrelationHeatmap => "🔥 Correlation Heatmap",
            ChartId::IrisPairPlot => "🔄 Pair Plots",
            ChartId::Distribution => "📊 Distribution Plots",
            ChartId::TipsInteraction => "🧩 Feature Interaction",
            ChartId::CustomScatter => "🖱 Interactive Scatter Plot",
        }
    }

    /// Whether the panel starts expanded.
    pub fn expanded_by_default(&self) -> bool {
        !matches!(self, ChartId::Distribution)
    }

    pub fn download_label(&self) -> &'static str {
        match self {
            ChartId::IrisScatter | ChartId::TitanicSurvival | ChartId::TipsScatter => {
                "Download Plot"
            }
            ChartId::CorrelationHeatmap => "Download Heatmap",
            ChartId::IrisPairPlot => "Download Pair Plot",
            ChartId::Distribution => "Download Distribution Plot",
            ChartId::TipsInteraction => "Download Interaction Plot",
            ChartId::CustomScatter => "Download Custom Plot",
        }
    }

    /// Download filename; the distribution chart is named after its column.
    pub fn file_name(&self, selection: &ColumnSelection) -> String {
        match self {
            ChartId::IrisScatter => "iris_scatter.png".to_string(),
            ChartId::TitanicSurvival => "titanic_survival.png".to_string(),
            ChartId::TipsScatter => "tips_scatter.png".to_string(),
            ChartId::CorrelationHeatmap => "correlation_heatmap.png".to_string(),
            ChartId::IrisPairPlot => "iris_pairplot.png".to_string(),
            ChartId::Distribution => format!(
                "{}_distribution.png",
                selection.distribution.as_deref().unwrap_or("column")
            ),
            ChartId::TipsInteraction => "tips_interaction.png".to_string(),
            ChartId::CustomScatter => "custom_scatter.png".to_string(),
        }
    }

    /// Explanatory text shown under the chart.
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            ChartId::TipsInteraction => Some(INTERACTION_CAPTION),
            _ => None,
        }
    }
}

/// Column choices made in the dashboard's selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    /// Column of the distribution plot.
    pub distribution: Option<String>,
    /// Axes of the custom scatter plot.
    pub x: Option<String>,
    pub y: Option<String>,
    /// `None` plots a single series.
    pub hue: Option<String>,
}

/// Input of one chart generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub dataset: DatasetKind,
    pub chart: ChartId,
    pub selection: ColumnSelection,
    pub options: DisplayOptions,
}

/// A figure ready to render, or the notice that replaces it.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Figure(Figure),
    Notice(String),
}

/// A rendered chart, or the notice that replaces it.
#[derive(Debug, Clone)]
pub enum RenderedChart {
    Image(ChartResult),
    Notice(String),
}

/// Dispatches chart requests to their figure builders.
pub struct ChartCatalog;

impl ChartCatalog {
    /// Apply the table mutation a chart depends on. Idempotent.
    pub fn prepare(table: &mut DatasetTable, chart: ChartId) -> Result<()> {
        if chart == ChartId::TipsInteraction {
            DataProcessor::add_bill_per_person(table)?;
        }
        Ok(())
    }

    /// Build the figure for a request. The table must already be prepared.
    pub fn build(table: &DatasetTable, request: &ChartRequest) -> Result<ChartOutcome> {
        let options = request.options;
        let style = ThemeStyle::for_theme(options.theme);
        debug!(chart = ?request.chart, dataset = %request.dataset, "building figure");

        let figure = match request.chart {
            ChartId::IrisScatter => FigureBuilder::scatter(
                table,
                &ScatterSpec {
                    title: "Iris Dataset - Sepal Dimensions".to_string(),
                    x: "sepal_length".to_string(),
                    y: "sepal_width".to_string(),
                    hue: Some("species".to_string()),
                    x_label: "Sepal Length (cm)".to_string(),
                    y_label: "Sepal Width (cm)".to_string(),
                    marker_area: options.marker_area(100.0),
                    grid: true,
                },
                &style,
            )?,
            ChartId::TitanicSurvival => FigureBuilder::count(
                table,
                "survived",
                "class",
                "Titanic Survival by Class",
                "Survived",
                "Class",
                options.theme,
            )?,
            ChartId::TipsScatter => FigureBuilder::scatter(
                table,
                &ScatterSpec {
                    title: "Tips vs Total Bill".to_string(),
                    x: "total_bill".to_string(),
                    y: "tip".to_string(),
                    hue: Some("sex".to_string()),
                    x_label: "Total Bill ($)".to_string(),
                    y_label: "Tip ($)".to_string(),
                    marker_area: options.marker_area(80.0),
                    grid: false,
                },
                &style,
            )?,
            ChartId::CorrelationHeatmap => match FigureBuilder::heatmap(table, HEATMAP_TITLE)? {
                Some(figure) => figure,
                None => {
                    debug!(dataset = %request.dataset, "no numeric columns for correlation");
                    return Ok(ChartOutcome::Notice(NO_NUMERIC_NOTICE.to_string()));
                }
            },
            ChartId::IrisPairPlot => {
                FigureBuilder::pair_grid(table, "species", PAIR_MARKER_AREA, &style)?
            }
            ChartId::Distribution => {
                let column = match &request.selection.distribution {
                    Some(column) => column.clone(),
                    None => match table.numeric_columns().into_iter().next() {
                        Some(column) => column,
                        None => {
                            return Ok(ChartOutcome::Notice(
                                "No numeric columns to plot for this dataset.".to_string(),
                            ))
                        }
                    },
                };
                FigureBuilder::distribution(table, &column, &style)?
            }
            ChartId::TipsInteraction => FigureBuilder::scatter(
                table,
                &ScatterSpec {
                    title: "Tip vs. Bill per Person by Gender".to_string(),
                    x: BILL_PER_PERSON.to_string(),
                    y: "tip".to_string(),
                    hue: Some("sex".to_string()),
                    x_label: "Bill per Person ($)".to_string(),
                    y_label: "Tip ($)".to_string(),
                    marker_area: options.marker_area(80.0),
                    grid: false,
                },
                &style,
            )?,
            ChartId::CustomScatter => {
                let columns = table.columns();
                let x = request
                    .selection
                    .x
                    .clone()
                    .or_else(|| columns.first().cloned())
                    .ok_or_else(|| ExplorerError::UnknownColumn("x".to_string()))?;
                let y = request
                    .selection
                    .y
                    .clone()
                    .or_else(|| columns.get(1).cloned())
                    .ok_or_else(|| ExplorerError::UnknownColumn("y".to_string()))?;
                FigureBuilder::scatter(
                    table,
                    &ScatterSpec {
                        title: format!("{y} vs {x}"),
                        hue: request.selection.hue.clone(),
                        x_label: x.clone(),
                        y_label: y.clone(),
                        x,
                        y,
                        marker_area: options.marker_area(80.0),
                        grid: false,
                    },
                    &style,
                )?
            }
        };

        Ok(ChartOutcome::Figure(figure))
    }

    /// Fill unset column choices with the columns `build` falls back to, so
    /// the file name names the plotted column.
    pub fn resolved(table: &DatasetTable, request: &ChartRequest) -> ChartRequest {
        let mut request = request.clone();
        let selection = &mut request.selection;
        match request.chart {
            ChartId::Distribution if selection.distribution.is_none() => {
                selection.distribution = table.numeric_columns().into_iter().next();
            }
            ChartId::CustomScatter => {
                let columns = table.columns();
                if selection.x.is_none() {
                    selection.x = columns.first().cloned();
                }
                if selection.y.is_none() {
                    selection.y = columns.get(1).cloned();
                }
            }
            _ => {}
        }
        request
    }

    /// Prepare, build and render a request at `scale`× its display size.
    pub fn generate(
        table: &mut DatasetTable,
        request: &ChartRequest,
        scale: u32,
    ) -> Result<RenderedChart> {
        Self::prepare(table, request.chart)?;
        let request = &Self::resolved(table, request);
        match Self::build(table, request)? {
            ChartOutcome::Figure(figure) => {
                let file_name = request.chart.file_name(&request.selection);
                let result = ChartRenderer::render(
                    request.chart,
                    figure,
                    &request.options,
                    scale,
                    file_name,
                )?;
                Ok(RenderedChart::Image(result))
            }
            ChartOutcome::Notice(text) => Ok(RenderedChart::Notice(text)),
        }
    }
}
