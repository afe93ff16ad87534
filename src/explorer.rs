//! Explorer orchestrator
//! Turns the current selections into a view model: the loaded dataset, its
//! summary statistics and the charts of the active tab. Every interaction
//! re-runs the whole evaluation; a chart that cannot be produced becomes a
//! failed panel instead of failing the view.

use crate::charts::{
    ChartCatalog, ChartId, ChartOutcome, ChartRenderer, ChartRequest, ChartResult,
    ColumnSelection, RenderedChart, Tab, NO_HUE,
};
use crate::config::DisplayOptions;
use crate::data::{DatasetKind, DatasetProvider, DatasetTable};
use crate::error::Result;
use crate::stats::{ColumnSummary, StatsCalculator};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Everything the user can choose in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub dataset: DatasetKind,
    pub tab: Tab,
    pub options: DisplayOptions,
    pub columns: ColumnSelection,
}

impl Selections {
    pub fn new(dataset: DatasetKind, options: DisplayOptions) -> Self {
        Self {
            dataset,
            options,
            ..Self::default()
        }
    }
}

/// What a chart panel shows.
#[derive(Debug, Clone)]
pub enum PanelContent {
    Rendered(ChartResult),
    /// Expected absence of a chart, e.g. no numeric columns to correlate.
    Notice(String),
    /// Rendering failed; the message is shown instead of the chart.
    Failed(String),
}

/// One collapsible chart section of a tab.
#[derive(Debug, Clone)]
pub struct ChartPanel {
    pub chart: ChartId,
    pub content: PanelContent,
}

impl ChartPanel {
    pub fn heading(&self) -> &'static str {
        self.chart.heading()
    }

    pub fn result(&self) -> Option<&ChartResult> {
        match &self.content {
            PanelContent::Rendered(result) => Some(result),
            _ => None,
        }
    }
}

/// The evaluated state of the window for one set of selections.
#[derive(Debug, Clone)]
pub struct ExplorerView {
    /// Selections with column choices resolved against the dataset.
    pub selections: Selections,
    /// The dataset as loaded, before any chart-specific derived columns.
    pub table: DatasetTable,
    pub summary: Vec<ColumnSummary>,
    pub panels: Vec<ChartPanel>,
}

impl ExplorerView {
    /// Choices of the x and y selectors.
    pub fn columns(&self) -> Vec<String> {
        self.table.columns()
    }

    /// Choices of the distribution column selector.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.table.numeric_columns()
    }

    /// Choices of the hue selector: "None" followed by every column.
    pub fn hue_choices(&self) -> Vec<String> {
        std::iter::once(NO_HUE.to_string())
            .chain(self.table.columns())
            .collect()
    }

    pub fn panel(&self, chart: ChartId) -> Option<&ChartPanel> {
        self.panels.iter().find(|p| p.chart == chart)
    }
}

/// Evaluates selections into views.
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    provider: DatasetProvider,
}

impl Explorer {
    pub fn new(provider: DatasetProvider) -> Self {
        Self { provider }
    }

    /// Reload the dataset, summarize it and render the active tab.
    pub fn evaluate(&self, selections: &Selections) -> Result<ExplorerView> {
        let started = Instant::now();
        let table = self.provider.load(selections.dataset)?;

        let mut selections = selections.clone();
        selections.options = selections.options.clamped();
        selections.columns = Self::resolve_columns(&table, &selections.columns);

        let summary = StatsCalculator::describe(&table)?;

        let charts = ChartId::catalog(selections.dataset, selections.tab);
        let mut prepared = table.clone();
        for &chart in &charts {
            ChartCatalog::prepare(&mut prepared, chart)?;
        }

        let panels: Vec<ChartPanel> = charts
            .par_iter()
            .map(|&chart| ChartPanel {
                chart,
                content: Self::render_panel(&prepared, &selections, chart),
            })
            .collect();

        info!(
            dataset = %selections.dataset,
            tab = ?selections.tab,
            charts = panels.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "view evaluated"
        );

        Ok(ExplorerView {
            selections,
            table,
            summary,
            panels,
        })
    }

    /// Re-render one chart of a view at `scale`× its display size.
    pub fn export(&self, view: &ExplorerView, chart: ChartId, scale: u32) -> Result<RenderedChart> {
        let mut table = view.table.clone();
        ChartCatalog::generate(&mut table, &Self::request(&view.selections, chart), scale)
    }

    /// Write a rendered chart's PNG bytes to `path`.
    pub fn save_png(result: &ChartResult, path: &Path) -> Result<()> {
        std::fs::write(path, &result.png)?;
        info!(
            chart = ?result.chart,
            path = %path.display(),
            bytes = result.png.len(),
            "chart saved"
        );
        Ok(())
    }

    /// Replace column choices that do not fit the dataset with defaults: the
    /// first numeric column for the distribution, the first two columns for
    /// the axes and no hue.
    pub fn resolve_columns(table: &DatasetTable, selection: &ColumnSelection) -> ColumnSelection {
        let columns = table.columns();
        let numeric = table.numeric_columns();
        let pick = |choice: &Option<String>, choices: &[String], default: Option<&String>| {
            choice
                .as_ref()
                .filter(|c| choices.contains(c))
                .or(default)
                .cloned()
        };

        ColumnSelection {
            distribution: pick(&selection.distribution, &numeric, numeric.first()),
            x: pick(&selection.x, &columns, columns.first()),
            y: pick(&selection.y, &columns, columns.get(1)),
            hue: pick(&selection.hue, &columns, None),
        }
    }

    fn request(selections: &Selections, chart: ChartId) -> ChartRequest {
        ChartRequest {
            dataset: selections.dataset,
            chart,
            selection: selections.columns.clone(),
            options: selections.options,
        }
    }

    fn render_panel(table: &DatasetTable, selections: &Selections, chart: ChartId) -> PanelContent {
        let request = Self::request(selections, chart);
        let rendered = ChartCatalog::build(table, &request).and_then(|outcome| match outcome {
            ChartOutcome::Figure(figure) => ChartRenderer::render(
                chart,
                figure,
                &request.options,
                1,
                chart.file_name(&request.selection),
            )
            .map(PanelContent::Rendered),
            ChartOutcome::Notice(text) => {
                info!(?chart, notice = %text, "chart replaced by notice");
                Ok(PanelContent::Notice(text))
            }
        });

        rendered.unwrap_or_else(|err| {
            warn!(?chart, error = %err, "chart failed");
            PanelContent::Failed(err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BILL_PER_PERSON;

    fn evaluate(dataset: DatasetKind, tab: Tab) -> ExplorerView {
        let selections = Selections {
            dataset,
            tab,
            ..Selections::default()
        };
        Explorer::default().evaluate(&selections).unwrap()
    }

    #[test]
    fn basic_tab_renders_dataset_chart() {
        let view = evaluate(DatasetKind::Titanic, Tab::Basic);
        assert_eq!(view.panels.len(), 1);
        let result = view.panels[0].result().unwrap();
        assert_eq!(result.file_name, "titanic_survival.png");
        assert!(!result.png.is_empty());
    }

    #[test]
    fn summary_covers_numeric_columns() {
        let view = evaluate(DatasetKind::Iris, Tab::Basic);
        let columns: Vec<_> = view.summary.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(
            columns,
            vec!["sepal_length", "sepal_width", "petal_length", "petal_width"]
        );
        assert_eq!(view.summary[0].count, 150);
    }

    #[test]
    fn view_table_excludes_derived_column() {
        let view = evaluate(DatasetKind::Tips, Tab::Advanced);
        assert!(!view.table.has_column(BILL_PER_PERSON));
        assert!(view.panel(ChartId::TipsInteraction).unwrap().result().is_some());
    }

    #[test]
    fn invalid_column_choices_fall_back() {
        let table = DatasetProvider::new().load(DatasetKind::Iris).unwrap();
        let resolved = Explorer::resolve_columns(
            &table,
            &ColumnSelection {
                distribution: Some("species".to_string()),
                x: Some("fare".to_string()),
                y: Some("petal_width".to_string()),
                hue: Some("missing".to_string()),
            },
        );
        assert_eq!(resolved.distribution.as_deref(), Some("sepal_length"));
        assert_eq!(resolved.x.as_deref(), Some("sepal_length"));
        assert_eq!(resolved.y.as_deref(), Some("petal_width"));
        assert_eq!(resolved.hue, None);
    }

    #[test]
    fn options_are_clamped() {
        let selections = Selections {
            options: DisplayOptions {
                width: 5000,
                height: 10,
                ..DisplayOptions::default()
            },
            ..Selections::default()
        };
        let view = Explorer::default().evaluate(&selections).unwrap();
        assert_eq!(view.selections.options.width, 1000);
        assert_eq!(view.selections.options.height, 300);
        let result = view.panels[0].result().unwrap();
        assert_eq!((result.width, result.height), (1000, 300));
    }

    #[test]
    fn export_uses_requested_scale() {
        let view = evaluate(DatasetKind::Iris, Tab::Basic);
        let RenderedChart::Image(result) = Explorer::default()
            .export(&view, ChartId::IrisScatter, 2)
            .unwrap()
        else {
            panic!("expected image");
        };
        assert_eq!((result.width, result.height), (1200, 800));
    }

    #[test]
    fn hue_choices_start_with_none() {
        let view = evaluate(DatasetKind::Tips, Tab::Interactive);
        let hues = view.hue_choices();
        assert_eq!(hues[0], NO_HUE);
        assert_eq!(hues.len(), view.columns().len() + 1);
    }
}
