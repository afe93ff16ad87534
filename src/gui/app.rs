//! Data Explorer Main Application
//! Main window with control panel, dataset overview and chart tabs.

use crate::charts::{ChartId, RenderedChart};
use crate::config::AppConfig;
use crate::error::Result;
use crate::explorer::{Explorer, ExplorerView, Selections};
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction, DataView};
use egui::{RichText, SidePanel};
use tracing::{info, warn};

/// Main application window.
pub struct ExplorerApp {
    config: AppConfig,
    explorer: Explorer,
    selections: Selections,
    view: Option<ExplorerView>,

    control_panel: ControlPanel,
    data_view: DataView,
    chart_viewer: ChartViewer,

    /// Set by any interaction; the next frame re-evaluates the view.
    needs_refresh: bool,
    pending_download: Option<ChartId>,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let selections = Selections::new(config.startup_dataset(), config.display);
        let explorer = Explorer::new(config.dataset_provider());
        info!(dataset = %selections.dataset, "starting explorer");

        Self {
            control_panel: ControlPanel::new(selections.dataset, selections.options),
            data_view: DataView::new(),
            chart_viewer: ChartViewer::new(),
            config,
            explorer,
            selections,
            view: None,
            needs_refresh: true,
            pending_download: None,
        }
    }

    /// Re-run the whole evaluation for the current selections.
    fn refresh(&mut self, ctx: &egui::Context) {
        self.needs_refresh = false;
        match self.evaluate(ctx) {
            Ok(charts) => self.control_panel.set_status(format!(
                "{} dataset, {} charts ready",
                self.selections.dataset, charts
            )),
            Err(e) => {
                warn!(error = %e, "evaluation failed");
                self.control_panel.set_error(format!("Error: {e}"));
            }
        }
    }

    fn evaluate(&mut self, ctx: &egui::Context) -> Result<usize> {
        let view = self.explorer.evaluate(&self.selections)?;
        self.data_view
            .set_table(&view.table, &view.summary, self.config.table_preview_rows)?;
        self.chart_viewer.set_view(ctx, &view);

        let charts = view.panels.len();
        // Keep resolved column defaults so selectors show them.
        self.selections = view.selections.clone();
        self.view = Some(view);
        Ok(charts)
    }

    /// Ask for a target path, re-render at export scale and save.
    fn handle_download(&mut self, chart: ChartId) {
        let Some(view) = &self.view else {
            return;
        };
        let file_name = chart.file_name(&view.selections.columns);

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(&file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        let saved = self
            .explorer
            .export(view, chart, self.config.export_scale)
            .and_then(|rendered| match rendered {
                RenderedChart::Image(result) => {
                    Explorer::save_png(&result, &path)?;
                    Ok(Some(result.png.len()))
                }
                RenderedChart::Notice(_) => Ok(None),
            });

        match saved {
            Ok(Some(bytes)) => self
                .control_panel
                .set_status(format!("Saved {} ({} KB)", path.display(), bytes / 1024)),
            Ok(None) => self.control_panel.set_status("Nothing to download for this chart"),
            Err(e) => {
                warn!(error = %e, "download failed");
                self.control_panel.set_error(format!("Download error: {e}"));
            }
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.needs_refresh {
            self.refresh(ctx);
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.control_panel.show(ui) == ControlPanelAction::SelectionChanged {
                        self.selections.dataset = self.control_panel.dataset;
                        self.selections.options = self.control_panel.options;
                        self.needs_refresh = true;
                    }
                });
            });

        // Central panel - overview and charts
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("main_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.label(RichText::new("📊 Data Analysis Application").size(26.0).strong());
                    ui.label(RichText::new("Explore datasets with plotters and egui").size(14.0));
                    ui.separator();

                    let Some(view) = &self.view else {
                        ui.centered_and_justified(|ui| {
                            ui.label(RichText::new("No Data").size(20.0));
                        });
                        return;
                    };

                    egui::CollapsingHeader::new(
                        RichText::new("📁 Dataset Overview").size(16.0).strong(),
                    )
                    .default_open(true)
                    .show(ui, |ui| self.data_view.show(ui));

                    ui.separator();

                    match self.chart_viewer.show(ui, view) {
                        ChartViewerAction::None => {}
                        ChartViewerAction::TabChanged(tab) => {
                            self.selections.tab = tab;
                            self.needs_refresh = true;
                        }
                        ChartViewerAction::ColumnsChanged(columns) => {
                            self.selections.columns = columns;
                            self.needs_refresh = true;
                        }
                        ChartViewerAction::Download(chart) => self.pending_download = Some(chart),
                    }
                });
        });

        if let Some(chart) = self.pending_download.take() {
            self.handle_download(chart);
        }

        if self.needs_refresh {
            ctx.request_repaint();
        }
    }
}
