//! Chart Viewer Widget
//! Tabbed chart area: one collapsible card per chart with its image,
//! column selectors where the chart has them, and a download button.

use crate::charts::{ChartId, ColumnSelection, Tab, NO_HUE};
use crate::explorer::{ExplorerView, PanelContent};
use egui::{Color32, ComboBox, RichText, TextureHandle, TextureOptions};
use std::collections::HashMap;

const CARD_SPACING: f32 = 15.0;

/// Chart textures of the current view.
#[derive(Default)]
pub struct ChartViewer {
    textures: HashMap<ChartId, TextureHandle>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the rendered charts of a new view as textures.
    pub fn set_view(&mut self, ctx: &egui::Context, view: &ExplorerView) {
        self.textures.clear();
        for panel in &view.panels {
            if let Some(result) = panel.result() {
                let image = egui::ColorImage::from_rgb(
                    [result.width as usize, result.height as usize],
                    &result.rgb,
                );
                let texture =
                    ctx.load_texture(result.file_name.clone(), image, TextureOptions::LINEAR);
                self.textures.insert(panel.chart, texture);
            }
        }
    }

    /// Draw the tab bar and the active tab's chart cards.
    pub fn show(&self, ui: &mut egui::Ui, view: &ExplorerView) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        let mut tab = view.selections.tab;
        ui.horizontal(|ui| {
            for candidate in Tab::ALL {
                ui.selectable_value(
                    &mut tab,
                    candidate,
                    RichText::new(candidate.label()).size(15.0),
                );
            }
        });
        if tab != view.selections.tab {
            return ChartViewerAction::TabChanged(tab);
        }

        ui.separator();
        let header = match tab {
            Tab::Basic => "Basic Visualizations",
            Tab::Advanced => "Advanced Analysis",
            Tab::Interactive => "Interactive Explorer",
        };
        ui.heading(header);
        ui.add_space(8.0);

        let mut columns = view.selections.columns.clone();
        for panel in &view.panels {
            egui::CollapsingHeader::new(RichText::new(panel.heading()).size(16.0).strong())
                .id_salt(panel.chart)
                .default_open(panel.chart.expanded_by_default())
                .show(ui, |ui| {
                    match panel.chart {
                        ChartId::Distribution => {
                            Self::distribution_selector(ui, view, &mut columns)
                        }
                        ChartId::CustomScatter => Self::scatter_selectors(ui, view, &mut columns),
                        _ => {}
                    }

                    match &panel.content {
                        PanelContent::Rendered(_) => {
                            if let Some(texture) = self.textures.get(&panel.chart) {
                                ui.add(
                                    egui::Image::new((texture.id(), texture.size_vec2()))
                                        .shrink_to_fit(),
                                );
                            }
                            if let Some(caption) = panel.chart.caption() {
                                ui.label(caption);
                            }
                            if ui.button(panel.chart.download_label()).clicked() {
                                action = ChartViewerAction::Download(panel.chart);
                            }
                        }
                        PanelContent::Notice(text) => {
                            ui.label(text);
                        }
                        PanelContent::Failed(error) => {
                            ui.label(
                                RichText::new(format!("Could not render chart: {error}"))
                                    .color(Color32::from_rgb(220, 53, 69)),
                            );
                        }
                    }
                });
            ui.add_space(CARD_SPACING);
        }

        if columns != view.selections.columns {
            action = ChartViewerAction::ColumnsChanged(columns);
        }
        action
    }

    fn distribution_selector(
        ui: &mut egui::Ui,
        view: &ExplorerView,
        columns: &mut ColumnSelection,
    ) {
        ui.horizontal(|ui| {
            ui.label("Select column for distribution:");
            Self::column_combo(
                ui,
                "distribution_col",
                &view.numeric_columns(),
                &mut columns.distribution,
            );
        });
        ui.add_space(5.0);
    }

    fn scatter_selectors(ui: &mut egui::Ui, view: &ExplorerView, columns: &mut ColumnSelection) {
        let all = view.columns();
        ui.horizontal(|ui| {
            ui.label("Select X-axis");
            Self::column_combo(ui, "x_col", &all, &mut columns.x);
            ui.add_space(10.0);
            ui.label("Select Y-axis");
            Self::column_combo(ui, "y_col", &all, &mut columns.y);
            ui.add_space(10.0);
            ui.label("Select Hue (color)");

            let mut hue = columns.hue.clone().unwrap_or_else(|| NO_HUE.to_string());
            ComboBox::from_id_salt("hue_col")
                .width(130.0)
                .selected_text(hue.clone())
                .show_ui(ui, |ui| {
                    for choice in view.hue_choices() {
                        let label = choice.clone();
                        ui.selectable_value(&mut hue, choice, label);
                    }
                });
            columns.hue = (hue != NO_HUE).then_some(hue);
        });
        ui.add_space(5.0);
    }

    fn column_combo(
        ui: &mut egui::Ui,
        id: &str,
        choices: &[String],
        selected: &mut Option<String>,
    ) {
        ComboBox::from_id_salt(id)
            .width(130.0)
            .selected_text(selected.as_deref().unwrap_or(""))
            .show_ui(ui, |ui| {
                for choice in choices {
                    if ui
                        .selectable_label(selected.as_deref() == Some(choice.as_str()), choice)
                        .clicked()
                    {
                        *selected = Some(choice.clone());
                    }
                }
            });
    }
}

/// Actions triggered in the chart area
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    TabChanged(Tab),
    ColumnsChanged(ColumnSelection),
    Download(ChartId),
}
