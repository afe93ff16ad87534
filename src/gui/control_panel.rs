//! Control Panel Widget
//! Left side panel with dataset selection and visualization controls.

use crate::config::{DisplayOptions, Theme, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use crate::data::DatasetKind;
use egui::{Color32, ComboBox, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub dataset: DatasetKind,
    pub options: DisplayOptions,
    pub status: String,
    pub status_is_error: bool,
}

impl ControlPanel {
    pub fn new(dataset: DatasetKind, options: DisplayOptions) -> Self {
        Self {
            dataset,
            options: options.clamped(),
            status: "Ready".to_string(),
            status_is_error: false,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = true;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let before = (self.dataset, self.options);

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Data Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(52, 152, 219)),
            );
            ui.label(
                RichText::new("Explore datasets with Rust")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Dataset Section =====
        ui.label(RichText::new("📁 Dataset Selection").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Choose a dataset:"));
            ComboBox::from_id_salt("dataset")
                .width(150.0)
                .selected_text(self.dataset.label())
                .show_ui(ui, |ui| {
                    for kind in DatasetKind::ALL {
                        ui.selectable_value(&mut self.dataset, kind, kind.label());
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Visualization Controls =====
        let controls_title = RichText::new("🎛 Visualization Controls").size(14.0).strong();
        egui::CollapsingHeader::new(controls_title)
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.add_sized([110.0, 20.0], egui::Label::new("Color Theme:"));
                    ComboBox::from_id_salt("theme")
                        .width(150.0)
                        .selected_text(self.options.theme.label())
                        .show_ui(ui, |ui| {
                            for theme in Theme::ALL {
                                ui.selectable_value(&mut self.options.theme, theme, theme.label());
                            }
                        });
                });

                ui.add_space(8.0);
                ui.add(
                    egui::Slider::new(&mut self.options.width, MIN_WIDTH..=MAX_WIDTH)
                        .text("Plot Width"),
                );
                ui.add(
                    egui::Slider::new(&mut self.options.height, MIN_HEIGHT..=MAX_HEIGHT)
                        .text("Plot Height"),
                );

                ui.add_space(5.0);
                ui.checkbox(&mut self.options.animate, "Enable animations");
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📋 Status").size(14.0).strong());
        ui.add_space(5.0);
        let status_color = if self.status_is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if (self.dataset, self.options) != before {
            ControlPanelAction::SelectionChanged
        } else {
            ControlPanelAction::None
        }
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
}
