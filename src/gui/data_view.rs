//! Dataset Overview Widget
//! Raw table with a per-column Blues gradient and the summary statistics
//! table.

use crate::charts::Colormap;
use crate::data::DatasetTable;
use crate::error::Result;
use crate::stats::ColumnSummary;
use egui::{Color32, RichText, ScrollArea};

const CELL_WIDTH: f32 = 95.0;
const ROW_HEIGHT: f32 = 20.0;
const TABLE_HEIGHT: f32 = 300.0;

/// One table column, pre-formatted for drawing.
struct ColumnView {
    name: String,
    labels: Vec<String>,
    /// Cell fills for numeric columns; `None` leaves a cell unshaded.
    shades: Option<Vec<Option<Color32>>>,
}

/// Cached cell text and shading of the current dataset.
#[derive(Default)]
pub struct DataView {
    dataset_label: String,
    columns: Vec<ColumnView>,
    rows: usize,
    summary: Vec<ColumnSummary>,
}

impl DataView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the cached cells for a newly loaded table.
    pub fn set_table(
        &mut self,
        table: &DatasetTable,
        summary: &[ColumnSummary],
        preview_rows: Option<usize>,
    ) -> Result<()> {
        let rows = preview_rows
            .map(|limit| limit.min(table.row_count()))
            .unwrap_or(table.row_count());

        let mut columns = Vec::new();
        for name in table.columns() {
            let labels: Vec<String> = table
                .labels(&name)?
                .into_iter()
                .take(rows)
                .map(|l| l.unwrap_or_default())
                .collect();

            let shades = if table.is_numeric(&name)? {
                Some(Self::shades(&table.numeric_values(&name)?[..rows]))
            } else {
                None
            };

            columns.push(ColumnView {
                name,
                labels,
                shades,
            });
        }

        self.dataset_label = table.kind().label().to_string();
        self.columns = columns;
        self.rows = rows;
        self.summary = summary.to_vec();
        Ok(())
    }

    /// Blues gradient normalized to the column's own min..max.
    fn shades(values: &[Option<f64>]) -> Vec<Option<Color32>> {
        let present = values.iter().flatten().copied();
        let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let span = hi - lo;

        values
            .iter()
            .map(|v| {
                v.map(|v| {
                    let t = if span > 0.0 { (v - lo) / span } else { 0.0 };
                    let [r, g, b] = Colormap::Blues.interpolate(t);
                    Color32::from_rgb(r, g, b)
                })
            })
            .collect()
    }

    /// Draw the dataset overview
    pub fn show(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Displaying the");
            ui.label(RichText::new(&self.dataset_label).strong());
            ui.label("dataset:");
        });
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().extreme_bg_color)
            .rounding(10.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::horizontal()
                    .id_salt("raw_table_h")
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.horizontal(|ui| {
                                ui.add_sized([40.0, ROW_HEIGHT], egui::Label::new(""));
                                for column in &self.columns {
                                    ui.add_sized(
                                        [CELL_WIDTH, ROW_HEIGHT],
                                        egui::Label::new(RichText::new(&column.name).strong()),
                                    );
                                }
                            });
                            ui.separator();

                            ScrollArea::vertical()
                                .id_salt("raw_table_v")
                                .max_height(TABLE_HEIGHT)
                                .auto_shrink([false, true])
                                .show_rows(ui, ROW_HEIGHT, self.rows, |ui, row_range| {
                                    for row in row_range {
                                        self.show_row(ui, row);
                                    }
                                });
                        });
                    });
            });

        ui.add_space(10.0);
        ui.label(RichText::new("📋 Summary Statistics").size(16.0).strong());
        ui.add_space(5.0);
        self.show_summary(ui);
    }

    fn show_row(&self, ui: &mut egui::Ui, row: usize) {
        ui.horizontal(|ui| {
            ui.add_sized(
                [40.0, ROW_HEIGHT],
                egui::Label::new(RichText::new(row.to_string()).color(Color32::GRAY)),
            );
            for column in &self.columns {
                let text = column.labels.get(row).map(String::as_str).unwrap_or("");
                let mut cell = RichText::new(text);
                let fill = column
                    .shades
                    .as_ref()
                    .and_then(|s| s.get(row).copied().flatten());
                if let Some(fill) = fill {
                    let ink = if fill.r() as u32 + fill.g() as u32 + fill.b() as u32 > 384 {
                        Color32::BLACK
                    } else {
                        Color32::WHITE
                    };
                    cell = cell.background_color(fill).color(ink);
                }
                ui.add_sized([CELL_WIDTH, ROW_HEIGHT], egui::Label::new(cell));
            }
        });
    }

    /// Statistics as rows, numeric columns as columns.
    fn show_summary(&self, ui: &mut egui::Ui) {
        if self.summary.is_empty() {
            ui.label("No numeric columns to summarize.");
            return;
        }

        egui::Grid::new("summary_stats")
            .striped(true)
            .min_col_width(CELL_WIDTH)
            .show(ui, |ui| {
                ui.label("");
                for summary in &self.summary {
                    ui.label(RichText::new(&summary.column).strong());
                }
                ui.end_row();

                for (i, label) in ColumnSummary::ROW_LABELS.iter().enumerate() {
                    ui.label(RichText::new(*label).strong());
                    for summary in &self.summary {
                        ui.label(format!("{:.6}", summary.values()[i]));
                    }
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shades_span_the_column_range() {
        let shades = DataView::shades(&[Some(1.0), None, Some(3.0)]);
        let [r, g, b] = Colormap::Blues.interpolate(0.0);
        assert_eq!(shades[0], Some(Color32::from_rgb(r, g, b)));
        assert_eq!(shades[1], None);
        let [r, g, b] = Colormap::Blues.interpolate(1.0);
        assert_eq!(shades[2], Some(Color32::from_rgb(r, g, b)));
    }
}
