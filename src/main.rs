//! Data Explorer - desktop entry point.

use data_explorer::gui::ExplorerApp;
use data_explorer::{telemetry, AppConfig};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    if !telemetry::init_tracing() {
        eprintln!("tracing subscriber already installed");
    }

    let config = AppConfig::load_or_default(&std::env::current_dir()?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Data Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Data Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run window: {e}"))
}
