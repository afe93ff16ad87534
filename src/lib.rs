//! Data Explorer - interactive dashboard over the Iris, Titanic and Tips
//! datasets.
//!
//! The library holds everything but the window: bundled datasets and their
//! schema reflection, descriptive statistics, the chart catalog with its
//! plotters renderer, and the orchestrator that turns the current selections
//! into a view. The `gui` module draws that view with egui.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod explorer;
pub mod gui;
pub mod stats;
pub mod telemetry;

pub use config::{AppConfig, DisplayOptions, Theme};
pub use error::{ExplorerError, Result};
pub use explorer::{ChartPanel, Explorer, ExplorerView, PanelContent, Selections};
