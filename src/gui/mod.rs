//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;
mod data_view;

pub use app::ExplorerApp;
pub use chart_viewer::{ChartViewer, ChartViewerAction};
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use data_view::DataView;
