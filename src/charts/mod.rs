//! Charts module - chart catalog, figure model and rendering

mod catalog;
mod figure;
mod palette;
mod renderer;

pub use catalog::{
    ChartCatalog, ChartId, ChartOutcome, ChartRequest, ColumnSelection, RenderedChart, Tab,
    INTERACTION_CAPTION, NO_HUE, NO_NUMERIC_NOTICE,
};
pub use figure::{
    format_tick, Axis, AxisKind, CountFigure, CountGroup, Figure, FigureBuilder, HeatmapFigure,
    HistogramFigure, PairGridFigure, PairGroup, ScatterFigure, ScatterSeries, ScatterSpec,
};
pub use palette::{parse_hex_color, Colormap, Rgb, ThemeStyle};
pub use renderer::{ChartRenderer, ChartResult};
