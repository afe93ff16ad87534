//! Stats module - descriptive statistics and density estimates

mod calculator;

pub use calculator::{ColumnSummary, CorrelationMatrix, Histogram, StatsCalculator};
