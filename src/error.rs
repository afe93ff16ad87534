//! Error types shared by the data, chart and configuration layers.

use plotters::drawing::DrawingAreaErrorKind;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("Column is not numeric: {0}")]
    NonNumericColumn(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Download error: {0}")]
    Download(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for ExplorerError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ExplorerError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
