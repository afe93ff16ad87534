//! Display options and application configuration.
//!
//! `DisplayOptions` is what the control panel edits on every interaction.
//! `AppConfig` seeds those options at startup from an optional
//! `data_explorer.json` in the working directory; a missing file means
//! defaults, a malformed one is logged and ignored.

use crate::data::{DatasetKind, DatasetProvider, RemoteSource};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "data_explorer.json";

pub const MIN_WIDTH: u32 = 400;
pub const MAX_WIDTH: u32 = 1000;
pub const MIN_HEIGHT: u32 = 300;
pub const MAX_HEIGHT: u32 = 800;

/// Color theme applied to every chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Pastel,
    Bright,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Dark, Theme::Pastel, Theme::Bright];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Dark => "Dark",
            Theme::Pastel => "Pastel",
            Theme::Bright => "Bright",
        }
    }
}

/// User-configured rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub theme: Theme,
    pub width: u32,
    pub height: u32,
    pub animate: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            width: 600,
            height: 400,
            animate: true,
        }
    }
}

impl DisplayOptions {
    /// Width and height forced into the slider ranges.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: self.height.clamp(MIN_HEIGHT, MAX_HEIGHT),
            ..self
        }
    }

    /// Pixel size of a figure rendered at `scale`.
    pub fn figure_size(&self, scale: u32) -> (u32, u32) {
        let opts = self.clamped();
        let scale = scale.max(1);
        (opts.width * scale, opts.height * scale)
    }

    /// Marker area for a chart whose animated variant uses `animated_area`.
    /// Turning animation off halves it.
    pub fn marker_area(&self, animated_area: f64) -> f64 {
        if self.animate {
            animated_area
        } else {
            animated_area / 2.0
        }
    }
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayOptions,
    pub default_dataset: String,
    /// Multiplier applied to the on-screen size for downloaded PNGs.
    pub export_scale: u32,
    /// Row limit for the raw table view; `None` shows every row.
    pub table_preview_rows: Option<usize>,
    /// Directory holding `iris.csv`, `titanic.csv` and `tips.csv` that
    /// replace the bundled copies.
    pub data_dir: Option<PathBuf>,
    /// Download the full Tips and Titanic tables instead of showing the
    /// bundled excerpts.
    pub fetch_full_datasets: bool,
    /// Download cache; `None` uses `$SEABORN_DATA` or `~/seaborn-data`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayOptions::default(),
            default_dataset: DatasetKind::Iris.label().to_string(),
            export_scale: 3,
            table_preview_rows: None,
            data_dir: None,
            fetch_full_datasets: true,
            cache_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Load `data_explorer.json` from `dir`, falling back to defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };

        match Self::from_json(&text) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed configuration");
                Self::default()
            }
        }
    }

    /// Dataset provider honoring `data_dir` and the download settings.
    pub fn dataset_provider(&self) -> DatasetProvider {
        let provider = DatasetProvider::with_data_dir(self.data_dir.clone());
        if !self.fetch_full_datasets {
            return provider;
        }
        match RemoteSource::seaborn(self.cache_dir.clone()) {
            Some(remote) => provider.with_remote(remote),
            None => {
                warn!("no cache directory for full datasets, using bundled copies");
                provider
            }
        }
    }

    /// The configured startup dataset, or Iris when the name is unknown.
    pub fn startup_dataset(&self) -> DatasetKind {
        match self.default_dataset.parse::<DatasetKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(error = %e, "falling back to Iris");
                DatasetKind::Iris
            }
        }
    }

    fn normalized(self) -> Self {
        Self {
            display: self.display.clamped(),
            export_scale: self.export_scale.clamp(1, 4),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_dimensions() {
        let opts = DisplayOptions {
            width: 5000,
            height: 10,
            ..DisplayOptions::default()
        }
        .clamped();
        assert_eq!(opts.width, MAX_WIDTH);
        assert_eq!(opts.height, MIN_HEIGHT);
    }

    #[test]
    fn figure_size_scales_linearly() {
        let opts = DisplayOptions {
            width: 500,
            height: 350,
            ..DisplayOptions::default()
        };
        assert_eq!(opts.figure_size(1), (500, 350));
        assert_eq!(opts.figure_size(3), (1500, 1050));
    }

    #[test]
    fn animation_doubles_marker_area() {
        let on = DisplayOptions::default();
        let off = DisplayOptions {
            animate: false,
            ..on
        };
        assert_eq!(on.marker_area(100.0), 2.0 * off.marker_area(100.0));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "display": { "theme": "Dark" }, "export_scale": 9 }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.display.theme, Theme::Dark);
        assert_eq!(config.display.width, 600);
        assert_eq!(config.export_scale, 4);
        assert_eq!(config.startup_dataset(), DatasetKind::Iris);
    }

    #[test]
    fn unknown_startup_dataset_falls_back_to_iris() {
        let config = AppConfig {
            default_dataset: "Penguins".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.startup_dataset(), DatasetKind::Iris);
    }

    #[test]
    fn offline_config_keeps_bundled_data() {
        let config = AppConfig::from_json(r#"{ "fetch_full_datasets": false }"#).unwrap();
        let table = config.dataset_provider().load(DatasetKind::Iris).unwrap();
        assert_eq!(table.row_count(), 150);
        assert!(AppConfig::default().fetch_full_datasets);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
