//! Dataset Provider
//! Resolves a dataset name to its table. Sources, first match wins: the
//! override directory, the full seaborn copy (cached or downloaded), the
//! bundled CSV.

use crate::data::{DatasetTable, RemoteSource};
use crate::error::{ExplorerError, Result};
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

const IRIS_CSV: &str = include_str!("../../data/iris.csv");
const TITANIC_CSV: &str = include_str!("../../data/titanic.csv");
const TIPS_CSV: &str = include_str!("../../data/tips.csv");

/// The closed set of example datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatasetKind {
    #[default]
    Iris,
    Titanic,
    Tips,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Iris, DatasetKind::Titanic, DatasetKind::Tips];

    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Iris => "Iris",
            DatasetKind::Titanic => "Titanic",
            DatasetKind::Tips => "Tips",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetKind::Iris => "iris.csv",
            DatasetKind::Titanic => "titanic.csv",
            DatasetKind::Tips => "tips.csv",
        }
    }

    /// Column names every copy of this dataset must carry, in order.
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Iris => &[
                "sepal_length",
                "sepal_width",
                "petal_length",
                "petal_width",
                "species",
            ],
            DatasetKind::Titanic => &[
                "survived",
                "pclass",
                "sex",
                "age",
                "sibsp",
                "parch",
                "fare",
                "embarked",
                "class",
                "who",
                "adult_male",
                "deck",
                "embark_town",
                "alive",
                "alone",
            ],
            DatasetKind::Tips => &["total_bill", "tip", "sex", "smoker", "day", "time", "size"],
        }
    }

    /// Declared level order for ordered categorical columns.
    pub fn category_order(&self, column: &str) -> Option<&'static [&'static str]> {
        match (self, column) {
            (DatasetKind::Titanic, "class") => Some(&["First", "Second", "Third"]),
            (DatasetKind::Titanic, "deck") => Some(&["A", "B", "C", "D", "E", "F", "G"]),
            (DatasetKind::Tips, "sex") => Some(&["Male", "Female"]),
            (DatasetKind::Tips, "smoker") => Some(&["Yes", "No"]),
            (DatasetKind::Tips, "day") => Some(&["Thur", "Fri", "Sat", "Sun"]),
            (DatasetKind::Tips, "time") => Some(&["Lunch", "Dinner"]),
            _ => None,
        }
    }

    /// Whether the compiled-in copy holds every row of the dataset.
    pub fn bundled_is_complete(&self) -> bool {
        matches!(self, DatasetKind::Iris)
    }

    fn bundled_csv(&self) -> &'static str {
        match self {
            DatasetKind::Iris => IRIS_CSV,
            DatasetKind::Titanic => TITANIC_CSV,
            DatasetKind::Tips => TIPS_CSV,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DatasetKind {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExplorerError::UnknownDataset(s.to_string()))
    }
}

/// Loads datasets by kind. Tables are small, so every call re-reads.
#[derive(Debug, Clone, Default)]
pub struct DatasetProvider {
    data_dir: Option<PathBuf>,
    remote: Option<RemoteSource>,
}

impl DatasetProvider {
    /// Bundled copies only; never touches the network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read CSVs from `data_dir` when a file for the dataset exists there.
    pub fn with_data_dir(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir,
            remote: None,
        }
    }

    /// Prefer the full copies from `remote` over the bundled excerpts.
    pub fn with_remote(mut self, remote: RemoteSource) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn load(&self, kind: DatasetKind) -> Result<DatasetTable> {
        let df = match self.override_path(kind).or_else(|| self.remote_path(kind)) {
            Some(path) => {
                debug!(dataset = %kind, path = %path.display(), "reading dataset file");
                Self::read_file(&path)?
            }
            None => Self::read_bundled(kind)?,
        };

        info!(
            dataset = %kind,
            rows = df.height(),
            columns = df.width(),
            "dataset loaded"
        );
        Ok(DatasetTable::new(kind, df))
    }

    /// Resolve a dataset by display name, e.g. "Tips".
    pub fn load_by_name(&self, name: &str) -> Result<DatasetTable> {
        self.load(name.parse()?)
    }

    fn override_path(&self, kind: DatasetKind) -> Option<PathBuf> {
        let path = self.data_dir.as_ref()?.join(kind.file_name());
        path.is_file().then_some(path)
    }

    /// Full copy of a dataset whose bundled file is an excerpt.
    fn remote_path(&self, kind: DatasetKind) -> Option<PathBuf> {
        if kind.bundled_is_complete() {
            return None;
        }
        let remote = self.remote.as_ref()?;
        match remote.fetch(kind) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(
                    dataset = %kind,
                    cache = %remote.cache_dir().display(),
                    error = %e,
                    "full dataset unavailable, using bundled excerpt"
                );
                None
            }
        }
    }

    fn read_file(path: &Path) -> Result<DataFrame> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }

    fn read_bundled(kind: DatasetKind) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(kind.bundled_csv().as_bytes()))
            .finish()?;
        Ok(df)
    }
}
