//! Full seaborn datasets, downloaded once into a local cache.
//!
//! Uses the same repository and cache layout as seaborn's `load_dataset`:
//! `$SEABORN_DATA` or `~/seaborn-data`, one `<name>.csv` per dataset.

use crate::data::DatasetKind;
use crate::error::{ExplorerError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const SEABORN_DATA_URL: &str = "https://raw.githubusercontent.com/mwaskom/seaborn-data/master";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client abstraction so downloads can be replaced in tests.
pub trait HttpClient: fmt::Debug + Send + Sync {
    /// Perform a GET request and return the response body.
    fn get(&self, url: &str) -> Result<String>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Default)]
pub struct ReqwestClient;

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ExplorerError::Download(format!("failed to create HTTP client: {e}")))?;

        let response = client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                ExplorerError::Download(format!("request timed out: {url}"))
            } else if e.is_connect() {
                ExplorerError::Download(format!("failed to connect: {url}"))
            } else {
                ExplorerError::Download(format!("failed to fetch {url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Download(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .map_err(|e| ExplorerError::Download(format!("failed to read {url}: {e}")))
    }
}

/// seaborn's data home: `$SEABORN_DATA`, else `~/seaborn-data`.
pub fn default_cache_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("SEABORN_DATA") {
        return Some(PathBuf::from(dir));
    }
    #[cfg(windows)]
    let home = std::env::var_os("USERPROFILE");
    #[cfg(not(windows))]
    let home = std::env::var_os("HOME");
    home.map(|home| PathBuf::from(home).join("seaborn-data"))
}

/// Where full dataset copies come from and where they are kept.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    cache_dir: PathBuf,
    base_url: String,
    client: Arc<dyn HttpClient>,
}

impl RemoteSource {
    pub fn new(cache_dir: PathBuf, client: Arc<dyn HttpClient>) -> Self {
        Self {
            cache_dir,
            base_url: SEABORN_DATA_URL.to_string(),
            client,
        }
    }

    /// The seaborn repository over reqwest, cached in `cache_dir` or
    /// seaborn's own data home.
    pub fn seaborn(cache_dir: Option<PathBuf>) -> Option<Self> {
        let cache_dir = cache_dir.or_else(default_cache_dir)?;
        Some(Self::new(cache_dir, Arc::new(ReqwestClient)))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the cached CSV, downloading it first on a cache miss.
    pub fn fetch(&self, kind: DatasetKind) -> Result<PathBuf> {
        let path = self.cache_dir.join(kind.file_name());
        if path.is_file() {
            debug!(dataset = %kind, path = %path.display(), "using cached dataset");
            return Ok(path);
        }

        let url = format!("{}/{}", self.base_url, kind.file_name());
        info!(dataset = %kind, %url, "downloading dataset");
        let body = self.client.get(&url)?;
        Self::check_header(kind, &body)?;

        fs::create_dir_all(&self.cache_dir)?;
        fs::write(&path, body)?;
        Ok(path)
    }

    /// An error page or a renamed file must not land in the cache.
    fn check_header(kind: DatasetKind, body: &str) -> Result<()> {
        let header: Vec<&str> = body
            .lines()
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .collect();
        if header != kind.expected_columns() {
            return Err(ExplorerError::Download(format!(
                "unexpected columns in downloaded {}",
                kind.file_name()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed body and counts requests.
    #[derive(Debug, Default)]
    pub(crate) struct StaticClient {
        pub body: String,
        pub calls: AtomicUsize,
    }

    impl StaticClient {
        pub fn new(body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HttpClient for StaticClient {
        fn get(&self, _url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.body.is_empty() {
                return Err(ExplorerError::Download("offline".to_string()));
            }
            Ok(self.body.clone())
        }
    }

    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "data_explorer_remote_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    /// A Tips CSV with `rows` identical rows.
    pub(crate) fn tips_csv(rows: usize) -> String {
        let mut csv = String::from("total_bill,tip,sex,smoker,day,time,size\n");
        for _ in 0..rows {
            csv.push_str("16.99,1.01,Female,No,Sun,Dinner,2\n");
        }
        csv
    }

    #[test]
    fn downloads_once_then_reads_cache() {
        let dir = scratch_dir("cache_hit");
        let client = StaticClient::new(tips_csv(3));
        let remote = RemoteSource::new(dir.clone(), client.clone());

        let first = remote.fetch(DatasetKind::Tips).unwrap();
        let second = remote.fetch(DatasetKind::Tips).unwrap();

        assert_eq!(first, dir.join("tips.csv"));
        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unexpected_header_is_not_cached() {
        let dir = scratch_dir("bad_header");
        let remote = RemoteSource::new(dir.clone(), StaticClient::new("<html>404</html>"));

        let err = remote.fetch(DatasetKind::Titanic).unwrap_err();
        assert!(matches!(err, ExplorerError::Download(_)));
        assert!(!dir.join("titanic.csv").exists());
    }
}
