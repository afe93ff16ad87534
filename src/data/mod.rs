//! Data module - bundled datasets and table operations

mod processor;
mod provider;
mod remote;
mod table;

pub use processor::{DataProcessor, BILL_PER_PERSON};
pub use provider::{DatasetKind, DatasetProvider};
pub use remote::{default_cache_dir, HttpClient, RemoteSource, ReqwestClient, SEABORN_DATA_URL};
pub use table::DatasetTable;
