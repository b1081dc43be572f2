//! Dataset acquisition and loading.
//!
//! Local CSV files are parsed and validated by the loader; remote URLs
//! are downloaded to a temporary file first by the fetcher.

pub mod fetcher;
pub mod loader;

pub use fetcher::{fetch_dataset, FetchOptions, FetchResult};
pub use loader::load_dataset;
