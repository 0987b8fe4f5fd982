//! Product-data collaborators.
//!
//! - store boundary + wire record (`store`)
//! - results-file store (`file`)
//! - HTTP API client (`http`)
//! - seeded synthetic catalog (`sample`)

pub mod file;
pub mod http;
pub mod sample;
pub mod store;

pub use file::{DEFAULT_RESULTS_PATH, JsonFileStore};
pub use http::HttpStore;
pub use sample::{SampleConfig, SampleStore};
pub use store::{ProductRecord, ProductStore};
