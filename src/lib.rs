//! vidsearch - Hybrid search over an in-memory video catalog
//!
//! Free-text queries go through a Tantivy index and are resolved against
//! an in-memory record store; structured queries filter the store
//! directly. Both paths share one sort and pagination contract.

pub mod catalog;
pub mod config;
pub mod error;
pub mod indexer;
pub mod loader;
pub mod model;
pub mod store;

pub use catalog::{Catalog, Refinement, SearchRequest};
pub use config::Config;
pub use error::{IngestError, SearchError};
