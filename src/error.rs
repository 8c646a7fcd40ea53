//! Error types for catalog construction and search

use thiserror::Error;

/// Errors that abort building a catalog
#[derive(Error, Debug)]
pub enum IngestError {
    /// Two documents share the same `objectID`
    #[error("corpus integrity violated: duplicate objectID {0:?}")]
    DuplicateObjectId(String),

    /// The full-text engine failed while indexing
    #[error("text index error: {0}")]
    TextIndex(#[from] tantivy::TantivyError),
}

/// Errors returned by a single search call
#[derive(Error, Debug)]
pub enum SearchError {
    /// The free-text query does not parse
    #[error("invalid query: {0}")]
    QuerySyntax(#[from] tantivy::query::QueryParserError),

    /// A refinement names a field no video carries
    #[error("unknown refinement field: {0}")]
    UnknownField(String),

    /// A refinement value is an array or object
    #[error("refinement value for {0} must be a scalar")]
    NonScalarValue(String),

    #[error("hits per page and max hits per query must both be positive")]
    InvalidPagination,

    #[error("text index error: {0}")]
    TextIndex(#[from] tantivy::TantivyError),
}
