// Search error types and constants

use crate::error::{CatalogError, ErrorCode};
use log::error;
use std::fmt;

/// Search error code constants
///
/// Error code range: 2001-2002. Catalog failures keep their own 3xxx code.
pub struct SearchErrorCodes {}

impl SearchErrorCodes {
    /// Compared vectors have different lengths
    pub const DIMENSION_MISMATCH: i32 = 2001;

    /// Metric name is not one of euclidean, manhattan, cosine
    pub const UNSUPPORTED_METRIC: i32 = 2002;
}

/// Log a search error with structured context
pub fn log_search_error(err: &SearchError, context: &str) {
    error!(
        "Search error in {}: code={}, component=SearchEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by distance computation and ranked retrieval
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Vectors of unequal length were compared
    DimensionMismatch { left: usize, right: usize },

    /// Unknown metric name
    UnsupportedMetric { name: String },

    /// Failure reported by the catalog collaborator, passed through unchanged
    Catalog(CatalogError),
}

impl ErrorCode for SearchError {
    fn code(&self) -> i32 {
        match self {
            SearchError::DimensionMismatch { .. } => SearchErrorCodes::DIMENSION_MISMATCH,
            SearchError::UnsupportedMetric { .. } => SearchErrorCodes::UNSUPPORTED_METRIC,
            SearchError::Catalog(inner) => inner.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            SearchError::DimensionMismatch { left, right } => {
                format!("Vectors must have the same length ({} vs {})", left, right)
            }
            SearchError::UnsupportedMetric { name } => format!(
                "Unsupported metric '{}' (expected euclidean, manhattan or cosine)",
                name
            ),
            SearchError::Catalog(inner) => inner.message(),
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Catalog(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<CatalogError> for SearchError {
    fn from(err: CatalogError) -> Self {
        SearchError::Catalog(err)
    }
}
