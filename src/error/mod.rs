// Error types for the fingerprinting core
//
// One error enum per domain (analysis, catalog, search). Every enum carries a
// stable numeric code so the CLI and any embedding layer can branch on it
// without string matching.

mod analysis;
mod catalog;
mod search;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use catalog::{log_catalog_error, CatalogError, CatalogErrorCodes};
pub use search::{log_search_error, SearchError, SearchErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
