// Catalog error types and constants

use crate::catalog::SongId;
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Catalog error code constants
///
/// Error code range: 3001-3004
pub struct CatalogErrorCodes {}

impl CatalogErrorCodes {
    /// No record stored under the requested id
    pub const NOT_FOUND: i32 = 3001;

    /// Catalog RwLock was poisoned
    pub const LOCK_POISONED: i32 = 3002;

    /// Backing file could not be read or written
    pub const IO_FAILED: i32 = 3003;

    /// Backing file exists but does not hold a valid catalog
    pub const CORRUPT: i32 = 3004;
}

/// Log a catalog error with structured context
pub fn log_catalog_error(err: &CatalogError, context: &str) {
    error!(
        "Catalog error in {}: code={}, component=Catalog, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors surfaced by catalog implementations
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Lookup miss
    NotFound { id: SongId },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// Filesystem failure on the backing store
    Io { details: String },

    /// Backing store content could not be parsed
    Corrupt { details: String },
}

impl ErrorCode for CatalogError {
    fn code(&self) -> i32 {
        match self {
            CatalogError::NotFound { .. } => CatalogErrorCodes::NOT_FOUND,
            CatalogError::LockPoisoned { .. } => CatalogErrorCodes::LOCK_POISONED,
            CatalogError::Io { .. } => CatalogErrorCodes::IO_FAILED,
            CatalogError::Corrupt { .. } => CatalogErrorCodes::CORRUPT,
        }
    }

    fn message(&self) -> String {
        match self {
            CatalogError::NotFound { id } => format!("No catalog record with id {}", id),
            CatalogError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            CatalogError::Io { details } => format!("Catalog I/O failed: {}", details),
            CatalogError::Corrupt { details } => format!("Catalog file is corrupt: {}", details),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CatalogError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Corrupt {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_codes() {
        assert_eq!(
            CatalogError::NotFound { id: SongId(7) }.code(),
            CatalogErrorCodes::NOT_FOUND
        );
        assert_eq!(
            CatalogError::LockPoisoned {
                component: "records".to_string()
            }
            .code(),
            CatalogErrorCodes::LOCK_POISONED
        );
        assert_eq!(
            CatalogError::Io {
                details: "disk full".to_string()
            }
            .code(),
            CatalogErrorCodes::IO_FAILED
        );
        assert_eq!(
            CatalogError::Corrupt {
                details: "eof".to_string()
            }
            .code(),
            CatalogErrorCodes::CORRUPT
        );
    }

    #[test]
    fn test_not_found_message_names_id() {
        let err = CatalogError::NotFound { id: SongId(42) };
        assert_eq!(err.message(), "No catalog record with id 42");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        match CatalogError::from(io_err) {
            CatalogError::Io { details } => assert!(details.contains("test io error")),
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_error_is_corrupt() {
        let json_err = serde_json::from_str::<Vec<u8>>("{not json").unwrap_err();
        assert!(matches!(
            CatalogError::from(json_err),
            CatalogError::Corrupt { .. }
        ));
    }
}
