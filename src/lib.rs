// Audio Fingerprint Core - statistical fingerprinting, classification and search
// Clips are reduced to eight STE/ZCR statistics, labelled by a threshold
// classifier and compared against a catalog by distance or similarity.

// Module declarations
pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod search;
pub mod testing;

// Re-exports for convenience
pub use analysis::classifier::{AudioCategory, Classification, Classifier, ClassifierThresholds};
pub use analysis::features::{FeatureExtractor, FeatureSeries, Fingerprint, FINGERPRINT_DIM};
pub use analysis::framer::{FrameMatrix, Framer};
pub use analysis::{AnalysisReport, ClipAnalyzer};
pub use catalog::{Catalog, CatalogRecord, InMemoryCatalog, JsonCatalog, SongId, SongMetadata};
pub use config::AppConfig;
pub use error::{AnalysisError, CatalogError, ErrorCode, SearchError};
pub use search::{DuplicatePair, Metric, ScoreKind, SearchEngine, SearchMatch};
