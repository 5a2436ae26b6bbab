//! Configuration management for analysis, classification and search
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. Loading never fails: a missing or malformed file falls back to
//! defaults with a warning. Range checks happen separately in
//! [`AppConfig::validate`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::classifier::{Classifier, ClassifierThresholds};
use crate::analysis::features::FeatureExtractor;
use crate::analysis::framer::{DEFAULT_FRAME_DURATION_MS, DEFAULT_OVERLAP_RATIO};
use crate::analysis::ClipAnalyzer;
use crate::error::{AnalysisError, SearchError};
use crate::search::Metric;

/// Config file read by [`AppConfig::load`]
pub const DEFAULT_CONFIG_PATH: &str = "fingerprint_config.json";

/// Longest accepted analysis frame
const MAX_FRAME_DURATION_MS: f64 = 1000.0;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub classifier: ClassifierThresholds,
    pub search: SearchConfig,
    pub catalog: CatalogConfig,
}

/// Framing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Frame length in milliseconds
    pub frame_duration_ms: f64,
    /// Fraction of each frame shared with the next, in [0, 1)
    pub overlap_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: DEFAULT_FRAME_DURATION_MS,
            overlap_ratio: DEFAULT_OVERLAP_RATIO,
        }
    }
}

/// Search defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Metric name, resolved by [`SearchConfig::metric`]
    ///
    /// Kept as text so an unknown name is reported on its own instead of
    /// failing the whole document.
    pub metric: String,
    pub top_k: usize,
    /// Euclidean distance below which two songs count as duplicates
    pub duplicate_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean.name().to_string(),
            top_k: 5,
            duplicate_threshold: 0.1,
        }
    }
}

impl SearchConfig {
    /// The configured metric
    ///
    /// # Errors
    /// `UnsupportedMetric` if the name is not one of the known metrics.
    pub fn metric(&self) -> Result<Metric, SearchError> {
        self.metric.parse()
    }
}

/// Catalog storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or the
    /// JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load from [`DEFAULT_CONFIG_PATH`] in the working directory
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Check every value is inside its accepted range
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let frame_ms = self.analysis.frame_duration_ms;
        if !(frame_ms > 0.0 && frame_ms <= MAX_FRAME_DURATION_MS) {
            return Err(AnalysisError::invalid_config(
                "analysis.frame_duration_ms",
                format!("must be in (0, {}] (got {})", MAX_FRAME_DURATION_MS, frame_ms),
            ));
        }

        let overlap = self.analysis.overlap_ratio;
        if !(0.0..1.0).contains(&overlap) {
            return Err(AnalysisError::invalid_config(
                "analysis.overlap_ratio",
                format!("must be in [0, 1) (got {})", overlap),
            ));
        }

        self.classifier.validate()?;

        if let Err(err) = self.search.metric() {
            return Err(AnalysisError::invalid_config("search.metric", err.to_string()));
        }

        if self.search.top_k == 0 {
            return Err(AnalysisError::invalid_config(
                "search.top_k",
                "must be at least 1",
            ));
        }

        let threshold = self.search.duplicate_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AnalysisError::invalid_config(
                "search.duplicate_threshold",
                format!("must be a non-negative number (got {})", threshold),
            ));
        }

        Ok(())
    }

    /// Build a feature extractor from the analysis section
    pub fn extractor(&self) -> FeatureExtractor {
        FeatureExtractor::new(self.analysis.frame_duration_ms, self.analysis.overlap_ratio)
    }

    /// Build a classifier from the threshold section
    pub fn classifier(&self) -> Result<Classifier, AnalysisError> {
        Classifier::new(self.classifier)
    }

    /// Validate and build the full clip analyzer
    pub fn analyzer(&self) -> Result<ClipAnalyzer, AnalysisError> {
        self.validate()?;
        Ok(ClipAnalyzer::new(self.extractor(), self.classifier()?))
    }
}
