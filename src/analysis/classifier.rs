// Classifier - static threshold classification of fingerprints
//
// Two booleans decide the category: is the mean short-term energy above the
// energy threshold, and is the mean zero-crossing rate above the ZCR
// threshold. Both comparisons are strict.
//
//   high STE | high ZCR | category
//   ---------+----------+------------------
//   yes      | yes      | dynamic/noise
//   yes      | no       | music/instrument
//   no       | yes      | speech
//   no       | no       | silence/static
//
// The plain label feeds search and catalog listings. The confidence-scored
// form feeds classification review.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::features::Fingerprint;
use crate::error::AnalysisError;

/// Default mean-STE threshold
pub const DEFAULT_STE_THRESHOLD: f64 = 0.01;

/// Default mean-ZCR threshold
pub const DEFAULT_ZCR_THRESHOLD: f64 = 0.1;

/// Coarse audio category assigned to a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AudioCategory {
    /// High energy, high ZCR
    #[serde(rename = "dynamic/noise")]
    DynamicNoise,
    /// High energy, low ZCR
    #[serde(rename = "music/instrument")]
    MusicInstrument,
    /// Low energy, high ZCR
    #[serde(rename = "speech")]
    Speech,
    /// Low energy, low ZCR
    #[serde(rename = "silence/static")]
    SilenceStatic,
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 4] = [
        AudioCategory::DynamicNoise,
        AudioCategory::MusicInstrument,
        AudioCategory::Speech,
        AudioCategory::SilenceStatic,
    ];

    /// Stable label used in listings and persisted records
    pub fn label(&self) -> &'static str {
        match self {
            AudioCategory::DynamicNoise => "dynamic/noise",
            AudioCategory::MusicInstrument => "music/instrument",
            AudioCategory::Speech => "speech",
            AudioCategory::SilenceStatic => "silence/static",
        }
    }

    /// Parse a label produced by [`AudioCategory::label`]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision thresholds for the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Mean STE strictly above this counts as high energy
    pub ste_threshold: f64,
    /// Mean ZCR strictly above this counts as high ZCR
    pub zcr_threshold: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            ste_threshold: DEFAULT_STE_THRESHOLD,
            zcr_threshold: DEFAULT_ZCR_THRESHOLD,
        }
    }
}

impl ClassifierThresholds {
    /// Both thresholds must be finite and positive; confidence divides by them
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (field, value) in [
            ("ste_threshold", self.ste_threshold),
            ("zcr_threshold", self.zcr_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::invalid_config(
                    field,
                    format!("must be a positive number (got {})", value),
                ));
            }
        }
        Ok(())
    }
}

/// Classification with its confidence and the inputs that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: AudioCategory,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
    pub high_energy: bool,
    pub high_zcr: bool,
    pub ste_mean: f64,
    pub zcr_mean: f64,
}

/// Classifier applies the static threshold table to fingerprints
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    thresholds: ClassifierThresholds,
}

impl Classifier {
    /// Create a classifier with validated thresholds
    pub fn new(thresholds: ClassifierThresholds) -> Result<Self, AnalysisError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> ClassifierThresholds {
        self.thresholds
    }

    /// Assign the plain category label
    pub fn classify(&self, fingerprint: &Fingerprint) -> AudioCategory {
        let (high_energy, high_zcr) = self.levels(fingerprint);
        Self::category_for(high_energy, high_zcr)
    }

    /// Assign the category and score how far the means sit from the thresholds
    ///
    /// Confidence blends the two normalized margins (s = mean STE,
    /// z = mean ZCR, S and Z the thresholds):
    /// - music/instrument: 0.5·s/S + 0.5·(Z − z)/Z
    /// - speech:           0.5·(S − s)/S + 0.5·z/Z
    /// - dynamic/noise:    (s/S + z/Z) / 2
    /// - silence/static:   ((S − s)/S + (Z − z)/Z) / 2
    ///
    /// and is clamped to [0, 1].
    pub fn classify_with_confidence(&self, fingerprint: &Fingerprint) -> Classification {
        let (high_energy, high_zcr) = self.levels(fingerprint);
        let category = Self::category_for(high_energy, high_zcr);

        let s = fingerprint.ste_mean();
        let z = fingerprint.zcr_mean();
        let ste_t = self.thresholds.ste_threshold;
        let zcr_t = self.thresholds.zcr_threshold;

        let raw = match category {
            AudioCategory::MusicInstrument => 0.5 * s / ste_t + 0.5 * (zcr_t - z) / zcr_t,
            AudioCategory::Speech => 0.5 * (ste_t - s) / ste_t + 0.5 * z / zcr_t,
            AudioCategory::DynamicNoise => (s / ste_t + z / zcr_t) / 2.0,
            AudioCategory::SilenceStatic => ((ste_t - s) / ste_t + (zcr_t - z) / zcr_t) / 2.0,
        };

        Classification {
            category,
            confidence: raw.clamp(0.0, 1.0),
            high_energy,
            high_zcr,
            ste_mean: s,
            zcr_mean: z,
        }
    }

    fn levels(&self, fingerprint: &Fingerprint) -> (bool, bool) {
        (
            fingerprint.ste_mean() > self.thresholds.ste_threshold,
            fingerprint.zcr_mean() > self.thresholds.zcr_threshold,
        )
    }

    fn category_for(high_energy: bool, high_zcr: bool) -> AudioCategory {
        match (high_energy, high_zcr) {
            (true, true) => AudioCategory::DynamicNoise,
            (true, false) => AudioCategory::MusicInstrument,
            (false, true) => AudioCategory::Speech,
            (false, false) => AudioCategory::SilenceStatic,
        }
    }
}

/// Classify with explicit thresholds
pub fn classify(
    fingerprint: &Fingerprint,
    ste_threshold: f64,
    zcr_threshold: f64,
) -> Result<AudioCategory, AnalysisError> {
    let classifier = Classifier::new(ClassifierThresholds {
        ste_threshold,
        zcr_threshold,
    })?;
    Ok(classifier.classify(fingerprint))
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
