// Analysis module - clip fingerprinting pipeline
//
// Pipeline: samples → Framer → FeatureExtractor → Classifier
// Output: AnalysisReport (fingerprint, per-frame series, classification)
//
// Every clip is analysed independently, so batches fan out over rayon's
// thread pool with no shared state.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

pub mod classifier;
pub mod features;
pub mod framer;

use crate::audio::{decode_wav, DecodedClip};
use crate::error::{log_analysis_error, AnalysisError};
use classifier::{Classification, Classifier};
use features::{FeatureExtractor, FeatureSeries, Fingerprint};

/// Everything learned about one clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub fingerprint: Fingerprint,
    pub series: FeatureSeries,
    pub classification: Classification,
    pub sample_rate: u32,
}

/// Result of analysing one file in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<AnalysisReport, AnalysisError>,
}

/// ClipAnalyzer runs extraction and classification with fixed parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipAnalyzer {
    extractor: FeatureExtractor,
    classifier: Classifier,
}

impl ClipAnalyzer {
    pub fn new(extractor: FeatureExtractor, classifier: Classifier) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Analyse mono samples at `sample_rate`
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<AnalysisReport, AnalysisError> {
        let (fingerprint, series) = self.extractor.extract_with_series(samples, sample_rate)?;
        let classification = self.classifier.classify_with_confidence(&fingerprint);

        tracing::debug!(
            "[ClipAnalyzer] {:.2}s clip classified as {} (confidence {:.2})",
            fingerprint.duration,
            classification.category,
            classification.confidence
        );

        Ok(AnalysisReport {
            fingerprint,
            series,
            classification,
            sample_rate,
        })
    }

    pub fn analyze_clip(&self, clip: &DecodedClip) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(&clip.samples, clip.sample_rate)
    }

    /// Decode and analyse one WAV file
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport, AnalysisError> {
        let clip = decode_wav(path)?;
        self.analyze_clip(&clip).inspect_err(|err| {
            log_analysis_error(err, &format!("analyze_file({})", path.display()));
        })
    }

    /// Analyse many files in parallel
    ///
    /// Items come back in input order. A failing file does not abort the
    /// batch; its error is reported in its own item.
    pub fn analyze_batch(&self, paths: &[PathBuf]) -> Vec<BatchItem> {
        tracing::info!("[ClipAnalyzer] Analysing batch of {} files", paths.len());

        let items: Vec<BatchItem> = paths
            .par_iter()
            .map(|path| BatchItem {
                path: path.clone(),
                result: self.analyze_file(path),
            })
            .collect();

        let failed = items.iter().filter(|item| item.result.is_err()).count();
        if failed > 0 {
            tracing::warn!("[ClipAnalyzer] {} of {} files failed", failed, items.len());
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::{AudioCategory, ClassifierThresholds};
    use crate::testing::signals;
    use tempfile::tempdir;

    #[test]
    fn test_analyze_silence() {
        let analyzer = ClipAnalyzer::default();
        let report = analyzer.analyze(&signals::silence(16_000), 16_000).unwrap();

        assert_eq!(report.classification.category, AudioCategory::SilenceStatic);
        assert_eq!(report.classification.confidence, 1.0);
        assert_eq!(report.series.ste.len(), report.fingerprint.num_frames);
        assert_eq!(report.sample_rate, 16_000);
    }

    #[test]
    fn test_analyze_loud_tone_is_music() {
        let analyzer = ClipAnalyzer::default();
        // 220 Hz at 16 kHz: STE ~0.245, ZCR ~0.0275
        let samples = signals::sine(16_000, 220.0, 0.7, 16_000);
        let report = analyzer.analyze(&samples, 16_000).unwrap();

        assert_eq!(report.classification.category, AudioCategory::MusicInstrument);
        assert!(report.classification.high_energy);
        assert!(!report.classification.high_zcr);
    }

    #[test]
    fn test_analyze_loud_noise_is_dynamic() {
        let analyzer = ClipAnalyzer::default();
        let samples = signals::white_noise(16_000, 0.8, 21);
        let report = analyzer.analyze(&samples, 16_000).unwrap();

        assert_eq!(report.classification.category, AudioCategory::DynamicNoise);
    }

    #[test]
    fn test_analyze_quiet_noise_is_speech() {
        let analyzer = ClipAnalyzer::default();
        // Uniform noise with amplitude 0.1 has STE ~0.0033
        let samples = signals::white_noise(16_000, 0.1, 5);
        let report = analyzer.analyze(&samples, 16_000).unwrap();

        assert_eq!(report.classification.category, AudioCategory::Speech);
    }

    #[test]
    fn test_analyzer_uses_given_thresholds() {
        let classifier = Classifier::new(ClassifierThresholds {
            ste_threshold: 0.5,
            zcr_threshold: 0.1,
        })
        .unwrap();
        let analyzer = ClipAnalyzer::new(FeatureExtractor::default(), classifier);
        let samples = signals::sine(16_000, 220.0, 0.7, 16_000);

        let report = analyzer.analyze(&samples, 16_000).unwrap();
        assert_eq!(report.classification.category, AudioCategory::SilenceStatic);
    }

    #[test]
    fn test_analyze_empty_is_invalid_input() {
        let analyzer = ClipAnalyzer::default();
        assert!(matches!(
            analyzer.analyze(&[], 16_000),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_analyze_batch_preserves_order_and_isolates_failures() {
        let dir = tempdir().unwrap();
        let tone = dir.path().join("tone.wav");
        let quiet = dir.path().join("quiet.wav");
        let missing = dir.path().join("missing.wav");
        signals::write_wav_i16(&tone, 16_000, &signals::sine(16_000, 220.0, 0.7, 8_000)).unwrap();
        signals::write_wav_i16(&quiet, 16_000, &signals::silence(8_000)).unwrap();

        let paths = vec![tone.clone(), missing.clone(), quiet.clone()];
        let items = ClipAnalyzer::default().analyze_batch(&paths);

        assert_eq!(
            items.iter().map(|item| item.path.clone()).collect::<Vec<_>>(),
            paths
        );
        assert_eq!(
            items[0].result.as_ref().unwrap().classification.category,
            AudioCategory::MusicInstrument
        );
        assert!(matches!(items[1].result, Err(AnalysisError::Decode { .. })));
        assert_eq!(
            items[2].result.as_ref().unwrap().classification.category,
            AudioCategory::SilenceStatic
        );
    }

    #[test]
    fn test_analyze_file_matches_in_memory_analysis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = signals::sine(8_000, 400.0, 0.5, 4_000);
        signals::write_wav_i16(&path, 8_000, &samples).unwrap();

        let analyzer = ClipAnalyzer::default();
        let from_file = analyzer.analyze_file(&path).unwrap();
        let in_memory = analyzer.analyze(&samples, 8_000).unwrap();

        assert_eq!(from_file.fingerprint.num_frames, in_memory.fingerprint.num_frames);
        assert!((from_file.fingerprint.ste.mean - in_memory.fingerprint.ste.mean).abs() < 1e-4);
        assert_eq!(
            from_file.classification.category,
            in_memory.classification.category
        );
    }
}
