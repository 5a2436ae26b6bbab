// Distance and similarity measures over fingerprint vectors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Whether a score is a distance (lower is closer) or a similarity
/// (higher is closer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Distance,
    Similarity,
}

/// Comparison measure used to rank catalog entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Cosine,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Euclidean, Metric::Manhattan, Metric::Cosine];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Cosine => "cosine",
        }
    }

    pub fn kind(&self) -> ScoreKind {
        match self {
            Metric::Euclidean | Metric::Manhattan => ScoreKind::Distance,
            Metric::Cosine => ScoreKind::Similarity,
        }
    }

    /// Score `a` against `b` with this metric
    pub fn score(&self, a: &[f64], b: &[f64]) -> Result<f64, SearchError> {
        match self {
            Metric::Euclidean => distance_euclidean(a, b),
            Metric::Manhattan => distance_manhattan(a, b),
            Metric::Cosine => similarity_cosine(a, b),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::UnsupportedMetric {
                name: s.to_string(),
            })
    }
}

fn check_dims(a: &[f64], b: &[f64]) -> Result<(), SearchError> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// sqrt(Σ (aᵢ − bᵢ)²)
pub fn distance_euclidean(a: &[f64], b: &[f64]) -> Result<f64, SearchError> {
    check_dims(a, b)?;
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum.sqrt())
}

/// Σ |aᵢ − bᵢ|
pub fn distance_manhattan(a: &[f64], b: &[f64]) -> Result<f64, SearchError> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum())
}

/// (a·b) / (‖a‖·‖b‖), or 0 when either vector has zero norm
pub fn similarity_cosine(a: &[f64], b: &[f64]) -> Result<f64, SearchError> {
    check_dims(a, b)?;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}
