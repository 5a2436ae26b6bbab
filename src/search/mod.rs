// SearchEngine - ranked retrieval over catalog fingerprints
//
// Every query is a single linear scan over one snapshot of the catalog's
// (id, vector) pairs. Rankings use a stable sort, so equal scores keep
// catalog order. The engine holds nothing but a borrowed catalog handle.

mod metrics;

pub use metrics::{distance_euclidean, distance_manhattan, similarity_cosine, Metric, ScoreKind};

use std::cmp::Ordering;

use serde::Serialize;

use crate::analysis::features::Fingerprint;
use crate::catalog::{Catalog, CatalogRecord, SongId};
use crate::error::{log_search_error, SearchError};

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    /// 1-based position in the ranking
    pub rank: usize,
    pub id: SongId,
    pub score: f64,
    pub kind: ScoreKind,
    pub record: CatalogRecord,
}

/// Two catalog entries whose Euclidean distance is under the duplicate threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicatePair {
    pub first: CatalogRecord,
    pub second: CatalogRecord,
    pub distance: f64,
}

/// Stateless search over a catalog
pub struct SearchEngine<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> SearchEngine<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Rank catalog entries against `query`
    ///
    /// Distances sort ascending, cosine similarity descending. At most
    /// `top_k` matches are returned; an empty catalog yields an empty list.
    ///
    /// # Errors
    /// `DimensionMismatch` if `query` does not match a stored vector's length,
    /// `Catalog` if the snapshot or a record lookup fails.
    pub fn search(
        &self,
        query: &[f64],
        top_k: usize,
        metric: Metric,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        self.rank(query, top_k, metric)
            .inspect_err(|err| log_search_error(err, "search"))
    }

    /// Rank catalog entries against a freshly extracted fingerprint
    pub fn search_fingerprint(
        &self,
        fingerprint: &Fingerprint,
        top_k: usize,
        metric: Metric,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        self.search(&fingerprint.vector(), top_k, metric)
    }

    /// Every pair `i < j` (catalog order) with Euclidean distance strictly
    /// below `threshold`, in scan order
    pub fn find_duplicates(&self, threshold: f64) -> Result<Vec<DuplicatePair>, SearchError> {
        let snapshot = self.catalog.all()?;
        let mut close = Vec::new();

        for (i, (first_id, first_vec)) in snapshot.iter().enumerate() {
            for (second_id, second_vec) in &snapshot[i + 1..] {
                let distance = distance_euclidean(first_vec, second_vec)
                    .inspect_err(|err| log_search_error(err, "find_duplicates"))?;
                if distance < threshold {
                    close.push((*first_id, *second_id, distance));
                }
            }
        }

        log::debug!(
            "[SearchEngine] {} duplicate pairs among {} songs (threshold {})",
            close.len(),
            snapshot.len(),
            threshold
        );

        close
            .into_iter()
            .map(|(first, second, distance)| -> Result<DuplicatePair, SearchError> {
                Ok(DuplicatePair {
                    first: self.catalog.get(first)?,
                    second: self.catalog.get(second)?,
                    distance,
                })
            })
            .collect()
    }

    /// Songs closest to `song_id` by Euclidean distance, excluding itself
    ///
    /// # Errors
    /// `Catalog(NotFound)` if `song_id` is not in the catalog.
    pub fn recommend(
        &self,
        song_id: SongId,
        top_k: usize,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        let seed = self
            .catalog
            .get(song_id)
            .map_err(SearchError::from)
            .inspect_err(|err| log_search_error(err, "recommend"))?;

        let mut matches = self.search(&seed.vector(), top_k.saturating_add(1), Metric::Euclidean)?;
        matches.retain(|m| m.id != song_id);
        matches.truncate(top_k);
        for (index, m) in matches.iter_mut().enumerate() {
            m.rank = index + 1;
        }
        Ok(matches)
    }

    fn rank(
        &self,
        query: &[f64],
        top_k: usize,
        metric: Metric,
    ) -> Result<Vec<SearchMatch>, SearchError> {
        let snapshot = self.catalog.all()?;

        let mut scored = snapshot
            .iter()
            .map(|(id, vector)| metric.score(query, vector).map(|score| (*id, score)))
            .collect::<Result<Vec<(SongId, f64)>, SearchError>>()?;

        let kind = metric.kind();
        scored.sort_by(|a, b| rank_order(a.1, b.1, kind));
        scored.truncate(top_k);

        log::debug!(
            "[SearchEngine] {} search over {} songs, returning {}",
            metric,
            snapshot.len(),
            scored.len()
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(index, (id, score))| -> Result<SearchMatch, SearchError> {
                Ok(SearchMatch {
                    rank: index + 1,
                    id,
                    score,
                    kind,
                    record: self.catalog.get(id)?,
                })
            })
            .collect()
    }
}

/// Closest first for `kind`, with NaN scores ranked last
///
/// A total order over every f64, so the stable sort never sees an
/// inconsistent comparison. `-0.0` and `0.0` compare equal and keep
/// catalog order.
fn rank_order(a: f64, b: f64, kind: ScoreKind) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match kind {
            ScoreKind::Distance => a.partial_cmp(&b),
            ScoreKind::Similarity => b.partial_cmp(&a),
        }
        .unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
