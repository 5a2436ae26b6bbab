//! Catalog collaborator: the store of fingerprinted songs.
//!
//! The search engine only needs four operations (`put`, `get`, `all`,
//! `delete`). The remaining trait methods serve the CLI listing, editing and
//! statistics surfaces. Two implementations ship with the crate:
//! [`InMemoryCatalog`] for tests and embedding, and [`JsonCatalog`] which
//! writes every mutation through to a JSON file.
//!
//! Records are kept in insertion order. Replacing a record keeps its
//! position, so search tie-breaks stay stable across re-ingest.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::AudioCategory;
use crate::analysis::features::{FeatureSeries, Fingerprint};
use crate::analysis::AnalysisReport;
use crate::error::CatalogError;

mod json_store;
mod memory;

pub use json_store::JsonCatalog;
pub use memory::InMemoryCatalog;

/// Opaque catalog key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive fields of a song; only `title` and `artist` are editable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub file_path: PathBuf,
    pub file_name: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub sample_rate: u32,
}

impl SongMetadata {
    /// Metadata for a file on disk; the title defaults to the file stem
    pub fn for_path(path: &Path, sample_rate: u32) -> Self {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            file_path: path.to_path_buf(),
            file_name,
            title,
            artist: None,
            sample_rate,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }
}

/// One stored song
///
/// Fingerprint, series and category are derived at ingest and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: SongId,
    pub metadata: SongMetadata,
    pub fingerprint: Fingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<FeatureSeries>,
    pub category: AudioCategory,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl CatalogRecord {
    pub fn new(
        id: SongId,
        metadata: SongMetadata,
        fingerprint: Fingerprint,
        series: Option<FeatureSeries>,
        category: AudioCategory,
    ) -> Self {
        let now = now_ms();
        Self {
            id,
            metadata,
            fingerprint,
            series,
            category,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    /// Build a record from a finished clip analysis
    pub fn from_report(id: SongId, metadata: SongMetadata, report: AnalysisReport) -> Self {
        Self::new(
            id,
            metadata,
            report.fingerprint,
            Some(report.series),
            report.classification.category,
        )
    }

    /// The 8-value vector compared by the search engine
    pub fn vector(&self) -> Vec<f64> {
        self.fingerprint.vector().to_vec()
    }
}

/// Editable metadata fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl MetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none()
    }
}

/// Aggregate figures over the whole catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_songs: usize,
    pub by_category: BTreeMap<String, usize>,
    /// Sum of clip durations in seconds
    pub total_duration: f64,
}

/// Store of fingerprinted songs
///
/// Implementations must return a consistent snapshot from [`Catalog::all`]:
/// the whole vector set is read under one lock acquisition.
pub trait Catalog: Send + Sync {
    /// Insert a record, or replace the record with the same id
    fn put(&self, record: CatalogRecord) -> Result<(), CatalogError>;

    /// Fetch one record
    ///
    /// # Errors
    /// `CatalogError::NotFound` when no record has this id.
    fn get(&self, id: SongId) -> Result<CatalogRecord, CatalogError>;

    /// Snapshot of every `(id, vector)` pair in catalog order
    fn all(&self) -> Result<Vec<(SongId, Vec<f64>)>, CatalogError>;

    /// Remove a record; `Ok(false)` when it did not exist
    fn delete(&self, id: SongId) -> Result<bool, CatalogError>;

    /// Snapshot of every record in catalog order
    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Edit title and/or artist
    ///
    /// Returns `Ok(false)` for an empty update, `NotFound` for an unknown id.
    fn update_metadata(&self, id: SongId, update: &MetadataUpdate) -> Result<bool, CatalogError>;

    /// Reserve a fresh id; ids are never reused
    fn next_id(&self) -> Result<SongId, CatalogError>;

    /// Insert a record for `metadata.file_path`, or replace the one already
    /// stored for that path, as a single step
    ///
    /// A replaced record keeps its id and creation time.
    fn upsert_by_path(
        &self,
        metadata: SongMetadata,
        report: AnalysisReport,
    ) -> Result<SongId, CatalogError>;

    /// Records whose title, artist or file name contains `keyword`
    /// (ASCII case-insensitive), sorted by title
    fn find_by_name(&self, keyword: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
        let needle = keyword.to_ascii_lowercase();
        let mut matches: Vec<CatalogRecord> = self
            .records()?
            .into_iter()
            .filter(|record| {
                let meta = &record.metadata;
                meta.title.to_ascii_lowercase().contains(&needle)
                    || meta.file_name.to_ascii_lowercase().contains(&needle)
                    || meta
                        .artist
                        .as_deref()
                        .is_some_and(|artist| artist.to_ascii_lowercase().contains(&needle))
            })
            .collect();
        matches.sort_by(|a, b| a.metadata.title.cmp(&b.metadata.title));
        Ok(matches)
    }

    /// Records with the given category, sorted by title
    fn by_category(&self, category: AudioCategory) -> Result<Vec<CatalogRecord>, CatalogError> {
        let mut matches: Vec<CatalogRecord> = self
            .records()?
            .into_iter()
            .filter(|record| record.category == category)
            .collect();
        matches.sort_by(|a, b| a.metadata.title.cmp(&b.metadata.title));
        Ok(matches)
    }

    /// The record ingested from `path`, if any
    fn find_by_path(&self, path: &Path) -> Result<Option<CatalogRecord>, CatalogError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|record| record.metadata.file_path == path))
    }

    /// Song count, per-category counts and total duration
    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let records = self.records()?;
        let mut stats = CatalogStats {
            total_songs: records.len(),
            ..CatalogStats::default()
        };
        for record in &records {
            *stats
                .by_category
                .entry(record.category.label().to_string())
                .or_default() += 1;
            stats.total_duration += record.fingerprint.duration;
        }
        Ok(stats)
    }
}

/// Store an analysed clip, replacing any earlier record for the same file
///
/// A re-ingested file keeps its id and creation time. Concurrent ingests of
/// the same file resolve to one record.
pub fn ingest<C: Catalog + ?Sized>(
    catalog: &C,
    metadata: SongMetadata,
    report: AnalysisReport,
) -> Result<SongId, CatalogError> {
    catalog.upsert_by_path(metadata, report)
}

/// In-memory catalog content shared by both implementations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CatalogState {
    next_id: u64,
    records: Vec<CatalogRecord>,
}

impl CatalogState {
    fn position(&self, id: SongId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn put(&mut self, record: CatalogRecord) {
        self.next_id = self.next_id.max(record.id.0 + 1);
        match self.position(record.id) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    fn get(&self, id: SongId) -> Result<CatalogRecord, CatalogError> {
        self.position(id)
            .map(|index| self.records[index].clone())
            .ok_or(CatalogError::NotFound { id })
    }

    fn vectors(&self) -> Vec<(SongId, Vec<f64>)> {
        self.records
            .iter()
            .map(|record| (record.id, record.vector()))
            .collect()
    }

    fn delete(&mut self, id: SongId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    fn update_metadata(
        &mut self,
        id: SongId,
        update: &MetadataUpdate,
    ) -> Result<bool, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::NotFound { id })?;
        if update.is_empty() {
            return Ok(false);
        }
        let record = &mut self.records[index];
        if let Some(title) = &update.title {
            record.metadata.title = title.clone();
        }
        if let Some(artist) = &update.artist {
            record.metadata.artist = Some(artist.clone());
        }
        record.updated_at_ms = now_ms();
        Ok(true)
    }

    fn upsert_by_path(&mut self, metadata: SongMetadata, report: AnalysisReport) -> SongId {
        let existing = self
            .records
            .iter()
            .find(|record| record.metadata.file_path == metadata.file_path)
            .map(|record| (record.id, record.created_at_ms));
        let id = match existing {
            Some((id, _)) => id,
            None => self.reserve_id(),
        };

        let mut record = CatalogRecord::from_report(id, metadata, report);
        if let Some((_, created_at_ms)) = existing {
            record.created_at_ms = created_at_ms;
            log::info!(
                "[Catalog] Replacing record {} for {}",
                id,
                record.metadata.file_path.display()
            );
        }
        self.put(record);
        id
    }

    fn reserve_id(&mut self) -> SongId {
        self.next_id = self.next_id.max(1);
        let id = SongId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Record whose fingerprint vector is exactly `vector`
    ///
    /// The vector fills the leading slots; the rest stay 0.
    pub fn record_with_vector(id: u64, title: &str, vector: &[f64]) -> CatalogRecord {
        let mut slots = [0.0f64; 8];
        slots[..vector.len()].copy_from_slice(vector);
        let metadata =
            SongMetadata::for_path(Path::new(&format!("/music/{}.wav", title)), 16_000);
        CatalogRecord::new(
            SongId(id),
            metadata,
            Fingerprint::from_vector(slots, 1, 2.0),
            None,
            AudioCategory::MusicInstrument,
        )
    }
}
