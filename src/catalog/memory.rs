// InMemoryCatalog: RwLock-guarded catalog with no backing file

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Catalog, CatalogRecord, CatalogState, MetadataUpdate, SongId, SongMetadata};
use crate::analysis::AnalysisReport;
use crate::error::CatalogError;

/// Catalog held entirely in memory
///
/// Readers share the lock; `put`, `delete` and metadata edits take it
/// exclusively, so a search never observes a half-applied mutation.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-filled with `records`, in the given order
    pub fn with_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        let mut state = CatalogState::default();
        for record in records {
            state.put(record);
        }
        Self::from_state(state)
    }

    pub(crate) fn from_state(state: CatalogState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.read_state()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len()? == 0)
    }

    /// Safely acquire read lock on catalog state
    pub(crate) fn read_state(&self) -> Result<RwLockReadGuard<'_, CatalogState>, CatalogError> {
        self.state.read().map_err(|_| CatalogError::LockPoisoned {
            component: "catalog".to_string(),
        })
    }

    /// Safely acquire write lock on catalog state
    pub(crate) fn write_state(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, CatalogError> {
        self.state.write().map_err(|_| CatalogError::LockPoisoned {
            component: "catalog".to_string(),
        })
    }
}

impl Catalog for InMemoryCatalog {
    fn put(&self, record: CatalogRecord) -> Result<(), CatalogError> {
        self.write_state()?.put(record);
        Ok(())
    }

    fn get(&self, id: SongId) -> Result<CatalogRecord, CatalogError> {
        self.read_state()?.get(id)
    }

    fn all(&self) -> Result<Vec<(SongId, Vec<f64>)>, CatalogError> {
        Ok(self.read_state()?.vectors())
    }

    fn delete(&self, id: SongId) -> Result<bool, CatalogError> {
        Ok(self.write_state()?.delete(id))
    }

    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        Ok(self.read_state()?.records.clone())
    }

    fn update_metadata(&self, id: SongId, update: &MetadataUpdate) -> Result<bool, CatalogError> {
        self.write_state()?.update_metadata(id, update)
    }

    fn next_id(&self) -> Result<SongId, CatalogError> {
        Ok(self.write_state()?.reserve_id())
    }

    fn upsert_by_path(
        &self,
        metadata: SongMetadata,
        report: AnalysisReport,
    ) -> Result<SongId, CatalogError> {
        Ok(self.write_state()?.upsert_by_path(metadata, report))
    }
}
