// JsonCatalog: catalog persisted to a single JSON document
//
// Every mutation is written through before the write lock is released, so
// the file on disk always matches the last completed mutation. A mutation
// whose save fails is discarded. Saves go to
// `<file>.tmp` first and are renamed over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{
    Catalog, CatalogRecord, CatalogState, InMemoryCatalog, MetadataUpdate, SongId, SongMetadata,
};
use crate::analysis::AnalysisReport;
use crate::error::{log_catalog_error, CatalogError};

/// Catalog backed by a JSON file
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    inner: InMemoryCatalog,
}

impl JsonCatalog {
    /// Open the catalog at `path`, creating an empty one if the file is absent
    ///
    /// # Errors
    /// `Io` if the file exists but cannot be read, `Corrupt` if it does not
    /// hold a catalog document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let state: CatalogState = serde_json::from_reader(reader).inspect_err(|err| {
                log::error!("[Catalog] Failed to parse {}: {}", path.display(), err);
            })?;
            log::info!(
                "[Catalog] Loaded {} records from {}",
                state.records.len(),
                path.display()
            );
            state
        } else {
            log::info!("[Catalog] No catalog at {}, starting empty", path.display());
            CatalogState::default()
        };

        Ok(Self {
            path,
            inner: InMemoryCatalog::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state to disk and release the catalog
    pub fn close(self) -> Result<(), CatalogError> {
        let state = self.inner.read_state()?;
        persist(&self.path, &state)
    }

    fn mutate<T>(
        &self,
        context: &str,
        apply: impl FnOnce(&mut CatalogState) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut state = self.inner.write_state()?;
        let mut next = state.clone();
        let value = apply(&mut next)?;
        persist(&self.path, &next).inspect_err(|err| log_catalog_error(err, context))?;
        *state = next;
        Ok(value)
    }
}

fn persist(path: &Path, state: &CatalogState) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, state)?;
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;

    log::debug!(
        "[Catalog] Saved {} records to {}",
        state.records.len(),
        path.display()
    );
    Ok(())
}

impl Catalog for JsonCatalog {
    fn put(&self, record: CatalogRecord) -> Result<(), CatalogError> {
        self.mutate("put", |state| {
            state.put(record);
            Ok(())
        })
    }

    fn get(&self, id: SongId) -> Result<CatalogRecord, CatalogError> {
        self.inner.get(id)
    }

    fn all(&self) -> Result<Vec<(SongId, Vec<f64>)>, CatalogError> {
        self.inner.all()
    }

    fn delete(&self, id: SongId) -> Result<bool, CatalogError> {
        self.mutate("delete", |state| Ok(state.delete(id)))
    }

    fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.inner.records()
    }

    fn update_metadata(&self, id: SongId, update: &MetadataUpdate) -> Result<bool, CatalogError> {
        self.mutate("update_metadata", |state| state.update_metadata(id, update))
    }

    fn next_id(&self) -> Result<SongId, CatalogError> {
        self.mutate("next_id", |state| Ok(state.reserve_id()))
    }

    fn upsert_by_path(
        &self,
        metadata: SongMetadata,
        report: AnalysisReport,
    ) -> Result<SongId, CatalogError> {
        self.mutate("upsert_by_path", |state| {
            Ok(state.upsert_by_path(metadata, report))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::record_with_vector;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let catalog = JsonCatalog::open(dir.path().join("catalog.json")).unwrap();
        assert!(catalog.records().unwrap().is_empty());
        assert!(!catalog.path().exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");

        {
            let catalog = JsonCatalog::open(&path).unwrap();
            let id = catalog.next_id().unwrap();
            catalog.put(record_with_vector(id.0, "first", &[0.1, 0.2])).unwrap();
            let id = catalog.next_id().unwrap();
            catalog.put(record_with_vector(id.0, "second", &[0.3])).unwrap();
            catalog
                .update_metadata(
                    SongId(2),
                    &MetadataUpdate {
                        title: None,
                        artist: Some("Band".to_string()),
                    },
                )
                .unwrap();
            assert!(catalog.delete(SongId(1)).unwrap());
        }

        let reopened = JsonCatalog::open(&path).unwrap();
        let records = reopened.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, SongId(2));
        assert_eq!(records[0].metadata.artist.as_deref(), Some("Band"));
        // Deleted id 1 is not handed out again
        assert_eq!(reopened.next_id().unwrap(), SongId(3));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_close_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = JsonCatalog::open(&path).unwrap();
        catalog.close().unwrap();
        assert!(path.exists());
        assert!(JsonCatalog::open(&path).unwrap().records().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonCatalog::open(&path),
            Err(CatalogError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_failed_save_discards_mutation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = JsonCatalog::open(&path).unwrap();
        catalog.put(record_with_vector(1, "kept", &[0.1])).unwrap();

        // A directory where the temporary file belongs makes every save fail
        fs::create_dir(path.with_extension("tmp")).unwrap();

        assert!(matches!(
            catalog.put(record_with_vector(2, "ghost", &[0.2])),
            Err(CatalogError::Io { .. })
        ));
        assert_eq!(
            catalog.get(SongId(2)),
            Err(CatalogError::NotFound { id: SongId(2) })
        );
        assert!(catalog.delete(SongId(1)).is_err());
        assert_eq!(catalog.get(SongId(1)).unwrap().metadata.title, "kept");
        assert_eq!(catalog.records().unwrap().len(), 1);
    }
}
