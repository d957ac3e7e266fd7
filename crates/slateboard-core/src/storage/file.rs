//! JSON-file storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::export::ExportedCanvas;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each document as `<id>.json` in a directory, with the id
/// percent-encoded.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// File storage in the per-user data directory.
    ///
    /// On Linux: `~/.local/share/slateboard/documents/`
    /// On Windows: `%LOCALAPPDATA%\slateboard\documents\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("slateboard").join("documents"))
    }

    /// Ids are percent-encoded into file names, so distinct ids never share
    /// a file and no id can reach outside `base_path`.
    fn document_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", urlencoding::encode(id)))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &ExportedCanvas) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let json = document.to_json();

        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))?;
            log::info!("Saved document to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ExportedCanvas>> {
        let path = self.document_path(id);
        let id = id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))?;
            let document = ExportedCanvas::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })?;
            log::info!("Loaded document from {}", path.display());
            Ok(document)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(Vec::new());
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;

            let ids = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| {
                    let stem = path.file_stem()?.to_str()?;
                    match urlencoding::decode(stem) {
                        Ok(id) => Some(id.into_owned()),
                        Err(e) => {
                            log::warn!("Ignoring {}: {e}", path.display());
                            None
                        }
                    }
                })
                .collect();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::storage::block_on;
    use kurbo::Rect;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 300.0, 150.0), 2, 2);
        canvas.add_row(table, &[]);
        let exported = canvas.export();

        block_on(storage.save("board", &exported)).unwrap();
        assert!(dir.path().join("board.json").exists());
        assert_eq!(block_on(storage.load("board")).unwrap(), exported);
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(matches!(block_on(storage.load("nope")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();
        assert!(matches!(block_on(storage.load("bad")), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_list_only_json_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        block_on(storage.save("doc1", &ExportedCanvas::default())).unwrap();
        block_on(storage.save("doc2", &ExportedCanvas::default())).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let mut ids = block_on(storage.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["doc1", "doc2"]);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        block_on(storage.save("gone", &ExportedCanvas::default())).unwrap();
        block_on(storage.delete("gone")).unwrap();
        assert!(!block_on(storage.exists("gone")).unwrap());
    }

    #[test]
    fn test_ids_are_encoded_into_file_names() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        block_on(storage.save("../escape me", &ExportedCanvas::default())).unwrap();
        assert!(storage.base_path().join("..%2Fescape%20me.json").exists());
        assert!(!dir.path().join("escape me.json").exists());
        assert!(block_on(storage.exists("../escape me")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["../escape me"]);
    }

    #[test]
    fn test_similar_ids_do_not_collide() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut canvas = Canvas::new();
        canvas.create_table(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 1);
        let with_table = canvas.export();
        block_on(storage.save("a.b", &with_table)).unwrap();
        block_on(storage.save("a_b", &ExportedCanvas::default())).unwrap();
        block_on(storage.save("a/b", &ExportedCanvas::default())).unwrap();

        assert_eq!(block_on(storage.load("a.b")).unwrap(), with_table);
        assert_eq!(block_on(storage.load("a_b")).unwrap(), ExportedCanvas::default());
        let mut ids = block_on(storage.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a.b", "a/b", "a_b"]);
    }
}
