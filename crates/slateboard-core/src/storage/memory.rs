//! In-memory storage.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::export::ExportedCanvas;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Keeps documents in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, ExportedCanvas>>,
}

fn lock_error<T>(e: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &ExportedCanvas) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let document = document.clone();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            log::info!("Saved document '{id}' in memory");
            docs.insert(id, document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ExportedCanvas>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(lock_error)?.contains_key(&id)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{CanvasObject, Shape};
    use crate::storage::block_on;
    use kurbo::Point;

    fn document() -> ExportedCanvas {
        ExportedCanvas {
            objects: vec![CanvasObject::Circle(Shape::new(1, Point::new(5.0, 5.0), 60.0, 60.0))],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("board", &document())).unwrap();
        assert_eq!(block_on(storage.load("board")).unwrap(), document());
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(block_on(storage.load("missing")), Err(StorageError::NotFound(id)) if id == "missing"));
    }

    #[test]
    fn test_delete_and_exists() {
        let storage = MemoryStorage::new();
        block_on(storage.save("a", &document())).unwrap();
        assert!(block_on(storage.exists("a")).unwrap());

        block_on(storage.delete("a")).unwrap();
        assert!(!block_on(storage.exists("a")).unwrap());
        // Deleting again is fine
        block_on(storage.delete("a")).unwrap();
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("a", &document())).unwrap();
        block_on(storage.save("b", &ExportedCanvas::default())).unwrap();
        let mut ids = block_on(storage.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
