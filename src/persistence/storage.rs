//! Storage backends for the single working project

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use super::StorageError;
use crate::model::Document;

/// Load/save of one project under a fixed key
pub trait Storage {
    /// The stored project, or `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<Document>, StorageError>;

    fn save(&mut self, doc: &Document) -> Result<(), StorageError>;
}

/// One pretty-printed JSON file per project id inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
    project_id: String,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>, project_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            project_id: project_id.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.project_id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<Document>, StorageError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored project");
                return Ok(None);
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };
        let doc = serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            key: self.project_id.clone(),
            source,
        })?;
        info!(path = %path.display(), "loaded project");
        Ok(Some(doc))
    }

    fn save(&mut self, doc: &Document) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let json = serde_json::to_string_pretty(doc).map_err(StorageError::Serialize)?;
        let path = self.path();
        // Write beside the target and rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))?;
        debug!(path = %path.display(), "saved project");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    doc: Option<Document>,
    writes: usize,
}

/// In-memory storage; clones share the same slot so a test can keep a handle
/// while the session owns another
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<MemorySlot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `doc`
    pub fn with_document(doc: Document) -> Self {
        let storage = Self::default();
        storage.slot.borrow_mut().doc = Some(doc);
        storage
    }

    /// Number of completed saves
    pub fn writes(&self) -> usize {
        self.slot.borrow().writes
    }

    /// The last saved document
    pub fn stored(&self) -> Option<Document> {
        self.slot.borrow().doc.clone()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<Document>, StorageError> {
        Ok(self.slot.borrow().doc.clone())
    }

    fn save(&mut self, doc: &Document) -> Result<(), StorageError> {
        let mut slot = self.slot.borrow_mut();
        slot.doc = Some(doc.clone());
        slot.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shares_slot() {
        let handle = MemoryStorage::new();
        let mut owned = handle.clone();
        assert!(owned.load().unwrap().is_none());

        let doc = Document::with_initial_flow("flow_1");
        owned.save(&doc).unwrap();
        owned.save(&doc).unwrap();

        assert_eq!(handle.writes(), 2);
        assert_eq!(handle.stored(), Some(doc));
    }

    #[test]
    fn test_file_storage_path() {
        let storage = JsonFileStorage::new("/tmp/projects", "current_project");
        assert_eq!(storage.path(), PathBuf::from("/tmp/projects/current_project.json"));
    }
}
