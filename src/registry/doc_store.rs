use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::models::{Document, DocumentId, StoreError, DEFAULT_MAX_DOCUMENT_LENGTH};

/// A document shared between every session attached to it. The mutex is the
/// document's own lock: queue mutation and resolution happen under it.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Store entry. The name is kept beside the document so lookups never wait
/// on a document lock.
#[derive(Debug)]
struct StoredDocument {
    name: String,
    doc: SharedDocument,
}

/// Every document created since startup, in creation order. Documents are never removed.
///
/// Lock order is store first, then document. Only `rename` takes a document
/// lock while holding the store, and only on the document being renamed.
#[derive(Debug)]
pub struct DocumentStore {
    documents: RwLock<Vec<StoredDocument>>,
    next_id: AtomicU64,
    untitled_counter: Mutex<u64>,
    max_document_length: usize,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_DOCUMENT_LENGTH)
    }

    /// A store whose documents refuse to grow past `max_document_length` characters.
    pub fn with_max_length(max_document_length: usize) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            untitled_counter: Mutex::new(1),
            max_document_length,
        }
    }

    fn name_taken(documents: &[StoredDocument], name: &str) -> bool {
        documents.iter().any(|entry| entry.name == name)
    }

    /// Creates a document named `name`, or `untitledN.txt` when no name is given.
    pub fn create(&self, name: Option<&str>) -> Result<SharedDocument, StoreError> {
        let mut documents = self.documents.write();

        let name = match name {
            Some(name) => {
                if Self::name_taken(&documents, name) {
                    return Err(StoreError::AlreadyExists(name.to_string()));
                }
                name.to_string()
            }
            None => {
                let mut counter = self.untitled_counter.lock();
                loop {
                    let candidate = format!("untitled{}.txt", *counter);
                    *counter += 1;
                    if !Self::name_taken(&documents, &candidate) {
                        break candidate;
                    }
                }
            }
        };

        let id = DocumentId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let doc = Arc::new(Mutex::new(Document::with_max_length(
            id,
            name.clone(),
            self.max_document_length,
        )));
        info!("Created document {} ({})", name, id);
        documents.push(StoredDocument {
            name,
            doc: doc.clone(),
        });
        Ok(doc)
    }

    pub fn find(&self, name: &str) -> Option<SharedDocument> {
        self.documents
            .read()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.doc.clone())
    }

    pub fn rename(&self, doc: &SharedDocument, new_name: &str) -> Result<(), StoreError> {
        let mut documents = self.documents.write();
        if Self::name_taken(&documents, new_name) {
            return Err(StoreError::AlreadyExists(new_name.to_string()));
        }
        let Some(entry) = documents.iter_mut().find(|entry| Arc::ptr_eq(&entry.doc, doc)) else {
            return Err(StoreError::NotFound(doc.lock().name().to_string()));
        };
        info!("Renamed document {} to {}", entry.name, new_name);
        entry.name = new_name.to_string();
        doc.lock().set_name(new_name);
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.documents
            .read()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<SharedDocument> {
        self.documents
            .read()
            .iter()
            .map(|entry| entry.doc.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Next number a default name would try.
    pub fn untitled_counter(&self) -> u64 {
        *self.untitled_counter.lock()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_count_up() {
        let store = DocumentStore::new();
        let first = store.create(None).unwrap();
        let second = store.create(None).unwrap();
        assert_eq!(first.lock().name(), "untitled1.txt");
        assert_eq!(second.lock().name(), "untitled2.txt");
        assert_eq!(store.untitled_counter(), 3);
    }

    #[test]
    fn explicit_names_do_not_advance_the_counter() {
        let store = DocumentStore::new();
        store.create(Some("notes.txt")).unwrap();
        assert_eq!(store.untitled_counter(), 1);
        assert_eq!(store.names(), vec!["notes.txt".to_string()]);
    }

    #[test]
    fn default_name_skips_taken_names() {
        let store = DocumentStore::new();
        store.create(Some("untitled1.txt")).unwrap();
        let doc = store.create(None).unwrap();
        assert_eq!(doc.lock().name(), "untitled2.txt");
    }

    #[test]
    fn names_are_unique() {
        let store = DocumentStore::new();
        store.create(Some("a.txt")).unwrap();
        assert_eq!(
            store.create(Some("a.txt")).unwrap_err(),
            StoreError::AlreadyExists("a.txt".to_string())
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_returns_the_shared_instance() {
        let store = DocumentStore::new();
        let created = store.create(Some("shared.txt")).unwrap();
        created.lock().insert(0, "hi").unwrap();
        let found = store.find("shared.txt").unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.lock().text(), "hi");
        assert!(store.find("missing.txt").is_none());
    }

    #[test]
    fn rename_keeps_names_unique() {
        let store = DocumentStore::new();
        let a = store.create(Some("a.txt")).unwrap();
        store.create(Some("b.txt")).unwrap();
        assert!(store.rename(&a, "b.txt").is_err());
        store.rename(&a, "c.txt").unwrap();
        assert_eq!(store.names(), vec!["c.txt".to_string(), "b.txt".to_string()]);
        assert!(store.find("a.txt").is_none());
    }

    #[test]
    fn documents_get_distinct_ids() {
        let store = DocumentStore::new();
        let a = store.create(None).unwrap();
        let b = store.create(None).unwrap();
        assert_ne!(a.lock().id(), b.lock().id());
        let doc = a.lock();
        assert_eq!(doc.queue().document(), doc.id());
    }

    #[test]
    fn lookups_do_not_wait_on_a_locked_document() {
        let store = DocumentStore::new();
        let busy = store.create(Some("busy.txt")).unwrap();
        store.create(Some("idle.txt")).unwrap();

        let _held = busy.lock();
        assert!(store.find("idle.txt").is_some());
        assert!(Arc::ptr_eq(&store.find("busy.txt").unwrap(), &busy));
        assert_eq!(store.names(), vec!["busy.txt".to_string(), "idle.txt".to_string()]);
        assert!(store.create(Some("busy.txt")).is_err());
        store.create(None).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn documents_inherit_the_store_length_limit() {
        let store = DocumentStore::with_max_length(4);
        let doc = store.create(None).unwrap();
        let mut doc = doc.lock();
        doc.insert(0, "abcd").unwrap();
        assert!(doc.insert(4, "e").is_err());
        assert_eq!(doc.text(), "abcd");
    }
}
