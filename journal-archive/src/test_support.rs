//! In-memory stores for unit tests.

use crate::models::JournalEntry;
use crate::store::{AssetStore, EntryStore};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{self, Cursor, Write};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    pub entries: Vec<JournalEntry>,
    pub next_id: i64,
    pub fail_insert_after: Option<usize>,
    pub inserts: usize,
}

impl MemoryEntryStore {
    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        let mut store = Self::default();
        for entry in entries {
            store.insert(&entry).unwrap();
        }
        store.inserts = 0;
        store
    }
}

impl EntryStore for MemoryEntryStore {
    type Error = String;

    fn list_all_newest_first(&self) -> Result<Vec<JournalEntry>, String> {
        let mut all = self.entries.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn insert(&mut self, entry: &JournalEntry) -> Result<i64, String> {
        if self.fail_insert_after == Some(self.inserts) {
            return Err("disk full".to_string());
        }
        self.inserts += 1;
        self.next_id += 1;
        let mut stored = entry.clone();
        stored.id = Some(self.next_id);
        self.entries.push(stored);
        Ok(self.next_id)
    }

    fn delete_all(&mut self) -> Result<(), String> {
        self.entries.clear();
        Ok(())
    }
}

type Blobs = Rc<RefCell<HashMap<String, Vec<u8>>>>;

#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    pub blobs: Blobs,
    pub unreadable: HashSet<String>,
    pub fail_writes: bool,
    pub discarded: Vec<String>,
    pub created: usize,
}

impl MemoryAssetStore {
    pub fn with_photo(self, asset_ref: &str, bytes: &[u8]) -> Self {
        self.blobs
            .borrow_mut()
            .insert(asset_ref.to_string(), bytes.to_vec());
        self
    }

    pub fn bytes(&self, asset_ref: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(asset_ref).cloned()
    }
}

pub struct MemoryAssetWriter {
    key: String,
    blobs: Blobs,
    fail: bool,
}

impl Write for MemoryAssetWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::Other, "storage full"));
        }
        self.blobs
            .borrow_mut()
            .entry(self.key.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AssetStore for MemoryAssetStore {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MemoryAssetWriter;

    fn open_for_read(&mut self, asset_ref: &str) -> io::Result<Self::Reader> {
        if self.unreadable.contains(asset_ref) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "revoked"));
        }
        self.bytes(asset_ref)
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, asset_ref.to_string()))
    }

    fn create_new_asset(&mut self, display_name: &str, _mime_type: &str) -> io::Result<String> {
        self.created += 1;
        let asset_ref = format!("mem://{}/{}", display_name, self.created);
        self.blobs.borrow_mut().insert(asset_ref.clone(), Vec::new());
        Ok(asset_ref)
    }

    fn open_for_write(&mut self, asset_ref: &str) -> io::Result<Self::Writer> {
        Ok(MemoryAssetWriter {
            key: asset_ref.to_string(),
            blobs: Rc::clone(&self.blobs),
            fail: self.fail_writes,
        })
    }

    fn discard(&mut self, asset_ref: &str) -> io::Result<()> {
        self.blobs.borrow_mut().remove(asset_ref);
        self.discarded.push(asset_ref.to_string());
        Ok(())
    }
}
