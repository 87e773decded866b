//! Bookmark and tag store over a string key/value storage.
//!
//! Records use two key shapes:
//!
//! - `bookmark:<tag_id>:<path>` → number (a timestamp)
//! - `tag:<tag_id>` → `main:<name>` or `sub:<name>`
//!
//! Records that do not parse are skipped on load, never reported as errors.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::warn;

use crate::config::{BOOKMARK_RECORD_KIND, TAG_RECORD_KIND};
use crate::error::StorageError;

// ============================================================================
// Storage
// ============================================================================

/// Minimal `localStorage`-shaped storage.
pub trait KeyValueStorage {
    fn len(&self) -> usize;
    fn key(&self, index: usize) -> Option<String>;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage, used when no persistent storage is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.entries.keys().nth(index).cloned()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// Bookmark Types
// ============================================================================

/// A named tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    /// Main tags get a button in the tagger; sub tags are reachable from the
    /// bookmark listing only.
    pub main: bool,
}

/// A tagged path and its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkItem {
    pub path: String,
    pub num: String,
}

// ============================================================================
// BookmarkList
// ============================================================================

/// Tag ↔ path table loaded from, and written through to, a storage.
pub struct BookmarkList {
    storage: Box<dyn KeyValueStorage>,
    tags_by_name: BTreeMap<String, Tag>,
    items_by_tag: HashMap<String, BTreeMap<String, String>>,
    tags_by_path: HashMap<String, BTreeSet<String>>,
}

impl BookmarkList {
    /// Load every well-formed record from `storage`.
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let mut list = Self {
            storage,
            tags_by_name: BTreeMap::new(),
            items_by_tag: HashMap::new(),
            tags_by_path: HashMap::new(),
        };

        let records: Vec<(String, String)> = (0..list.storage.len())
            .filter_map(|i| list.storage.key(i))
            .filter_map(|key| list.storage.get(&key).map(|value| (key, value)))
            .collect();

        for (key, value) in records {
            if let Err(reason) = list.load_record(&key, &value) {
                warn!("skipping malformed bookmark record {key:?}: {reason}");
            }
        }

        list
    }

    fn load_record(&mut self, key: &str, value: &str) -> Result<(), &'static str> {
        let (kind, content) = key.split_once(':').ok_or("missing kind")?;

        match kind {
            BOOKMARK_RECORD_KIND => {
                let (tag, path) = content.split_once(':').ok_or("missing tag")?;
                self.insert(tag, path, value);
            }
            TAG_RECORD_KIND => {
                let (main, name) = value.split_once(':').ok_or("missing tag kind")?;
                self.tags_by_name.insert(
                    name.to_string(),
                    Tag {
                        id: content.to_string(),
                        name: name.to_string(),
                        main: main == "main",
                    },
                );
            }
            // Unrelated application keys share the storage.
            _ => {}
        }
        Ok(())
    }

    fn insert(&mut self, tag_id: &str, path: &str, num: &str) {
        self.items_by_tag
            .entry(tag_id.to_string())
            .or_default()
            .insert(path.to_string(), num.to_string());
        self.tags_by_path
            .entry(path.to_string())
            .or_default()
            .insert(tag_id.to_string());
    }

    /// Tag `path` with `tag_id`, recording `num`. Nothing changes when the
    /// write fails.
    pub fn set_tag(&mut self, path: &str, tag_id: &str, num: &str) -> Result<(), StorageError> {
        self.storage.set(&bookmark_key(tag_id, path), num)?;
        self.insert(tag_id, path, num);
        Ok(())
    }

    /// Remove `tag_id` from `path`. Nothing changes when the removal fails.
    pub fn unset_tag(&mut self, path: &str, tag_id: &str) -> Result<(), StorageError> {
        self.storage.remove(&bookmark_key(tag_id, path))?;
        if let Some(items) = self.items_by_tag.get_mut(tag_id) {
            items.remove(path);
        }
        if let Some(tags) = self.tags_by_path.get_mut(path) {
            tags.remove(tag_id);
        }
        Ok(())
    }

    /// Tag ids attached to `path`.
    pub fn tags_of(&self, path: &str) -> Vec<String> {
        self.tags_by_path
            .get(path)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Items tagged with `tag_id`, ordered by number.
    pub fn items_of(&self, tag_id: &str) -> Vec<BookmarkItem> {
        let mut items: Vec<BookmarkItem> = self
            .items_by_tag
            .get(tag_id)
            .map(|items| {
                items
                    .iter()
                    .map(|(path, num)| BookmarkItem {
                        path: path.clone(),
                        num: num.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by(|a, b| {
            let key = |item: &BookmarkItem| item.num.parse::<u64>().ok();
            key(a).cmp(&key(b)).then_with(|| a.num.cmp(&b.num))
        });
        items
    }

    /// Every known tag, ordered by name.
    pub fn tags(&self) -> Vec<Tag> {
        self.tags_by_name.values().cloned().collect()
    }

    pub fn find_tag(&self, name: &str) -> Option<&Tag> {
        self.tags_by_name.get(name)
    }
}

fn bookmark_key(tag_id: &str, path: &str) -> String {
    format!("{BOOKMARK_RECORD_KIND}:{tag_id}:{path}")
}

// ============================================================================
// Tests
// ============================================================================
