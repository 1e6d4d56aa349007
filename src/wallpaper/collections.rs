use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;

use super::types::GeneratedImage;
use crate::error::AppError;

pub const FAVORITES_RECORD: &str = "favorites";
pub const HISTORY_RECORD: &str = "history";
pub const HISTORY_LIMIT: usize = 10;

/// Durable named records, one JSON file per record.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// Absent and malformed records both read as `None`.
    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.record_path(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(component = "collections", "Failed to read {}: {}", name, e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(component = "collections", "Failed to parse {}: {}", name, e);
                None
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), AppError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string(value)?;
        let path = self.record_path(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Writes without surfacing failures; the in-memory collection stays authoritative.
    fn persist<T: Serialize + ?Sized>(&self, name: &str, value: &T) {
        if let Err(e) = self.write(name, value) {
            tracing::warn!(component = "collections", "Failed to persist {}: {}", name, e);
        }
    }
}

/// User-curated images, newest first, unique by `src`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    items: Vec<GeneratedImage>,
}

impl Favorites {
    pub fn from_items(items: Vec<GeneratedImage>) -> Self {
        let mut unique: Vec<GeneratedImage> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|existing| existing.same_src(&item)) {
                unique.push(item);
            }
        }
        Self { items: unique }
    }

    pub fn items(&self) -> &[GeneratedImage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, src: &str) -> bool {
        self.items.iter().any(|fav| fav.src == src)
    }

    /// Removes the image if present, otherwise prepends a copy. Returns the new membership.
    pub fn toggle(&mut self, image: &GeneratedImage) -> bool {
        if self.contains(&image.src) {
            self.items.retain(|fav| fav.src != image.src);
            false
        } else {
            self.items.insert(0, image.clone());
            true
        }
    }
}

/// Submitted prompts, newest first, capped at [`HISTORY_LIMIT`], no duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptHistory {
    entries: Vec<String>,
}

impl PromptHistory {
    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            if !history.entries.contains(&entry) {
                history.entries.push(entry);
            }
        }
        history.entries.truncate(HISTORY_LIMIT);
        history
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.iter().any(|p| p == prompt)
    }

    /// Prepends a new prompt, dropping the oldest beyond the cap. Known prompts keep their slot.
    pub fn record(&mut self, prompt: &str) -> bool {
        if self.contains(prompt) {
            return false;
        }
        self.entries.insert(0, prompt.to_string());
        self.entries.truncate(HISTORY_LIMIT);
        true
    }
}

/// Favorites and history mirrored to a [`JsonFileStore`]; every mutation is written through.
#[derive(Debug, Clone)]
pub struct Collections {
    store: JsonFileStore,
    favorites: Favorites,
    history: PromptHistory,
}

impl Collections {
    pub fn load(store: JsonFileStore) -> Self {
        let favorites = Favorites::from_items(store.read(FAVORITES_RECORD).unwrap_or_default());
        let history = PromptHistory::from_entries(store.read(HISTORY_RECORD).unwrap_or_default());
        tracing::info!(
            component = "collections",
            "Loaded {} favorites and {} history entries",
            favorites.len(),
            history.entries().len()
        );
        Self {
            store,
            favorites,
            history,
        }
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    pub fn toggle_favorite(&mut self, image: &GeneratedImage) -> bool {
        let now_favorite = self.favorites.toggle(image);
        self.store.persist(FAVORITES_RECORD, self.favorites.items());
        now_favorite
    }

    pub fn record_prompt(&mut self, prompt: &str) {
        if self.history.record(prompt) {
            self.store.persist(HISTORY_RECORD, self.history.entries());
        }
    }
}
