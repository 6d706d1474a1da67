//! Order storage: the catalog plus the JSON file it lives in.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::migrate::{self, Document, Migrated};

/// Default storage location, relative to the working directory
pub const DEFAULT_ORDERS_FILE: &str = "orders.json";

/// Owns the catalog and rewrites the whole file after every mutation
#[derive(Debug)]
pub struct OrderStore {
    catalog: Catalog,
    path: PathBuf,
}

impl OrderStore {
    /// Create a store for `path` holding the default empty catalog.
    /// Nothing is read or written until `load`/`save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            catalog: Catalog::with_default_categories(),
            path: path.into(),
        }
    }

    /// Create and load in one go
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total prompts across all categories
    pub fn total(&self) -> usize {
        self.catalog.total()
    }

    /// Load the catalog from disk.
    ///
    /// A missing or malformed file yields `{"combat": [], "narrative": []}`.
    /// A legacy flat list is migrated and written back immediately.
    /// Only I/O failures other than "not found" are returned as errors.
    pub fn load(&mut self) -> Result<()> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No orders file at {}, starting with empty categories",
                    self.path.display()
                );
                self.catalog = Catalog::with_default_categories();
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read orders from {}", self.path.display())
                })
            }
        };

        let doc: Document = match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "Malformed orders file {} ({}), starting with empty categories",
                    self.path.display(),
                    e
                );
                self.catalog = Catalog::with_default_categories();
                return Ok(());
            }
        };

        let Migrated { catalog, applied } = migrate::migrate(doc);
        self.catalog = catalog;

        if !applied.is_empty() {
            tracing::warn!(
                "Upgraded {} ({}), rewriting",
                self.path.display(),
                applied.join(", ")
            );
            self.save()?;
        }

        tracing::info!(
            "Loaded {} orders in {} categories",
            self.catalog.total(),
            self.catalog.categories().count()
        );
        Ok(())
    }

    /// Overwrite the file with the full catalog (pretty-printed, 4-space indent)
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create orders directory")?;
            }
        }

        let mut content = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut content, formatter);
        self.catalog
            .serialize(&mut ser)
            .context("Failed to serialize orders")?;

        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write orders to {}", self.path.display()))?;

        tracing::debug!("Saved {} orders", self.catalog.total());
        Ok(())
    }

    /// Append a prompt to `category` and save.
    ///
    /// Text is trimmed; whitespace-only text is ignored without saving.
    /// Returns whether the prompt was added.
    pub fn add(&mut self, category: &str, text: &str) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty prompt for {}", category);
            return Ok(false);
        }

        self.catalog.push(category, text);
        tracing::debug!("Added order to {}", category);
        self.save()?;
        Ok(true)
    }

    /// Remove the first occurrence of `text` from `category`.
    /// Saves only if something was removed; returns whether it was.
    pub fn remove(&mut self, category: &str, text: &str) -> Result<bool> {
        if !self.catalog.remove_first(category, text) {
            tracing::debug!("Nothing to remove from {}", category);
            return Ok(false);
        }

        tracing::debug!("Removed order from {}", category);
        self.save()?;
        Ok(true)
    }

    /// Remove several `(category, text)` prompts with a single save.
    /// Each pair removes one first occurrence. Returns how many were removed.
    pub fn remove_many<'a, I>(&mut self, orders: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let removed = orders
            .into_iter()
            .filter(|(category, text)| self.catalog.remove_first(category, text))
            .count();

        if removed > 0 {
            tracing::debug!("Removed {} orders", removed);
            self.save()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{COMBAT, NARRATIVE};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> OrderStore {
        OrderStore::new(dir.path().join(DEFAULT_ORDERS_FILE))
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.load().unwrap();

        assert_eq!(store.catalog(), &Catalog::with_default_categories());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), "{\"combat\": [\"half a wri").unwrap();

        store.load().unwrap();
        assert_eq!(store.catalog(), &Catalog::with_default_categories());
    }

    #[test]
    fn test_stray_values_keep_valid_categories() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"combat": ["keep me"], "narrative": ["n1"], "notes": "x"}"#,
        )
        .unwrap();

        store.load().unwrap();
        assert_eq!(store.catalog().get(COMBAT).unwrap(), &["keep me"]);
        store.add(COMBAT, "new").unwrap();

        let reloaded = OrderStore::open(store.path()).unwrap();
        assert_eq!(reloaded.catalog().get(COMBAT).unwrap(), &["keep me", "new"]);
        assert_eq!(reloaded.catalog().get(NARRATIVE).unwrap(), &["n1"]);
        assert!(!reloaded.catalog().contains_category("notes"));
    }

    #[test]
    fn test_load_unknown_top_level_shape() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), "42").unwrap();

        store.load().unwrap();
        assert_eq!(store.catalog(), &Catalog::with_default_categories());
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(COMBAT, "Flank left").unwrap();
        store.add(NARRATIVE, "Find the informant").unwrap();
        store.add("social", "Bluff the captain").unwrap();
        store.add(COMBAT, "Flank left").unwrap();

        let reloaded = OrderStore::open(store.path()).unwrap();
        assert_eq!(reloaded.catalog(), store.catalog());
    }

    #[test]
    fn test_legacy_list_is_migrated_and_rewritten() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), r#"["a", "b"]"#).unwrap();

        store.load().unwrap();
        assert_eq!(store.catalog().get(NARRATIVE).unwrap(), &["a", "b"]);
        assert_eq!(store.catalog().get(COMBAT).unwrap().len(), 0);

        // File now holds the mapping shape
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(on_disk.is_object());
        assert_eq!(on_disk["narrative"], serde_json::json!(["a", "b"]));
        assert_eq!(on_disk["combat"], serde_json::json!([]));
    }

    #[test]
    fn test_second_load_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        fs::write(store.path(), r#"["a"]"#).unwrap();
        store.load().unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        store.load().unwrap();
        let second = fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_add_trims_text() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(store.add(COMBAT, "  Hold the line \n").unwrap());
        assert_eq!(store.catalog().get(COMBAT).unwrap(), &["Hold the line"]);
    }

    #[test]
    fn test_add_whitespace_does_not_save() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        assert!(!store.add(COMBAT, "  ").unwrap());
        assert_eq!(store.catalog(), &Catalog::with_default_categories());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_remove_missing_leaves_catalog() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(COMBAT, "y").unwrap();
        let before = store.catalog().clone();

        assert!(!store.remove(COMBAT, "x").unwrap());
        assert!(!store.remove("unknown", "y").unwrap());
        assert_eq!(store.catalog(), &before);
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(COMBAT, "x").unwrap();
        store.add(COMBAT, "x").unwrap();

        assert!(store.remove(COMBAT, "x").unwrap());
        let reloaded = OrderStore::open(store.path()).unwrap();
        assert_eq!(reloaded.catalog().get(COMBAT).unwrap(), &["x"]);
    }

    #[test]
    fn test_remove_many() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        for text in ["a", "b", "c"] {
            store.add(NARRATIVE, text).unwrap();
        }

        store.add(COMBAT, "a").unwrap();

        let removed = store
            .remove_many([(NARRATIVE, "a"), (NARRATIVE, "c"), (NARRATIVE, "zzz"), (COMBAT, "a")])
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.catalog().get(NARRATIVE).unwrap(), &["b"]);
        assert!(store.catalog().get(COMBAT).unwrap().is_empty());

        let reloaded = OrderStore::open(store.path()).unwrap();
        assert_eq!(reloaded.catalog(), store.catalog());
    }

    #[test]
    fn test_save_uses_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.add(COMBAT, "x").unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("{\n    \"combat\": [\n        \"x\"\n    ],"));
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("nested/deck/orders.json"));
        store.save().unwrap();
        assert!(store.path().exists());
    }
}
