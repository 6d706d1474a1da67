//! The order catalog: category name → ordered list of prompts.
//!
//! Categories keep the order they were first seen in (document order on load,
//! insertion order afterwards). Prompts keep their order within a category and
//! may repeat.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Category conventionally used for fight prompts
pub const COMBAT: &str = "combat";
/// Category conventionally used for story prompts; legacy lists migrate here
pub const NARRATIVE: &str = "narrative";

/// Ordered category → prompts mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<(String, Vec<String>)>,
}

/// One prompt as shown in a flat list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub category: String,
    pub text: String,
}

impl Catalog {
    /// Empty catalog with no categories at all
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"combat": [], "narrative": []}`
    pub fn with_default_categories() -> Self {
        let mut catalog = Self::new();
        catalog.ensure_category(COMBAT);
        catalog.ensure_category(NARRATIVE);
        catalog
    }

    /// Prompts for a category, if the category exists
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, prompts)| prompts.as_slice())
    }

    /// Whether the category key is present (even if empty)
    pub fn contains_category(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Create the category if absent, returning its prompts
    pub fn ensure_category(&mut self, category: &str) -> &mut Vec<String> {
        let idx = match self.categories.iter().position(|(name, _)| name == category) {
            Some(idx) => idx,
            None => {
                self.categories.push((category.to_string(), Vec::new()));
                self.categories.len() - 1
            }
        };
        &mut self.categories[idx].1
    }

    /// Replace (or create) a category's whole prompt list, keeping its position
    pub fn insert(&mut self, category: impl Into<String>, prompts: Vec<String>) {
        let category = category.into();
        *self.ensure_category(&category) = prompts;
    }

    /// Append a prompt, creating the category lazily
    pub fn push(&mut self, category: &str, text: impl Into<String>) {
        self.ensure_category(category).push(text.into());
    }

    /// Remove the first exact occurrence of `text` in `category`.
    /// Returns false when either the category or the text is missing.
    pub fn remove_first(&mut self, category: &str, text: &str) -> bool {
        let Some((_, prompts)) = self.categories.iter_mut().find(|(name, _)| name == category)
        else {
            return false;
        };
        match prompts.iter().position(|p| p == text) {
            Some(idx) => {
                prompts.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Category names in catalog order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// (category, prompts) pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, prompts)| (name.as_str(), prompts.as_slice()))
    }

    /// Total number of prompts across all categories
    pub fn total(&self) -> usize {
        self.categories.iter().map(|(_, prompts)| prompts.len()).sum()
    }

    /// True when there are no prompts (categories may still exist)
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Flatten into list rows, category by category
    pub fn rows(&self) -> Vec<OrderRow> {
        self.iter()
            .flat_map(|(category, prompts)| {
                prompts.iter().map(move |text| OrderRow {
                    category: category.to_string(),
                    text: text.clone(),
                })
            })
            .collect()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, prompts) in &self.categories {
            map.serialize_entry(name, prompts)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to lists of prompts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
                let mut catalog = Catalog::new();
                while let Some(name) = access.next_key::<String>()? {
                    let value: Value = access.next_value()?;
                    if let Some(prompts) = prompts_from_value(&name, value) {
                        // Repeated keys: last one wins, first position kept
                        catalog.insert(name, prompts);
                    }
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Prompts of one category as read from a document.
///
/// Non-string items are dropped; a value that is not a list drops the
/// whole category. Both are logged so the rest of the document still loads.
fn prompts_from_value(category: &str, value: Value) -> Option<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            tracing::warn!(
                "Skipping category '{}': expected a list of prompts, found {}",
                category,
                other
            );
            return None;
        }
    };

    let count = items.len();
    let prompts: Vec<String> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text),
            _ => None,
        })
        .collect();
    if prompts.len() < count {
        tracing::warn!(
            "Dropped {} non-text entries from category '{}'",
            count - prompts.len(),
            category
        );
    }
    Some(prompts)
}
