//! Upgrades persisted order documents to the current shape.
//!
//! A document is detected by shape, then the step registered for that shape is
//! applied, and so on until the document is current. Adding a future format
//! means adding a `Shape` variant and one entry to `MIGRATIONS`.

use serde::Deserialize;

use crate::catalog::{Catalog, COMBAT, NARRATIVE};

/// Any document shape we know how to read
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Document {
    /// Pre-category format: a flat list of prompts
    LegacyList(Vec<String>),
    /// category → prompts
    Current(Catalog),
}

/// Detected shape of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    LegacyList,
    Current,
}

impl Document {
    pub fn shape(&self) -> Shape {
        match self {
            Document::LegacyList(_) => Shape::LegacyList,
            Document::Current(_) => Shape::Current,
        }
    }
}

/// A single upgrade step from one shape towards the current one
struct Migration {
    from: Shape,
    name: &'static str,
    apply: fn(Document) -> Document,
}

const MIGRATIONS: &[Migration] = &[Migration {
    from: Shape::LegacyList,
    name: "flat list to categories",
    apply: list_to_categories,
}];

/// Every legacy prompt becomes narrative; combat starts empty.
fn list_to_categories(doc: Document) -> Document {
    match doc {
        Document::LegacyList(prompts) => {
            let mut catalog = Catalog::new();
            catalog.insert(COMBAT, Vec::new());
            catalog.insert(NARRATIVE, prompts);
            Document::Current(catalog)
        }
        current => current,
    }
}

/// Result of running the migration chain
#[derive(Debug)]
pub struct Migrated {
    pub catalog: Catalog,
    /// Names of the steps that ran, in order. Empty when already current.
    pub applied: Vec<&'static str>,
}

/// Apply migration steps until the document is in the current shape
pub fn migrate(mut doc: Document) -> Migrated {
    let mut applied = Vec::new();
    loop {
        if let Document::Current(catalog) = doc {
            return Migrated { catalog, applied };
        }

        let shape = doc.shape();
        // Every non-current shape has a registered step
        let Some(step) = MIGRATIONS.iter().find(|m| m.from == shape) else {
            tracing::warn!("No migration registered for {:?}, starting empty", shape);
            return Migrated {
                catalog: Catalog::with_default_categories(),
                applied,
            };
        };

        tracing::info!("Migrating orders document: {}", step.name);
        doc = (step.apply)(doc);
        applied.push(step.name);
    }
}
