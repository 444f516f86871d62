//! Reference resolution.
//!
//! The resolver combines the parser and the catalog cache to turn an address
//! into a concrete value. The public API is silent: any failure collapses to
//! `None` and is logged at debug level, so gameplay callers treat every
//! resolution as fallible. The checked variant preserves the failure taxonomy
//! for the validator.

use crate::catalog::{CatalogCache, LoadStatus};
use crate::reference::ReferenceDescriptor;
use rand::Rng;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Top-level catalog keys that never hold the grouping object.
pub const RESERVED_KEYS: &[&str] = &["metadata", "components", "patterns"];

/// Weight assumed for items without a positive `rarityWeight`.
pub const DEFAULT_RARITY_WEIGHT: u64 = 1;

/// Why a reference failed to resolve. Only the validator surfaces these;
/// the public resolution API degrades to `None`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid reference syntax: {0}")]
    Syntax(String),

    #[error("catalog not found: {domain}/{path}")]
    CatalogNotFound { domain: String, path: String },

    #[error("malformed catalog {domain}/{path}: {detail}")]
    MalformedCatalog {
        domain: String,
        path: String,
        detail: String,
    },

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("property not found: {0}")]
    PropertyNotFound(String),
}

/// Resolves reference addresses against one content root.
///
/// Construct one per game session and pass it explicitly; the cache stays
/// warm across calls. Resolution never mutates content, so a shared
/// `&ContentResolver` is safe from any number of threads.
pub struct ContentResolver {
    cache: CatalogCache,
}

impl ContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ContentResolver {
            cache: CatalogCache::new(root),
        }
    }

    /// The content root this resolver reads from.
    pub fn root(&self) -> &Path {
        self.cache.root()
    }

    /// The backing catalog cache.
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Resolve an address to a value, or `None` on any failure (bad syntax,
    /// missing catalog, category, item, or property). Wildcard picks draw
    /// from the thread-local RNG; use [`resolve_with_rng`] to seed them.
    ///
    /// [`resolve_with_rng`]: ContentResolver::resolve_with_rng
    pub fn resolve(&self, text: &str) -> Option<Value> {
        self.resolve_with_rng(text, &mut rand::thread_rng())
    }

    /// Resolve with a specific RNG for the wildcard draw (useful for testing
    /// and deterministic replay).
    pub fn resolve_with_rng<R: Rng>(&self, text: &str, rng: &mut R) -> Option<Value> {
        match self.resolve_checked(text, rng) {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(reference = text, %error, "reference did not resolve");
                None
            }
        }
    }

    /// Resolve, preserving the failure reason. The optional marker does not
    /// change behavior here; it only affects validator reporting.
    pub(crate) fn resolve_checked<R: Rng>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<Value, ResolveError> {
        let descriptor = ReferenceDescriptor::parse(text)
            .ok_or_else(|| ResolveError::Syntax(text.to_string()))?;
        self.resolve_descriptor(&descriptor, rng)
    }

    pub(crate) fn resolve_descriptor<R: Rng>(
        &self,
        descriptor: &ReferenceDescriptor,
        rng: &mut R,
    ) -> Result<Value, ResolveError> {
        let entry = self.cache.get(&descriptor.domain, &descriptor.path);
        let tree = match &entry.status {
            LoadStatus::Loaded(tree) => tree,
            LoadStatus::NotFound => {
                return Err(ResolveError::CatalogNotFound {
                    domain: descriptor.domain.clone(),
                    path: descriptor.catalog_path(),
                })
            }
            LoadStatus::Malformed(detail) => {
                return Err(ResolveError::MalformedCatalog {
                    domain: descriptor.domain.clone(),
                    path: descriptor.catalog_path(),
                    detail: detail.clone(),
                })
            }
        };

        let grouping = grouping_object(tree).ok_or_else(|| ResolveError::MalformedCatalog {
            domain: descriptor.domain.clone(),
            path: descriptor.catalog_path(),
            detail: "no grouping object beside the reserved keys".to_string(),
        })?;

        let category = grouping
            .get(&descriptor.category)
            .ok_or_else(|| ResolveError::CategoryNotFound(descriptor.category.clone()))?;
        let items = category
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| ResolveError::MalformedCatalog {
                domain: descriptor.domain.clone(),
                path: descriptor.catalog_path(),
                detail: format!("category {} has no items list", descriptor.category),
            })?;

        let item = if descriptor.wildcard {
            pick_weighted(items, rng)
                .ok_or_else(|| ResolveError::ItemNotFound(descriptor.to_string()))?
        } else {
            items
                .iter()
                .find(|item| {
                    item.get("name").and_then(Value::as_str) == Some(descriptor.item_name.as_str())
                })
                .ok_or_else(|| ResolveError::ItemNotFound(descriptor.item_name.clone()))?
        };

        let mut node = item;
        for property in &descriptor.property_path {
            node = property_lookup(node, property)
                .ok_or_else(|| ResolveError::PropertyNotFound(property.clone()))?;
        }
        Ok(node.clone())
    }

    /// Discard all cached catalogs; subsequent resolutions reload from disk.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Find the grouping object: the one top-level key that is not reserved and
/// whose value is an object (e.g. `weapon_types`). The key name varies per
/// catalog, so this is shape-directed rather than name-directed.
pub(crate) fn grouping_object(tree: &Value) -> Option<&Map<String, Value>> {
    tree.as_object()?
        .iter()
        .find(|(key, value)| !RESERVED_KEYS.contains(&key.as_str()) && value.is_object())
        .and_then(|(_, value)| value.as_object())
}

/// An item's sampling weight, floored at 1 when absent or non-positive.
fn rarity_weight(item: &Value) -> u64 {
    match item.get("rarityWeight").and_then(Value::as_i64) {
        Some(weight) if weight > 0 => weight as u64,
        _ => DEFAULT_RARITY_WEIGHT,
    }
}

/// Weighted random pick: draw in `[0, total)` and walk the list accumulating
/// weights. The floor keeps every weight positive, but an empty total still
/// falls back to a uniform pick.
fn pick_weighted<'a, R: Rng>(items: &'a [Value], rng: &mut R) -> Option<&'a Value> {
    if items.is_empty() {
        return None;
    }
    let total: u64 = items.iter().map(rarity_weight).sum();
    if total == 0 {
        return items.get(rng.gen_range(0..items.len()));
    }
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let weight = rarity_weight(item);
        if roll < weight {
            return Some(item);
        }
        roll -= weight;
    }
    items.last()
}

/// Descend one step: object field by key, or array element by index.
fn property_lookup<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(list) => key.parse::<usize>().ok().and_then(|index| list.get(index)),
        _ => None,
    }
}
