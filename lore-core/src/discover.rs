//! Content discovery for tooling.
//!
//! Enumerates what addresses exist so editors and documentation generators
//! can offer completions. Gameplay code never calls these.

use crate::reference::ReferenceDescriptor;
use crate::resolver::{grouping_object, ContentResolver};
use serde_json::Value;
use std::fs;

impl ContentResolver {
    /// Every first-level directory under the content root, sorted.
    pub fn available_domains(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.root()) else {
            return Vec::new();
        };
        let mut domains: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        domains.sort();
        domains
    }

    /// Every category key inside the addressed catalog's grouping object.
    pub fn available_categories(&self, domain: &str, path: &[String]) -> Vec<String> {
        let entry = self.cache().get(domain, path);
        let Some(tree) = entry.tree() else {
            return Vec::new();
        };
        grouping_object(tree)
            .map(|grouping| grouping.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// One canonical address per item in the category, in file order.
    pub fn available_references(
        &self,
        domain: &str,
        path: &[String],
        category: &str,
    ) -> Vec<String> {
        let entry = self.cache().get(domain, path);
        let Some(tree) = entry.tree() else {
            return Vec::new();
        };
        let Some(items) = grouping_object(tree)
            .and_then(|grouping| grouping.get(category))
            .and_then(|cat| cat.get("items"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .map(|name| ReferenceDescriptor::item(domain, path, category, name).to_string())
            .collect()
    }
}
