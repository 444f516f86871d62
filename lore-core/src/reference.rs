//! Reference address parsing.
//!
//! A reference is a compact textual pointer to a content item:
//!
//! ```text
//! @<domain>/<segment>(/<segment>)*:<item|*>[.<property>(.<property>)*][?]
//! ```
//!
//! The last path segment is the category; everything between the domain and
//! the category is the catalog path (possibly empty). A `*` item requests a
//! weighted random pick, and a trailing `?` marks the reference optional.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The item-name token that requests weighted random selection.
pub const WILDCARD: &str = "*";

/// Error for [`FromStr`] parsing of references.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid reference syntax: {0}")]
pub struct SyntaxError(pub String);

/// A parsed reference address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    /// First address segment, e.g. `items`.
    pub domain: String,
    /// Segments between domain and category (possibly empty).
    pub path: Vec<String>,
    /// Last segment before the `:`.
    pub category: String,
    /// Item name, or `*` for a wildcard pick.
    pub item_name: String,
    /// Keys after the item name, split on `.`, kept verbatim.
    pub property_path: Vec<String>,
    /// Trailing `?` was present.
    pub optional: bool,
    /// Item name is the wildcard token.
    pub wildcard: bool,
}

impl ReferenceDescriptor {
    /// Parse a reference address. Returns `None` on any grammar violation:
    /// missing leading `@`, fewer than two segments before the `:`, an empty
    /// segment or item name, or empty/whitespace input.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('@')?;
        if rest.is_empty() || rest.contains(char::is_whitespace) {
            return None;
        }

        // The optional marker is stripped first; it may follow the item name
        // or the property path.
        let (rest, optional) = match rest.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (rest, false),
        };

        let (address, item_part) = rest.split_once(':')?;
        let segments: Vec<&str> = address.split('/').collect();
        // Need at least domain + category.
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let domain = segments[0].to_string();
        let category = segments[segments.len() - 1].to_string();
        let path = segments[1..segments.len() - 1]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (item_name, property_path) = match item_part.split_once('.') {
            Some((name, props)) => (
                name,
                props.split('.').map(str::to_string).collect::<Vec<_>>(),
            ),
            None => (item_part, Vec::new()),
        };
        if item_name.is_empty() || property_path.iter().any(|p| p.is_empty()) {
            return None;
        }

        Some(ReferenceDescriptor {
            domain,
            path,
            category,
            item_name: item_name.to_string(),
            property_path,
            optional,
            wildcard: item_name == WILDCARD,
        })
    }

    /// Build a descriptor for a concrete item with no property path.
    pub fn item(
        domain: impl Into<String>,
        path: &[String],
        category: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        let item_name = item_name.into();
        ReferenceDescriptor {
            domain: domain.into(),
            path: path.to_vec(),
            category: category.into(),
            item_name: item_name.clone(),
            property_path: Vec::new(),
            optional: false,
            wildcard: item_name == WILDCARD,
        }
    }

    /// The catalog path as a `/`-joined string (for display in errors).
    pub fn catalog_path(&self) -> String {
        self.path.join("/")
    }
}

impl fmt::Display for ReferenceDescriptor {
    /// Canonical address form. The optional marker always renders last,
    /// after any property path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.domain)?;
        for segment in &self.path {
            write!(f, "/{segment}")?;
        }
        write!(f, "/{}:{}", self.category, self.item_name)?;
        for property in &self.property_path {
            write!(f, ".{property}")?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl FromStr for ReferenceDescriptor {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferenceDescriptor::parse(s).ok_or_else(|| SyntaxError(s.to_string()))
    }
}

/// Whether the text is a well-formed reference address.
pub fn is_valid(text: &str) -> bool {
    ReferenceDescriptor::parse(text).is_some()
}
