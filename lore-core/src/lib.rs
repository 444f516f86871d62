//! Content reference resolution engine.
//!
//! Game content lives in a tree of JSON catalogs, and any piece of content
//! can point at any other piece by a compact address instead of embedding a
//! copy:
//!
//! ```text
//! @items/weapons/swords:iron-longsword          whole item
//! @items/weapons/swords:iron-longsword.damage   one property
//! @items/weapons/swords:*                       weighted random pick
//! @items/weapons/swords:ghost-blade?            optional, failure tolerated
//! ```
//!
//! This crate provides:
//! - the address grammar and parser ([`reference`])
//! - lazy, memoized catalog loading ([`catalog`])
//! - address-to-value resolution with wildcard sampling ([`resolver`])
//! - enumeration of existing addresses for tooling ([`discover`])
//! - a referential-integrity sweep over a content tree ([`validate`])
//!
//! Resolution is a read-only query layer: one address yields one value,
//! chaining is the caller's responsibility, and failures degrade to `None`
//! rather than raising.
//!
//! # Quick Start
//!
//! ```ignore
//! use lore_core::ContentResolver;
//!
//! let resolver = ContentResolver::new("content");
//! if let Some(damage) = resolver.resolve("@items/weapons/swords:iron-longsword.damage") {
//!     println!("damage: {damage}");
//! }
//! ```

pub mod catalog;
pub mod discover;
pub mod reference;
pub mod resolver;
pub mod testing;
pub mod validate;

// Primary public API
pub use catalog::{CatalogCache, CatalogEntry, CatalogKey, LoadStatus};
pub use reference::{is_valid, ReferenceDescriptor};
pub use resolver::{ContentResolver, ResolveError};
pub use validate::{Diagnostic, DiagnosticReason};
