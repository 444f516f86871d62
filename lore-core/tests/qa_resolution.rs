//! QA tests for end-to-end reference resolution.
//!
//! These tests verify the resolution pipeline against a real on-disk content
//! root: exact lookup, property traversal, wildcard sampling, discovery, and
//! cache behavior.

use lore_core::testing::write_sample_root;
use lore_core::{is_valid, ContentResolver, ReferenceDescriptor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

fn sample_resolver() -> (TempDir, ContentResolver) {
    let root = TempDir::new().expect("Failed to create temp dir");
    write_sample_root(root.path()).expect("Failed to write sample root");
    let resolver = ContentResolver::new(root.path());
    (root, resolver)
}

// =============================================================================
// EXACT RESOLUTION
// =============================================================================

#[test]
fn test_exact_item_resolution_keeps_all_fields() {
    let (_root, resolver) = sample_resolver();

    let item = resolver
        .resolve("@items/weapons/swords:iron-longsword")
        .expect("item should resolve");

    assert_eq!(item["name"], "iron-longsword");
    assert_eq!(item["damage"], 10);
    assert_eq!(item["durability"], 50);
    assert_eq!(item["tags"], json!(["melee", "one-handed"]));
}

#[test]
fn test_item_names_are_case_sensitive() {
    let (_root, resolver) = sample_resolver();
    assert!(resolver.resolve("@items/weapons/swords:Iron-Longsword").is_none());
}

#[test]
fn test_domain_root_catalog() {
    // `abilities` has its catalog directly under the domain (empty path).
    let (_root, resolver) = sample_resolver();
    let ability = resolver
        .resolve("@abilities/cantrips:ember-flick")
        .expect("domain-root catalog should resolve");
    assert_eq!(ability["cost"]["mana"], 2);
}

// =============================================================================
// PROPERTY TRAVERSAL
// =============================================================================

#[test]
fn test_property_resolution_returns_leaf_not_item() {
    let (_root, resolver) = sample_resolver();

    let damage = resolver
        .resolve("@items/weapons/swords:iron-longsword.damage")
        .expect("property should resolve");
    assert_eq!(damage, json!(10));
}

#[test]
fn test_nested_property_resolution() {
    let (_root, resolver) = sample_resolver();

    let restore = resolver
        .resolve("@items/consumables/potions:healing-draught.effect.restore")
        .expect("nested property should resolve");
    assert_eq!(restore, json!(12));
}

#[test]
fn test_array_index_property() {
    let (_root, resolver) = sample_resolver();

    let tag = resolver
        .resolve("@items/weapons/swords:iron-longsword.tags.1")
        .expect("array index should resolve");
    assert_eq!(tag, json!("one-handed"));
}

#[test]
fn test_missing_intermediate_property_is_none() {
    let (_root, resolver) = sample_resolver();
    assert!(resolver
        .resolve("@items/weapons/swords:iron-longsword.enchantments.fire")
        .is_none());
}

// =============================================================================
// FAILURE MODES (ALWAYS SILENT)
// =============================================================================

#[test]
fn test_missing_item_is_none_regardless_of_optional_flag() {
    let (_root, resolver) = sample_resolver();
    assert!(resolver.resolve("@items/weapons/swords:obsidian-blade").is_none());
    assert!(resolver.resolve("@items/weapons/swords:obsidian-blade?").is_none());
}

#[test]
fn test_missing_catalog_and_category_are_none() {
    let (_root, resolver) = sample_resolver();
    assert!(resolver.resolve("@items/relics/artifacts:sunstone").is_none());
    assert!(resolver.resolve("@items/weapons/polearms:halberd").is_none());
}

#[test]
fn test_parse_failure_is_none() {
    let (_root, resolver) = sample_resolver();
    assert!(resolver.resolve("not a reference").is_none());
    assert!(resolver.resolve("").is_none());
}

// =============================================================================
// WILDCARD SAMPLING
// =============================================================================

#[test]
fn test_wildcard_returns_an_item_from_the_category() {
    let (_root, resolver) = sample_resolver();
    let item = resolver
        .resolve("@items/weapons/swords:*")
        .expect("wildcard should resolve");
    let name = item["name"].as_str().expect("picked item has a name");
    assert!(["iron-longsword", "steel-greatsword", "rusty-dagger"].contains(&name));
}

#[test]
fn test_wildcard_distribution_follows_rarity_weights() {
    let (_root, resolver) = sample_resolver();
    let mut rng = StdRng::seed_from_u64(7);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..1000 {
        let item = resolver
            .resolve_with_rng("@items/weapons/swords:*", &mut rng)
            .expect("wildcard should resolve");
        let name = item["name"].as_str().expect("picked item has a name");
        *counts.entry(name.to_string()).or_default() += 1;
    }

    // Weights: iron-longsword 100, steel-greatsword 50, rusty-dagger 1.
    let iron = counts.get("iron-longsword").copied().unwrap_or(0);
    let steel = counts.get("steel-greatsword").copied().unwrap_or(0);
    let rusty = counts.get("rusty-dagger").copied().unwrap_or(0);

    assert!(iron > steel, "weight 100 should beat weight 50 ({iron} vs {steel})");
    assert!(steel > rusty, "weight 50 should beat the floor weight ({steel} vs {rusty})");
    assert_eq!(iron + steel + rusty, 1000);
}

#[test]
fn test_wildcard_with_property_path() {
    let (_root, resolver) = sample_resolver();
    // Every sword has a damage field, so the traversal always succeeds.
    let damage = resolver
        .resolve("@items/weapons/swords:*.damage")
        .expect("wildcard property should resolve");
    assert!(damage.is_number());
}

#[test]
fn test_seeded_wildcard_is_reproducible() {
    let (_root, resolver) = sample_resolver();

    let mut first = StdRng::seed_from_u64(42);
    let mut second = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        assert_eq!(
            resolver.resolve_with_rng("@items/weapons/swords:*", &mut first),
            resolver.resolve_with_rng("@items/weapons/swords:*", &mut second)
        );
    }
}

// =============================================================================
// CACHE BEHAVIOR
// =============================================================================

#[test]
fn test_clear_cache_reload_is_idempotent() {
    let (_root, resolver) = sample_resolver();

    let before = resolver.resolve("@items/weapons/swords:iron-longsword");
    resolver.clear_cache();
    let after = resolver.resolve("@items/weapons/swords:iron-longsword");

    assert!(before.is_some());
    assert_eq!(before, after);
}

#[test]
fn test_resolutions_share_one_load_per_catalog() {
    let (_root, resolver) = sample_resolver();

    resolver.resolve("@items/weapons/swords:iron-longsword");
    resolver.resolve("@items/weapons/swords:rusty-dagger");
    resolver.resolve("@items/weapons/axes:woodcutter-axe");

    // Same (domain, path) key for all three lookups.
    assert_eq!(resolver.cache().len(), 1);
}

// =============================================================================
// PARSER SURFACE
// =============================================================================

#[test]
fn test_is_valid_reference_rejections() {
    assert!(!is_valid("items/weapons:sword")); // missing @
    assert!(!is_valid("@items:sword")); // missing category segment
    assert!(!is_valid("@items/weapons:")); // empty item name
    assert!(!is_valid("")); // empty string
    assert!(is_valid("@items/weapons:sword"));
}

#[test]
fn test_round_trip_canonical_form() {
    for text in [
        "@items/weapons/swords:iron-longsword",
        "@items/weapons/swords:*",
        "@quests/fetch:blade-for-the-smith.reward?",
    ] {
        let descriptor = ReferenceDescriptor::parse(text).expect("should parse");
        let canonical = descriptor.to_string();
        assert_eq!(
            ReferenceDescriptor::parse(&canonical).expect("canonical should parse"),
            descriptor
        );
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

#[test]
fn test_discovery_walks_domains_categories_references() {
    let (_root, resolver) = sample_resolver();

    let domains = resolver.available_domains();
    assert_eq!(domains, vec!["abilities", "items", "quests"]);

    let categories = resolver.available_categories("items", &["consumables".to_string()]);
    assert_eq!(categories, vec!["potions"]);

    let refs = resolver.available_references("items", &["consumables".to_string()], "potions");
    assert_eq!(
        refs,
        vec![
            "@items/consumables/potions:healing-draught",
            "@items/consumables/potions:swiftness-tonic",
        ]
    );
}
