//! Test fixtures.
//!
//! Materializes a small content root on disk for unit and integration tests:
//! weighted weapons, nested consumables, a domain-root catalog, and a quest
//! catalog with embedded references. Weights are spread far enough apart
//! that distribution assertions hold over a thousand draws.

use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::Path;

use crate::catalog::CATALOG_FILE;

/// Write a well-formed sample content tree under `dir`.
///
/// Layout:
/// - `items/weapons/catalog.json` — `weapon_types` grouping, `swords` and
///   `axes` categories, rarity-weighted items.
/// - `items/consumables/catalog.json` — nested `effect` objects and `tags`
///   arrays for property-traversal tests.
/// - `abilities/catalog.json` — a catalog at domain depth (empty path).
/// - `quests/catalog.json` — embedded references, including an optional one
///   pointing at content that does not exist.
pub fn write_sample_root(dir: &Path) -> io::Result<()> {
    write_catalog(
        dir,
        "items/weapons",
        &json!({
            "metadata": { "version": 1, "author": "fixtures" },
            "weapon_types": {
                "swords": {
                    "items": [
                        {
                            "name": "iron-longsword",
                            "damage": 10,
                            "durability": 50,
                            "rarityWeight": 100,
                            "tags": ["melee", "one-handed"]
                        },
                        {
                            "name": "steel-greatsword",
                            "damage": 18,
                            "durability": 70,
                            "rarityWeight": 50,
                            "tags": ["melee", "two-handed"]
                        },
                        { "name": "rusty-dagger", "damage": 3, "durability": 12 }
                    ]
                },
                "axes": {
                    "items": [
                        { "name": "woodcutter-axe", "damage": 8, "rarityWeight": 10 }
                    ]
                }
            }
        }),
    )?;

    write_catalog(
        dir,
        "items/consumables",
        &json!({
            "metadata": { "version": 1 },
            "consumable_types": {
                "potions": {
                    "items": [
                        {
                            "name": "healing-draught",
                            "effect": { "restore": 12, "duration": 0 },
                            "tags": ["restorative"],
                            "rarityWeight": 4
                        },
                        {
                            "name": "swiftness-tonic",
                            "effect": { "haste": 2, "duration": 30 }
                        }
                    ]
                }
            }
        }),
    )?;

    write_catalog(
        dir,
        "abilities",
        &json!({
            "metadata": { "version": 1 },
            "components": { "shared-costs": { "mana": 1 } },
            "ability_types": {
                "cantrips": {
                    "items": [
                        { "name": "ember-flick", "cost": { "mana": 2 }, "rarityWeight": 3 },
                        { "name": "frost-snap", "cost": { "mana": 3 } }
                    ]
                }
            }
        }),
    )?;

    write_catalog(
        dir,
        "quests",
        &json!({
            "metadata": { "version": 1 },
            "quest_types": {
                "fetch": {
                    "items": [
                        {
                            "name": "blade-for-the-smith",
                            "reward": "@items/weapons/swords:iron-longsword",
                            "bonus_reward": "@items/relics/artifacts:sunstone?"
                        }
                    ]
                }
            }
        }),
    )
}

/// Add a quest file with exactly two broken references: one syntactically
/// malformed, one well-formed but unresolvable. A third, optional reference
/// is also unresolvable and must produce no diagnostic.
pub fn write_broken_quests(dir: &Path) -> io::Result<()> {
    write_catalog(
        dir,
        "quests/broken",
        &json!({
            "metadata": { "version": 1 },
            "quest_types": {
                "bounties": {
                    "items": [
                        {
                            "name": "hunt-the-wyrm",
                            "reward": "@items/weapons/swords",
                            "trophy": "@items/weapons/swords:obsidian-blade",
                            "rumor": "@items/weapons/swords:ghost-blade?"
                        }
                    ]
                }
            }
        }),
    )
}

fn write_catalog(root: &Path, relative: &str, tree: &Value) -> io::Result<()> {
    let dir = root.join(relative);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(CATALOG_FILE), serde_json::to_string_pretty(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sample_root_layout() {
        let root = TempDir::new().unwrap();
        write_sample_root(root.path()).unwrap();

        assert!(root.path().join("items/weapons/catalog.json").exists());
        assert!(root.path().join("items/consumables/catalog.json").exists());
        assert!(root.path().join("abilities/catalog.json").exists());
        assert!(root.path().join("quests/catalog.json").exists());
    }
}
