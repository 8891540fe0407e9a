//! Configuration schema migration.
//!
//! Persisted rule sets carry an integer `version` tag. This module upgrades
//! any older document to the current schema, one deterministic step per
//! version, before typed deserialization. Steps operate on the raw JSON
//! value: they fill newly introduced fields with safe defaults and never
//! touch user-authored content (folder names, filters, keywords,
//! exceptions).
//!
//! A document already at the current version passes through unchanged; a
//! document tagged newer than this build understands is rejected rather than
//! downgraded.

use crate::category::is_valid_category_type;
use crate::config::{ConfigError, VersionedConfig};
use log::warn;
use serde_json::{Value, json};

/// The schema version this build reads and writes.
pub const CURRENT_VERSION: u32 = 5;

/// Upgrades a raw configuration document to the current schema and
/// deserializes it.
///
/// A missing `version` field is treated as version 1 (the tag was introduced
/// in version 2). Category entries whose `type` string falls outside the
/// closed category set are dropped with a warning instead of failing the
/// whole document.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedVersion` when the document is newer than
/// [`CURRENT_VERSION`], and `ConfigError::ConfigInvalid` when the upgraded
/// document still fails to deserialize.
pub fn migrate(value: Value) -> Result<VersionedConfig, ConfigError> {
    if !value.is_object() {
        return Err(ConfigError::ConfigInvalid(
            "expected a JSON object".to_string(),
        ));
    }

    // A zero or missing tag predates versioning and is read as version 1.
    let found = value
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .max(1);
    if found > u64::from(CURRENT_VERSION) {
        return Err(ConfigError::UnsupportedVersion {
            found,
            current: CURRENT_VERSION,
        });
    }

    let mut value = value;
    let mut version = found as u32;
    while version < CURRENT_VERSION {
        value = match version {
            1 => v1_to_v2(value),
            2 => v2_to_v3(value),
            3 => v3_to_v4(value),
            4 => v4_to_v5(value),
            // found <= CURRENT_VERSION is checked above
            _ => unreachable!("no migration step from version {}", version),
        };
        version += 1;
        value["version"] = json!(version);
    }

    drop_invalid_categories(&mut value);

    serde_json::from_value(value).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
}

/// v1 → v2: folder `id`/`order` fields and the global `exceptions` list.
///
/// Missing folder ids are derived from the lower-cased folder name; orders
/// are assigned by array position.
fn v1_to_v2(mut value: Value) -> Value {
    if let Some(folders) = value.get_mut("folders").and_then(Value::as_array_mut) {
        for (index, folder) in folders.iter_mut().enumerate() {
            if folder.get("id").and_then(Value::as_str).is_none() {
                let id = folder
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|name| name.to_lowercase().replace(' ', "-"))
                    .unwrap_or_else(|| format!("folder-{}", index));
                folder["id"] = json!(id);
            }
            if folder.get("order").and_then(Value::as_u64).is_none() {
                folder["order"] = json!(index as u64);
            }
        }
    }
    ensure_field(&mut value, "exceptions", json!([]));
    value
}

/// v2 → v3: render-folder fields and the pinned render-comp id list.
fn v2_to_v3(mut value: Value) -> Value {
    if let Some(folders) = value.get_mut("folders").and_then(Value::as_array_mut) {
        for folder in folders.iter_mut() {
            ensure_field(folder, "isRenderFolder", json!(false));
            ensure_field(folder, "renderKeywords", json!([]));
            ensure_field(folder, "skipOrganization", json!(false));
        }
    }
    ensure_field(&mut value, "renderCompIds", json!([]));
    value
}

/// v3 → v4: the flat `settings` record and per-category `detectSequences`.
fn v3_to_v4(mut value: Value) -> Value {
    ensure_field(&mut value, "settings", json!({}));
    for_each_category(&mut value, |category| {
        ensure_field(category, "detectSequences", json!(false));
    });
    value
}

/// v4 → v5: the unified subcategory `filters` field and label colors.
///
/// Legacy `extensions`/`keywords` lists are deliberately left in place; they
/// remain readable and are unified only on explicit save.
fn v4_to_v5(mut value: Value) -> Value {
    for_each_category(&mut value, |category| {
        ensure_field(category, "filters", json!([]));
        if let Some(subcategories) = category.get_mut("subcategories").and_then(Value::as_array_mut)
        {
            for subcategory in subcategories.iter_mut() {
                ensure_field(subcategory, "filters", json!([]));
                ensure_field(subcategory, "enableLabelColor", json!(false));
            }
        }
    });
    value
}

/// Sets `field` to `default` when absent or null.
fn ensure_field(value: &mut Value, field: &str, default: Value) {
    let missing = match value.get(field) {
        None | Some(Value::Null) => true,
        Some(_) => false,
    };
    if missing {
        value[field] = default;
    }
}

/// Applies `f` to every category object in every folder.
fn for_each_category<F: FnMut(&mut Value)>(value: &mut Value, mut f: F) {
    if let Some(folders) = value.get_mut("folders").and_then(Value::as_array_mut) {
        for folder in folders.iter_mut() {
            if let Some(categories) = folder.get_mut("categories").and_then(Value::as_array_mut) {
                for category in categories.iter_mut() {
                    f(category);
                }
            }
        }
    }
}

/// Removes category entries whose `type` is not a valid category string.
///
/// Untrusted persisted data must never propagate an undefined category
/// through folder assignment; the offending entry is ignored, not the whole
/// document.
fn drop_invalid_categories(value: &mut Value) {
    if let Some(folders) = value.get_mut("folders").and_then(Value::as_array_mut) {
        for folder in folders.iter_mut() {
            if let Some(categories) = folder.get_mut("categories").and_then(Value::as_array_mut) {
                categories.retain(|category| {
                    let valid = category
                        .get("type")
                        .and_then(Value::as_str)
                        .is_some_and(is_valid_category_type);
                    if !valid {
                        warn!(
                            "ignoring category with invalid type: {}",
                            category.get("type").unwrap_or(&Value::Null)
                        );
                    }
                    valid
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryType;

    fn v1_document() -> Value {
        json!({
            "folders": [
                {
                    "name": "Footage Bin",
                    "categories": [
                        { "type": "Footage", "enabled": true, "order": 0,
                          "keywords": ["plate"] }
                    ]
                },
                {
                    "name": "Sounds",
                    "categories": [
                        { "type": "Audio", "enabled": true, "order": 0 }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_migrate_v1_document_to_current() {
        let config = migrate(v1_document()).unwrap();

        assert_eq!(config.version, CURRENT_VERSION);
        assert_eq!(config.folders.len(), 2);
        assert_eq!(config.folders[0].id, "footage-bin");
        assert_eq!(config.folders[0].order, 0);
        assert_eq!(config.folders[1].order, 1);
        assert!(config.exceptions.is_empty());
        assert!(config.render_comp_ids.is_empty());
        assert!(!config.folders[0].is_render_folder);
        // User-authored content preserved.
        assert_eq!(config.folders[0].name, "Footage Bin");
        assert_eq!(config.folders[0].categories[0].keywords, vec!["plate"]);
    }

    #[test]
    fn test_migrate_is_idempotent_for_current_version() {
        let seed = VersionedConfig::default_seed();
        let value = serde_json::to_value(&seed).unwrap();
        let migrated = migrate(value).unwrap();
        assert_eq!(seed, migrated);
    }

    #[test]
    fn test_migrate_twice_equals_once() {
        let once = migrate(v1_document()).unwrap();
        let twice = migrate(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_migrate_rejects_newer_version() {
        let value = json!({ "version": 6, "folders": [] });
        assert!(matches!(
            migrate(value),
            Err(ConfigError::UnsupportedVersion { found: 6, .. })
        ));
    }

    #[test]
    fn test_missing_version_treated_as_v1() {
        let value = json!({ "folders": [] });
        let config = migrate(value).unwrap();
        assert_eq!(config.version, CURRENT_VERSION);
    }

    #[test]
    fn test_invalid_category_type_dropped_not_fatal() {
        let value = json!({
            "version": 5,
            "folders": [
                {
                    "id": "source", "name": "Source", "order": 0,
                    "categories": [
                        { "type": "Footage", "enabled": true, "order": 0 },
                        { "type": "footage", "enabled": true, "order": 1 },
                        { "type": "Banana", "enabled": true, "order": 2 }
                    ]
                }
            ]
        });

        let config = migrate(value).unwrap();
        assert_eq!(config.folders[0].categories.len(), 1);
        assert_eq!(config.folders[0].categories[0].category, CategoryType::Footage);
    }

    #[test]
    fn test_v4_to_v5_preserves_legacy_subcategory_fields() {
        let value = json!({
            "version": 4,
            "folders": [
                {
                    "id": "source", "name": "Source", "order": 0,
                    "isRenderFolder": false,
                    "categories": [
                        {
                            "type": "Images", "enabled": true, "order": 0,
                            "detectSequences": false,
                            "subcategories": [
                                {
                                    "id": "mattes", "name": "Mattes",
                                    "extensions": ["png"],
                                    "keywords": ["matte", "prefix:bg_"]
                                }
                            ]
                        }
                    ]
                }
            ],
            "exceptions": [],
            "renderCompIds": [],
            "settings": {}
        });

        let config = migrate(value).unwrap();
        let subcategory = &config.folders[0].categories[0].subcategories[0];
        assert!(subcategory.filters.is_empty());
        assert_eq!(subcategory.extensions, Some(vec!["png".to_string()]));
        assert_eq!(
            subcategory.keywords,
            Some(vec!["matte".to_string(), "prefix:bg_".to_string()])
        );
        // The unified view still sees all three filters.
        assert_eq!(subcategory.effective_filters().len(), 3);
    }

    #[test]
    fn test_migration_preserves_exceptions() {
        let value = json!({
            "version": 2,
            "folders": [],
            "exceptions": ["*_keep*"]
        });
        let config = migrate(value).unwrap();
        assert_eq!(config.exceptions, vec!["*_keep*"]);
    }
}
