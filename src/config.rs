//! Versioned rule-set configuration.
//!
//! This module defines the persisted configuration schema: folders holding
//! ordered category rules, optional subcategories with filters, global
//! exception patterns, and flat settings. The document is stored as a single
//! JSON file with camelCase keys (the same document the host application's
//! editor surface reads and writes).
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "version": 5,
//!   "folders": [
//!     {
//!       "id": "source",
//!       "name": "Source",
//!       "order": 1,
//!       "isRenderFolder": false,
//!       "categories": [
//!         {
//!           "type": "Footage",
//!           "enabled": true,
//!           "order": 1,
//!           "detectSequences": true,
//!           "subcategories": [
//!             { "id": "plates", "name": "Plates", "filters": [
//!               { "kind": "keyword", "value": "plate" }
//!             ]}
//!           ]
//!         }
//!       ]
//!     }
//!   ],
//!   "exceptions": ["*_keep*"],
//!   "renderCompIds": [],
//!   "settings": { "deleteEmptyFolders": false, "language": "auto" }
//! }
//! ```
//!
//! Older documents (version < 5) are upgraded by the migration pipeline on
//! load; legacy subcategory `extensions`/`keywords` lists are honored at read
//! time and unified into `filters` only on explicit save.

use crate::category::CategoryType;
use crate::filter::{SubcategoryFilter, filters_from_legacy};
use crate::migrate::{self, CURRENT_VERSION};
use glob::{MatchOptions, Pattern};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading, validation, and
/// migration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid JSON syntax or structure.
    ConfigInvalid(String),
    /// Persisted version is newer than this build understands.
    UnsupportedVersion {
        /// The version tag found in the document.
        found: u64,
        /// The highest version this build can read.
        current: u32,
    },
    /// A category entry carries a string outside the closed category set.
    InvalidCategoryType(String),
    /// A subcategory label color is outside the 1..=16 palette.
    InvalidLabelColor {
        /// The subcategory carrying the bad value.
        subcategory: String,
        /// The rejected color index.
        value: u8,
    },
    /// Invalid exception glob pattern.
    InvalidExceptionPattern(String),
    /// IO error while reading or writing configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::UnsupportedVersion { found, current } => {
                write!(
                    f,
                    "Configuration version {} is newer than supported version {}",
                    found, current
                )
            }
            ConfigError::InvalidCategoryType(value) => {
                write!(f, "Invalid category type '{}'", value)
            }
            ConfigError::InvalidLabelColor { subcategory, value } => {
                write!(
                    f,
                    "Invalid label color {} on subcategory '{}': expected 1..=16",
                    value, subcategory
                )
            }
            ConfigError::InvalidExceptionPattern(pattern) => {
                write!(f, "Invalid exception pattern '{}'", pattern)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Interface language for user-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Follow the host environment.
    #[default]
    Auto,
    En,
    De,
    Ja,
}

/// Flat record of behavior toggles.
///
/// Every field defaults to "off"/"auto" when absent, so adding a key never
/// requires a schema version bump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub delete_empty_folders: bool,
    #[serde(default)]
    pub show_stats: bool,
    #[serde(default)]
    pub isolate_missing: bool,
    #[serde(default)]
    pub isolate_unused: bool,
    #[serde(default)]
    pub apply_label_color: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_create_subfolders() -> bool {
    true
}

/// A free-form subcategory inside a category rule.
///
/// Matching is driven by the `filters` list. Legacy records (pre-unification)
/// may instead carry raw `extensions`/`keywords` lists; those are preserved
/// verbatim on disk and exposed through [`SubcategoryConfig::effective_filters`]
/// until an explicit save unifies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub filters: Vec<SubcategoryFilter>,
    /// Legacy extension list; read-only compatibility field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Legacy keyword list; read-only compatibility field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default = "default_create_subfolders")]
    pub create_subfolders: bool,
    #[serde(default)]
    pub enable_label_color: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<u8>,
}

impl SubcategoryConfig {
    /// Creates a subcategory with the given filters and default flags.
    pub fn new(id: &str, name: &str, filters: Vec<SubcategoryFilter>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            filters,
            extensions: None,
            keywords: None,
            create_subfolders: true,
            enable_label_color: false,
            label_color: None,
        }
    }

    /// Returns the unified filter view: the `filters` list plus filters
    /// derived from any legacy `extensions`/`keywords` fields.
    ///
    /// This is a read-time view; the stored legacy fields are never mutated
    /// here.
    pub fn effective_filters(&self) -> Vec<SubcategoryFilter> {
        let mut filters = self.filters.clone();
        let legacy_exts = self.extensions.as_deref().unwrap_or(&[]);
        let legacy_keywords = self.keywords.as_deref().unwrap_or(&[]);
        filters.extend(filters_from_legacy(legacy_exts, legacy_keywords));
        filters
    }

    /// Returns true when the subcategory declares at least one filter,
    /// unified or legacy.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
            || self.extensions.as_ref().is_some_and(|e| !e.is_empty())
            || self.keywords.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Folds legacy `extensions`/`keywords` into the unified `filters` list
    /// and clears the legacy fields. Called on explicit save only.
    pub fn normalize_filters(&mut self) {
        self.filters = self.effective_filters();
        self.extensions = None;
        self.keywords = None;
    }
}

/// A category rule inside a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    /// The asset category this rule applies to.
    #[serde(rename = "type")]
    pub category: CategoryType,
    pub enabled: bool,
    pub order: u32,
    #[serde(default = "default_create_subfolders")]
    pub create_subfolders: bool,
    /// When true, still-image sequences are grouped and treated as footage.
    #[serde(default)]
    pub detect_sequences: bool,
    /// Explicit filters. A non-empty list opts this rule out of the default
    /// one-category-one-folder assignment.
    #[serde(default)]
    pub filters: Vec<SubcategoryFilter>,
    /// Keyword shorthand, equivalent to keyword filters (`prefix:` marker
    /// honored).
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryConfig>,
}

impl CategoryConfig {
    /// Creates an enabled category rule with no filters or subcategories.
    pub fn new(category: CategoryType, order: u32) -> Self {
        Self {
            category,
            enabled: true,
            order,
            create_subfolders: true,
            detect_sequences: false,
            filters: Vec::new(),
            keywords: Vec::new(),
            subcategories: Vec::new(),
        }
    }

    /// Returns true when the rule declares explicit filters or keywords and
    /// therefore opts out of the exclusive default assignment.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty() || !self.keywords.is_empty()
    }

    /// Returns the unified filter view over `filters` and `keywords`.
    pub fn effective_filters(&self) -> Vec<SubcategoryFilter> {
        let mut filters = self.filters.clone();
        filters.extend(filters_from_legacy(&[], &self.keywords));
        filters
    }
}

/// A target folder in the project hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderConfig {
    pub id: String,
    pub name: String,
    pub order: u32,
    /// Render folders claim items by name keywords and explicit comp ids
    /// rather than by category.
    #[serde(default)]
    pub is_render_folder: bool,
    #[serde(default)]
    pub render_keywords: Vec<String>,
    /// When true, the folder's contents are left untouched by organization.
    #[serde(default)]
    pub skip_organization: bool,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl FolderConfig {
    /// Creates an empty, non-render folder.
    pub fn new(id: &str, name: &str, order: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            order,
            is_render_folder: false,
            render_keywords: Vec::new(),
            skip_organization: false,
            categories: Vec::new(),
        }
    }

    /// Returns true when the item name contains any of this folder's render
    /// keywords, case-insensitive.
    pub fn matches_render_keywords(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.render_keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lower.contains(&keyword.to_lowercase()))
    }
}

/// The complete versioned rule set.
///
/// After loading, `version` always equals [`CURRENT_VERSION`]; older
/// documents pass through the migration pipeline first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedConfig {
    pub version: u32,
    #[serde(default)]
    pub folders: Vec<FolderConfig>,
    /// Case-insensitive glob patterns; matching item names are never
    /// organized.
    #[serde(default)]
    pub exceptions: Vec<String>,
    /// Item ids pinned to the render folder regardless of name.
    #[serde(default)]
    pub render_comp_ids: Vec<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl VersionedConfig {
    /// The compiled-in first-run rule set.
    ///
    /// Three folders: "Render" (render folder, organization skipped),
    /// "Source" (Comps/Footage/Images/Audio, sequence detection on Footage
    /// and Images), "System" (Solids).
    pub fn default_seed() -> Self {
        let mut render = FolderConfig::new("render", "Render", 0);
        render.is_render_folder = true;
        render.render_keywords = vec!["render".to_string()];
        render.skip_organization = true;

        let mut source = FolderConfig::new("source", "Source", 1);
        source.categories = vec![
            CategoryConfig::new(CategoryType::Comps, 0),
            {
                let mut footage = CategoryConfig::new(CategoryType::Footage, 1);
                footage.detect_sequences = true;
                footage
            },
            {
                let mut images = CategoryConfig::new(CategoryType::Images, 2);
                images.detect_sequences = true;
                images
            },
            CategoryConfig::new(CategoryType::Audio, 3),
        ];

        let mut system = FolderConfig::new("system", "System", 99);
        system.categories = vec![CategoryConfig::new(CategoryType::Solids, 0)];

        Self {
            version: CURRENT_VERSION,
            folders: vec![render, source, system],
            exceptions: Vec::new(),
            render_comp_ids: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Load configuration with fallback to the compiled-in default.
    ///
    /// Lookup order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `projtidy.json` in the current directory
    /// 3. Look for `~/.config/projtidy/config.json` in the home directory
    /// 4. Fall back to the default seed
    ///
    /// Any loaded document is run through the migration pipeline before use.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file cannot be read, or if
    /// a found document is malformed or newer than this build supports.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from("projtidy.json");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("projtidy")
                .join("config.json");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("no configuration file found, using default seed");
        Ok(Self::default_seed())
    }

    /// Load configuration from a specific file, migrating as needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist,
    /// `ConfigError::ConfigInvalid` if parsing fails, and the migration
    /// errors for version/category problems.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;

        migrate::migrate(value)
    }

    /// Writes the configuration to disk at the current schema version.
    ///
    /// This is the explicit save path: legacy subcategory
    /// `extensions`/`keywords` lists are unified into `filters` in the
    /// written document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::IoError` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let mut normalized = self.clone();
        normalized.normalize_legacy_filters();
        normalized.version = CURRENT_VERSION;

        let json = serde_json::to_string_pretty(&normalized)
            .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Folds every legacy subcategory field into the unified `filters`
    /// representation. Invoked by [`VersionedConfig::save`].
    pub fn normalize_legacy_filters(&mut self) {
        for folder in &mut self.folders {
            for category in &mut folder.categories {
                for subcategory in &mut category.subcategories {
                    subcategory.normalize_filters();
                }
            }
        }
    }

    /// Returns the folders sorted ascending by `order`, stable for ties.
    /// The stored sequence is left untouched.
    pub fn sorted_folders(&self) -> Vec<&FolderConfig> {
        let mut folders: Vec<&FolderConfig> = self.folders.iter().collect();
        folders.sort_by_key(|f| f.order);
        folders
    }

    /// Returns true when any enabled category requests sequence detection.
    pub fn detect_sequences_enabled(&self) -> bool {
        self.folders.iter().any(|folder| {
            folder
                .categories
                .iter()
                .any(|c| c.enabled && c.detect_sequences)
        })
    }

    /// Validates structural invariants: label colors must be in 1..=16.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for folder in &self.folders {
            for category in &folder.categories {
                for subcategory in &category.subcategories {
                    if let Some(color) = subcategory.label_color
                        && !(1..=16).contains(&color)
                    {
                        return Err(ConfigError::InvalidLabelColor {
                            subcategory: subcategory.name.clone(),
                            value: color,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Compiles the global exception patterns for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob pattern is invalid.
    pub fn compile_exceptions(&self) -> Result<CompiledExceptions, ConfigError> {
        CompiledExceptions::new(&self.exceptions)
    }
}

impl Default for VersionedConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

/// Pre-compiled exception patterns for efficient name matching.
pub struct CompiledExceptions {
    patterns: Vec<Pattern>,
}

impl CompiledExceptions {
    /// Compiles and validates the raw patterns.
    fn new(raw: &[String]) -> Result<Self, ConfigError> {
        let patterns = raw
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .map_err(|_| ConfigError::InvalidExceptionPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true when the item name matches any exception pattern,
    /// case-insensitive.
    pub fn is_exception(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(name, options))
    }
}

/// Optional per-directory preferences file (`.projtidyrc.toml`).
///
/// Points the CLI at a rule-set document and overrides the output language.
/// This file configures the tool invocation, not the rule set itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RcFile {
    pub config_path: Option<PathBuf>,
    pub language: Option<Language>,
}

impl RcFile {
    /// Loads `.projtidyrc.toml` from the given directory, if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigInvalid` on TOML parse failure.
    pub fn load(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(".projtidyrc.toml");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let rc = toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        Ok(Some(rc))
    }
}
