//! projtidy - organize creative-project assets by versioned rules
//!
//! This library decides, for any project asset, which folder and subfolder
//! it belongs to under a user-configurable, versioned rule set: category
//! inference from file metadata, filter/keyword matching with conflict
//! diagnostics, folder/category ordering, legacy configuration migration,
//! and batch-rename previews. A filesystem host implementation lets the CLI
//! apply the rules to real directories.

pub mod category;
pub mod cli;
pub mod config;
pub mod filter;
pub mod history;
pub mod host;
pub mod migrate;
pub mod organizer;
pub mod output;
pub mod rename;
pub mod resolver;
pub mod sequence;

pub use category::{CategoryType, Classifier, is_valid_category_type};
pub use config::{
    CategoryConfig, ConfigError, FolderConfig, Settings, SubcategoryConfig, VersionedConfig,
};
pub use filter::{FilterKind, SubcategoryFilter};
pub use host::{DirectoryHost, ItemDescriptor, ProjectHost, ProjectStats};
pub use migrate::CURRENT_VERSION;
pub use rename::{RenameOptions, RenamePreview};
pub use resolver::{
    Assignment, ConfigWarning, assigned_categories, find_duplicate_keywords,
    recalculate_category_orders, resolve_target, sort_categories,
};

pub use cli::{Cli, run};
