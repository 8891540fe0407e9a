//! Rule resolution.
//!
//! Composes the classifier and filter matcher over a configuration snapshot
//! to decide, per asset, which folder and subfolder it belongs to. Also owns
//! the ordering helpers and the on-demand configuration diagnostics
//! (duplicate keywords, ineligible catch-alls). Everything here is pure:
//! inputs are never mutated, so one configuration snapshot can serve any
//! number of concurrent resolution passes.

use crate::category::{CategoryType, Classifier};
use crate::config::{
    CategoryConfig, CompiledExceptions, FolderConfig, SubcategoryConfig, VersionedConfig,
};
use crate::filter::{FilterKind, any_match};
use crate::host::ItemDescriptor;
use std::collections::{BTreeSet, HashMap};

/// The resolved destination for a single asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub folder_id: String,
    pub folder_name: String,
    /// The category that won the assignment; `None` for render-folder
    /// claims, which bypass categorization.
    pub category: Option<CategoryType>,
    /// The matching subcategory name, if any.
    pub subcategory: Option<String>,
    /// Directory path relative to the organization root:
    /// folder, then category and subcategory segments where their
    /// `createSubfolders` flags ask for them.
    pub path_segments: Vec<String>,
}

impl Assignment {
    /// The relative target path as a display string.
    pub fn target_path(&self) -> String {
        self.path_segments.join("/")
    }
}

/// A non-fatal configuration problem surfaced to the user.
///
/// Warnings are recomputed from the configuration snapshot on demand and
/// never persisted, so they cannot go stale.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// The same keyword is asserted by two or more category types.
    DuplicateKeyword {
        keyword: String,
        categories: Vec<CategoryType>,
    },
    /// An empty-filter subcategory competes with another unfiltered sibling
    /// and therefore cannot act as catch-all.
    FilterRequired {
        folder: String,
        category: CategoryType,
        subcategory: String,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::DuplicateKeyword {
                keyword,
                categories,
            } => {
                let names: Vec<&str> = categories.iter().map(|c| c.name()).collect();
                write!(
                    f,
                    "Keyword '{}' is claimed by multiple categories: {}",
                    keyword,
                    names.join(", ")
                )
            }
            ConfigWarning::FilterRequired {
                folder,
                category,
                subcategory,
            } => {
                write!(
                    f,
                    "Subcategory '{}' ({} in '{}') needs a filter: another unfiltered sibling already acts as catch-all",
                    subcategory, category, folder
                )
            }
        }
    }
}

/// Maps each category type to the folder that owns it by default.
///
/// Folders are iterated in their stored order, then categories in their
/// stored order. A category participates iff it is enabled and carries no
/// filters or keywords — filtered categories opt out of exclusivity so the
/// same type can appear, filtered, in several folders. On duplicate
/// unfiltered types the last one seen wins; earlier folders are shadowed.
/// That precedence is documented behavior, not an error.
pub fn assigned_categories(folders: &[FolderConfig]) -> HashMap<CategoryType, String> {
    let mut mapping = HashMap::new();
    for folder in folders {
        for category in &folder.categories {
            if category.enabled && !category.has_filters() {
                mapping.insert(category.category, folder.id.clone());
            }
        }
    }
    mapping
}

/// Reports keywords asserted by two or more distinct category types.
///
/// The registry is case-insensitive (keywords are lower-cased on entry) and
/// covers both the `keywords` shorthand and keyword-kind filters. Every
/// colliding keyword is reported against each of its claiming types, so the
/// result is symmetric. An absent input yields an empty map.
pub fn find_duplicate_keywords(
    categories: Option<&[CategoryConfig]>,
) -> HashMap<CategoryType, Vec<String>> {
    let Some(categories) = categories else {
        return HashMap::new();
    };

    let mut registry: HashMap<String, BTreeSet<&'static str>> = HashMap::new();
    let mut types_by_name: HashMap<&'static str, CategoryType> = HashMap::new();
    for category in categories {
        let type_name = category.category.name();
        types_by_name.insert(type_name, category.category);
        for keyword in &category.keywords {
            registry
                .entry(keyword.to_lowercase())
                .or_default()
                .insert(type_name);
        }
        for filter in &category.filters {
            if filter.kind == FilterKind::Keyword {
                registry
                    .entry(filter.value.to_lowercase())
                    .or_default()
                    .insert(type_name);
            }
        }
    }

    let mut duplicates: HashMap<CategoryType, Vec<String>> = HashMap::new();
    for (keyword, claimants) in registry {
        if claimants.len() >= 2 {
            for type_name in claimants {
                duplicates
                    .entry(types_by_name[type_name])
                    .or_default()
                    .push(keyword.clone());
            }
        }
    }
    for keywords in duplicates.values_mut() {
        keywords.sort();
        keywords.dedup();
    }
    duplicates
}

/// Returns a copy of the categories ordered ascending by `order`.
///
/// The sort is stable for ties and the input sequence is left untouched.
pub fn sort_categories(categories: &[CategoryConfig]) -> Vec<CategoryConfig> {
    let mut sorted = categories.to_vec();
    sorted.sort_by_key(|c| c.order);
    sorted
}

/// Returns a copy with `order` reassigned 0..n-1 in the current array
/// sequence.
///
/// No re-sorting happens first; this renumbers after the caller (typically a
/// drag-reorder) has already arranged the array.
pub fn recalculate_category_orders(categories: &[CategoryConfig]) -> Vec<CategoryConfig> {
    categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let mut renumbered = category.clone();
            renumbered.order = index as u32;
            renumbered
        })
        .collect()
}

/// Decides the destination for one asset, or `None` when the asset stays
/// put.
///
/// Decision order:
/// 1. Folders never get an assignment; neither do names matching a global
///    exception pattern.
/// 2. Render folders claim items first, by pinned render-comp id or render
///    keyword; the claim bypasses categorization.
/// 3. The category is the host-asserted one (Comps, Solids) or the
///    classified one; sequence context applies only when some enabled
///    category requests sequence detection.
/// 4. Filtered category rules are consulted folder-by-folder (ascending
///    `order`, skip-organization folders excluded), categories in their
///    `order` within each folder; the first rule whose type matches and
///    whose filters match the name wins.
/// 5. Otherwise the default exclusive assignment decides.
/// 6. Within the winning category, the first matching subcategory — then a
///    sole unfiltered catch-all — picks the subfolder.
pub fn resolve_target(
    config: &VersionedConfig,
    classifier: &Classifier,
    exceptions: &CompiledExceptions,
    item: &ItemDescriptor,
) -> Option<Assignment> {
    if item.is_folder || exceptions.is_exception(&item.name) {
        return None;
    }

    let folders = config.sorted_folders();

    // Render claims bypass categorization entirely.
    for &folder in &folders {
        if folder.is_render_folder
            && (config.render_comp_ids.contains(&item.id)
                || folder.matches_render_keywords(&item.name))
        {
            return Some(Assignment {
                folder_id: folder.id.clone(),
                folder_name: folder.name.clone(),
                category: None,
                subcategory: None,
                path_segments: vec![folder.name.clone()],
            });
        }
    }

    let is_sequence = item.is_sequence_member && config.detect_sequences_enabled();
    let category_type = item
        .native_category
        .or_else(|| classifier.classify(item.effective_extension(), is_sequence))?;

    // Filtered rules take precedence over the default assignment.
    for &folder in &folders {
        if folder.skip_organization {
            continue;
        }
        for category in sort_categories(&folder.categories) {
            if category.enabled
                && category.category == category_type
                && category.has_filters()
                && any_match(&category.effective_filters(), &item.name)
            {
                return Some(build_assignment(folder, &category, &item.name));
            }
        }
    }

    // Default exclusive assignment: last unfiltered owner of the type wins.
    let mut winner: Option<(&FolderConfig, &CategoryConfig)> = None;
    for &folder in &folders {
        if folder.skip_organization {
            continue;
        }
        for category in &folder.categories {
            if category.enabled && !category.has_filters() && category.category == category_type {
                winner = Some((folder, category));
            }
        }
    }
    winner.map(|(folder, category)| build_assignment(folder, category, &item.name))
}

fn build_assignment(folder: &FolderConfig, category: &CategoryConfig, name: &str) -> Assignment {
    let mut segments = vec![folder.name.clone()];
    if category.create_subfolders {
        segments.push(category.category.name().to_string());
    }

    let subcategory = select_subcategory(category, name);
    if let Some(sub) = subcategory
        && sub.create_subfolders
    {
        segments.push(sub.name.clone());
    }

    Assignment {
        folder_id: folder.id.clone(),
        folder_name: folder.name.clone(),
        category: Some(category.category),
        subcategory: subcategory.map(|s| s.name.clone()),
        path_segments: segments,
    }
}

/// Picks the subcategory for an asset within a category rule.
///
/// Subcategories are consulted in stored order; the first one whose filters
/// match wins. An empty-filter subcategory catches the remainder only when
/// it is the sole unfiltered sibling; competing unfiltered siblings are
/// reported by [`diagnostics`] instead of matching silently.
fn select_subcategory<'a>(
    category: &'a CategoryConfig,
    name: &str,
) -> Option<&'a SubcategoryConfig> {
    for subcategory in &category.subcategories {
        if subcategory.has_filters() && any_match(&subcategory.effective_filters(), name) {
            return Some(subcategory);
        }
    }

    let unfiltered: Vec<&SubcategoryConfig> = category
        .subcategories
        .iter()
        .filter(|s| !s.has_filters())
        .collect();
    match unfiltered.as_slice() {
        [catch_all] => Some(catch_all),
        _ => None,
    }
}

/// Computes all configuration warnings for a snapshot.
pub fn diagnostics(config: &VersionedConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    // Duplicate keywords across every category in the rule set.
    let all_categories: Vec<CategoryConfig> = config
        .folders
        .iter()
        .flat_map(|f| f.categories.iter().cloned())
        .collect();
    let duplicates = find_duplicate_keywords(Some(&all_categories));
    let mut by_keyword: HashMap<String, BTreeSet<&'static str>> = HashMap::new();
    for (category, keywords) in &duplicates {
        for keyword in keywords {
            by_keyword
                .entry(keyword.clone())
                .or_default()
                .insert(category.name());
        }
    }
    let mut keywords: Vec<&String> = by_keyword.keys().collect();
    keywords.sort();
    for keyword in keywords {
        let categories = by_keyword[keyword]
            .iter()
            .filter_map(|name| CategoryType::ALL.iter().find(|c| c.name() == *name))
            .copied()
            .collect();
        warnings.push(ConfigWarning::DuplicateKeyword {
            keyword: keyword.clone(),
            categories,
        });
    }

    // Empty-filter subcategories that cannot act as catch-all.
    for folder in &config.folders {
        for category in &folder.categories {
            let unfiltered: Vec<&SubcategoryConfig> = category
                .subcategories
                .iter()
                .filter(|s| !s.has_filters())
                .collect();
            if unfiltered.len() >= 2 {
                for subcategory in unfiltered {
                    warnings.push(ConfigWarning::FilterRequired {
                        folder: folder.name.clone(),
                        category: category.category,
                        subcategory: subcategory.name.clone(),
                    });
                }
            }
        }
    }

    warnings
}
