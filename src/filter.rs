/// Subcategory filter matching.
///
/// A filter is a tagged (kind, value) pair evaluated against an asset's
/// filename. Filter lists have OR semantics: one matching filter qualifies
/// the asset. All comparisons are case-insensitive.
use crate::category::extension_from_filename;
use serde::{Deserialize, Serialize};

/// Marker prefix used by legacy keyword lists to denote a prefix filter.
const LEGACY_PREFIX_MARKER: &str = "prefix:";

/// The kind of comparison a filter performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Matches the file extension derived from the filename.
    Ext,
    /// Matches the start of the filename.
    Prefix,
    /// Matches a substring anywhere in the filename.
    Keyword,
}

/// A single subcategory filter.
///
/// `ext` values are stored without a leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryFilter {
    pub kind: FilterKind,
    pub value: String,
}

impl SubcategoryFilter {
    /// Creates an extension filter, stripping a leading dot from the value.
    pub fn ext(value: &str) -> Self {
        Self {
            kind: FilterKind::Ext,
            value: value.strip_prefix('.').unwrap_or(value).to_string(),
        }
    }

    /// Creates a filename-prefix filter.
    pub fn prefix(value: &str) -> Self {
        Self {
            kind: FilterKind::Prefix,
            value: value.to_string(),
        }
    }

    /// Creates a substring keyword filter.
    pub fn keyword(value: &str) -> Self {
        Self {
            kind: FilterKind::Keyword,
            value: value.to_string(),
        }
    }
}

/// Evaluates a single filter against a filename.
///
/// - `ext`: true iff the filename's derived extension equals the filter
///   value, case-insensitive.
/// - `prefix`: true iff the filename starts with the filter value,
///   case-insensitive.
/// - `keyword`: true iff the filename contains the filter value anywhere,
///   case-insensitive.
///
/// # Examples
///
/// ```
/// use projtidy::filter::{matches, SubcategoryFilter};
///
/// assert!(matches(&SubcategoryFilter::ext("MP4"), "clip.mp4"));
/// assert!(matches(&SubcategoryFilter::prefix("bg_"), "BG_city.png"));
/// assert!(matches(&SubcategoryFilter::keyword("vfx"), "shot_VFX_010.mov"));
/// ```
pub fn matches(filter: &SubcategoryFilter, filename: &str) -> bool {
    let value = filter.value.to_lowercase();
    match filter.kind {
        FilterKind::Ext => extension_from_filename(filename).to_lowercase() == value,
        FilterKind::Prefix => filename.to_lowercase().starts_with(&value),
        FilterKind::Keyword => filename.to_lowercase().contains(&value),
    }
}

/// Evaluates a filter list with OR semantics.
///
/// An empty list never matches via this path; whether an empty-filter
/// subcategory may act as a catch-all is decided by the resolver, not here.
pub fn any_match(filters: &[SubcategoryFilter], filename: &str) -> bool {
    filters.iter().any(|f| matches(f, filename))
}

/// Converts legacy `extensions`/`keywords` lists into the unified filter
/// representation.
///
/// Each extension becomes an `ext` filter and each keyword a `keyword`
/// filter, except keywords literally prefixed `prefix:` which become
/// `prefix` filters with the remainder as value. The caller keeps the legacy
/// lists untouched; this is a read-time view, never a mutation of stored
/// data.
pub fn filters_from_legacy(extensions: &[String], keywords: &[String]) -> Vec<SubcategoryFilter> {
    let mut filters = Vec::with_capacity(extensions.len() + keywords.len());
    for ext in extensions {
        filters.push(SubcategoryFilter::ext(ext));
    }
    for keyword in keywords {
        match keyword.strip_prefix(LEGACY_PREFIX_MARKER) {
            Some(prefix) => filters.push(SubcategoryFilter::prefix(prefix)),
            None => filters.push(SubcategoryFilter::keyword(keyword)),
        }
    }
    filters
}
