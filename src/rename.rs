//! Batch-rename preview.
//!
//! A pure transformation pipeline over selected asset names: literal
//! find/replace, then prefix, then suffix inserted ahead of the extension.
//! Applying the result is the host bridge's job; this module only computes
//! what the names would become.

/// String parameters for a rename batch. Empty fields are skipped.
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub find_text: String,
    pub replace_text: String,
    pub prefix: String,
    pub suffix: String,
}

/// One asset's preview row.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePreviewEntry {
    pub id: String,
    pub original_name: String,
    pub preview_name: String,
}

impl RenamePreviewEntry {
    /// True when the preview differs from the original.
    pub fn is_changed(&self) -> bool {
        self.original_name != self.preview_name
    }
}

/// The computed preview for a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePreview {
    pub entries: Vec<RenamePreviewEntry>,
    /// True iff at least one entry changed.
    pub has_changes: bool,
}

/// Computes the preview name for a single asset.
///
/// Steps, in order:
/// 1. If `find_text` is non-empty, replace every literal occurrence with
///    `replace_text` (not a regex).
/// 2. If `prefix` is non-empty, prepend it.
/// 3. If `suffix` is non-empty, insert it immediately before the last `.`
///    when that dot sits at an index greater than 0; otherwise append it.
///
/// # Examples
///
/// ```
/// use projtidy::rename::{RenameOptions, preview_name};
///
/// let options = RenameOptions {
///     prefix: "A_".to_string(),
///     suffix: "_v2".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(preview_name("clip.mp4", &options), "A_clip_v2.mp4");
/// assert_eq!(preview_name("noext", &options), "A_noext_v2");
/// ```
pub fn preview_name(name: &str, options: &RenameOptions) -> String {
    let mut result = if options.find_text.is_empty() {
        name.to_string()
    } else {
        name.replace(&options.find_text, &options.replace_text)
    };

    if !options.prefix.is_empty() {
        result = format!("{}{}", options.prefix, result);
    }

    if !options.suffix.is_empty() {
        match result.rfind('.') {
            Some(dot) if dot > 0 => result.insert_str(dot, &options.suffix),
            _ => result.push_str(&options.suffix),
        }
    }

    result
}

/// Computes the preview for a batch of `(id, name)` assets.
pub fn build_preview<'a, I>(items: I, options: &RenameOptions) -> RenamePreview
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let entries: Vec<RenamePreviewEntry> = items
        .into_iter()
        .map(|(id, name)| RenamePreviewEntry {
            id: id.to_string(),
            original_name: name.to_string(),
            preview_name: preview_name(name, options),
        })
        .collect();

    let has_changes = entries.iter().any(RenamePreviewEntry::is_changed);
    RenamePreview {
        entries,
        has_changes,
    }
}
