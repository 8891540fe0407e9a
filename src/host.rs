//! Host-application bridge boundary.
//!
//! The rule engine never talks to a project directly; a host implementation
//! supplies item descriptors, performs renames, and reports statistics. From
//! the core's perspective these are opaque request/response calls: a failed
//! or empty response is treated as "no items" (or an all-zero stats record),
//! never retried and never allowed to crash the caller.
//!
//! [`DirectoryHost`] is the built-in filesystem host the CLI uses: a flat
//! directory stands in for the project, subdirectories are folders, and
//! sequence membership is derived from frame-number grouping.

use crate::category::{CategoryType, Classifier, extension_from_filename};
use crate::sequence;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Opaque item identifier assigned by the host.
pub type ItemId = String;

/// A project item as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    pub id: ItemId,
    pub name: String,
    pub is_folder: bool,
    /// Extension as the host knows it; when absent the engine derives it
    /// from the name.
    pub extension: Option<String>,
    pub is_sequence_member: bool,
    /// Category asserted by the host's own item metadata (Comps, Solids).
    /// Never inferred from the extension.
    pub native_category: Option<CategoryType>,
}

impl ItemDescriptor {
    /// Creates a plain file descriptor with no host-asserted metadata.
    pub fn file(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_folder: false,
            extension: None,
            is_sequence_member: false,
            native_category: None,
        }
    }

    /// Creates a folder descriptor.
    pub fn folder(id: &str, name: &str) -> Self {
        Self {
            is_folder: true,
            ..Self::file(id, name)
        }
    }

    /// The extension to classify with: host-reported, else derived from the
    /// name.
    pub fn effective_extension(&self) -> &str {
        match &self.extension {
            Some(ext) => ext,
            None => extension_from_filename(&self.name),
        }
    }
}

/// A single rename instruction for the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameRequest {
    pub id: ItemId,
    pub new_name: String,
}

/// Host response to a batch rename.
#[derive(Debug, Clone, Default)]
pub struct RenameOutcome {
    pub success: bool,
    pub errors: Vec<String>,
}

/// Flat project count record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStats {
    pub total_items: usize,
    pub comps: usize,
    pub footage: usize,
    pub images: usize,
    pub audio: usize,
    pub sequences: usize,
    pub solids: usize,
    pub folders: usize,
    pub missing_footage: usize,
    pub unused_items: usize,
}

/// Errors surfaced by a host implementation.
#[derive(Debug, Clone)]
pub enum HostError {
    /// The host could not serve the request at all.
    Unavailable(String),
    /// The request ran but failed.
    OperationFailed(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Unavailable(msg) => write!(f, "Host unavailable: {}", msg),
            HostError::OperationFailed(msg) => write!(f, "Host operation failed: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

/// The host bridge interface.
pub trait ProjectHost {
    /// Enumerates the project items.
    fn list_items(&self) -> Result<Vec<ItemDescriptor>, HostError>;

    /// Applies a batch of renames.
    fn rename_items(&self, renames: &[RenameRequest]) -> Result<RenameOutcome, HostError>;

    /// Reports project statistics.
    fn stats(&self) -> Result<ProjectStats, HostError>;
}

/// Fetches items, containing any host failure as an empty list.
pub fn items_or_empty(host: &dyn ProjectHost) -> Vec<ItemDescriptor> {
    match host.list_items() {
        Ok(items) => items,
        Err(e) => {
            warn!("item query failed, treating as empty: {}", e);
            Vec::new()
        }
    }
}

/// Fetches statistics, containing any host failure as the all-zero record.
pub fn stats_or_zero(host: &dyn ProjectHost) -> ProjectStats {
    match host.stats() {
        Ok(stats) => stats,
        Err(e) => {
            warn!("stats query failed, substituting zeros: {}", e);
            ProjectStats::default()
        }
    }
}

/// Applies renames and refreshes the item list on success.
///
/// On partial or total failure the host's error messages are joined into one
/// diagnostic string.
pub fn apply_renames(
    host: &dyn ProjectHost,
    renames: &[RenameRequest],
) -> Result<Vec<ItemDescriptor>, String> {
    match host.rename_items(renames) {
        Ok(outcome) if outcome.success => Ok(items_or_empty(host)),
        Ok(outcome) => Err(outcome.errors.join("; ")),
        Err(e) => Err(e.to_string()),
    }
}

/// Filesystem-backed host: one directory stands in for the project.
///
/// Items are the direct children of the root; subdirectories are reported as
/// folders. Files without an extension are sniffed with `infer` as a
/// fallback. Sequence membership is computed by frame-number grouping over
/// still-image names when `detect_sequences` is on.
pub struct DirectoryHost {
    root: PathBuf,
    classifier: Classifier,
    detect_sequences: bool,
}

impl DirectoryHost {
    /// Creates a host over `root`.
    pub fn new(root: &Path, detect_sequences: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            classifier: Classifier::default(),
            detect_sequences,
        }
    }

    fn read_entries(&self) -> Result<Vec<(String, bool, PathBuf)>, HostError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            HostError::Unavailable(format!("cannot read {}: {}", self.root.display(), e))
        })?;

        let mut items = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            items.push((name, is_dir, entry.path()));
        }
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(items)
    }

    /// Derives the extension for a file, sniffing content when the name has
    /// none.
    fn detect_extension(&self, name: &str, path: &Path) -> Option<String> {
        let from_name = extension_from_filename(name);
        if !from_name.is_empty() {
            return Some(from_name.to_string());
        }
        let data = fs::read(path).ok()?;
        infer::get(&data).map(|kind| kind.extension().to_string())
    }
}

impl ProjectHost for DirectoryHost {
    fn list_items(&self) -> Result<Vec<ItemDescriptor>, HostError> {
        let entries = self.read_entries()?;

        let sequence_names = if self.detect_sequences {
            let image_names: Vec<&str> = entries
                .iter()
                .filter(|(name, is_dir, _)| {
                    !is_dir && self.classifier.is_image_extension(extension_from_filename(name))
                })
                .map(|(name, _, _)| name.as_str())
                .collect();
            sequence::sequence_members(image_names)
        } else {
            Default::default()
        };

        let mut items = Vec::new();
        for (name, is_dir, path) in entries {
            if is_dir {
                items.push(ItemDescriptor::folder(&name, &name));
                continue;
            }
            let extension = self.detect_extension(&name, &path);
            items.push(ItemDescriptor {
                id: name.clone(),
                is_sequence_member: sequence_names.contains(&name),
                extension,
                name,
                is_folder: false,
                native_category: None,
            });
        }
        Ok(items)
    }

    fn rename_items(&self, renames: &[RenameRequest]) -> Result<RenameOutcome, HostError> {
        let mut errors = Vec::new();
        for request in renames {
            let from = self.root.join(&request.id);
            let to = self.root.join(&request.new_name);
            if let Err(e) = fs::rename(&from, &to) {
                errors.push(format!("{} -> {}: {}", request.id, request.new_name, e));
            }
        }
        Ok(RenameOutcome {
            success: errors.is_empty(),
            errors,
        })
    }

    fn stats(&self) -> Result<ProjectStats, HostError> {
        let items = self.list_items()?;
        let mut stats = ProjectStats {
            total_items: items.len(),
            ..Default::default()
        };

        for item in &items {
            if item.is_folder {
                stats.folders += 1;
                continue;
            }
            if item.is_sequence_member {
                stats.sequences += 1;
            }
            match self
                .classifier
                .classify(item.effective_extension(), item.is_sequence_member)
            {
                Some(CategoryType::Footage) => stats.footage += 1,
                Some(CategoryType::Images) => stats.images += 1,
                Some(CategoryType::Audio) => stats.audio += 1,
                Some(CategoryType::Comps) => stats.comps += 1,
                Some(CategoryType::Solids) => stats.solids += 1,
                None => {}
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct FailingHost;

    impl ProjectHost for FailingHost {
        fn list_items(&self) -> Result<Vec<ItemDescriptor>, HostError> {
            Err(HostError::Unavailable("offline".to_string()))
        }

        fn rename_items(&self, _renames: &[RenameRequest]) -> Result<RenameOutcome, HostError> {
            Err(HostError::OperationFailed("offline".to_string()))
        }

        fn stats(&self) -> Result<ProjectStats, HostError> {
            Err(HostError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_items_or_empty_contains_failure() {
        assert!(items_or_empty(&FailingHost).is_empty());
    }

    #[test]
    fn test_stats_or_zero_contains_failure() {
        assert_eq!(stats_or_zero(&FailingHost), ProjectStats::default());
    }

    #[test]
    fn test_apply_renames_surfaces_joined_errors() {
        let result = apply_renames(
            &FailingHost,
            &[RenameRequest {
                id: "a".to_string(),
                new_name: "b".to_string(),
            }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_host_lists_files_and_folders() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("clip.mp4"), b"data").unwrap();
        fs::create_dir(temp.path().join("assets")).unwrap();

        let host = DirectoryHost::new(temp.path(), false);
        let items = host.list_items().unwrap();

        assert_eq!(items.len(), 2);
        let folder = items.iter().find(|i| i.name == "assets").unwrap();
        assert!(folder.is_folder);
        let file = items.iter().find(|i| i.name == "clip.mp4").unwrap();
        assert!(!file.is_folder);
        assert_eq!(file.extension.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_directory_host_flags_sequence_members() {
        let temp = TempDir::new().unwrap();
        for name in ["plate.0001.exr", "plate.0002.exr", "logo.png"] {
            fs::write(temp.path().join(name), b"data").unwrap();
        }

        let host = DirectoryHost::new(temp.path(), true);
        let items = host.list_items().unwrap();

        let frame = items.iter().find(|i| i.name == "plate.0001.exr").unwrap();
        assert!(frame.is_sequence_member);
        let logo = items.iter().find(|i| i.name == "logo.png").unwrap();
        assert!(!logo.is_sequence_member);
    }

    #[test]
    fn test_directory_host_sequence_detection_off() {
        let temp = TempDir::new().unwrap();
        for name in ["plate.0001.exr", "plate.0002.exr"] {
            fs::write(temp.path().join(name), b"data").unwrap();
        }

        let host = DirectoryHost::new(temp.path(), false);
        let items = host.list_items().unwrap();
        assert!(items.iter().all(|i| !i.is_sequence_member));
    }

    #[test]
    fn test_directory_host_rename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("old.mov"), b"data").unwrap();

        let host = DirectoryHost::new(temp.path(), false);
        let outcome = host
            .rename_items(&[RenameRequest {
                id: "old.mov".to_string(),
                new_name: "new.mov".to_string(),
            }])
            .unwrap();

        assert!(outcome.success);
        assert!(temp.path().join("new.mov").exists());
        assert!(!temp.path().join("old.mov").exists());
    }

    #[test]
    fn test_directory_host_rename_reports_errors() {
        let temp = TempDir::new().unwrap();
        let host = DirectoryHost::new(temp.path(), false);
        let outcome = host
            .rename_items(&[RenameRequest {
                id: "missing.mov".to_string(),
                new_name: "new.mov".to_string(),
            }])
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_directory_host_stats() {
        let temp = TempDir::new().unwrap();
        for name in ["clip.mp4", "track.wav", "still.png"] {
            fs::write(temp.path().join(name), b"data").unwrap();
        }
        fs::create_dir(temp.path().join("bin")).unwrap();

        let host = DirectoryHost::new(temp.path(), false);
        let stats = host.stats().unwrap();

        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.folders, 1);
        assert_eq!(stats.footage, 1);
        assert_eq!(stats.audio, 1);
        assert_eq!(stats.images, 1);
        assert_eq!(stats.comps, 0);
    }
}
