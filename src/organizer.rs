/// Executes resolved assignments against a project directory.
///
/// The resolver decides where an asset belongs; this module performs the
/// move, creating the nested folder/category/subcategory directories on
/// demand, and records each move for the history log.
use crate::resolver::Assignment;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while executing moves.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a target directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file into its target directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The organization root is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the history file.
    HistoryWriteFailed { source: std::io::Error },
    /// Failed to read the history file.
    HistoryReadFailed { source: std::io::Error },
    /// History file has invalid format.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write history file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read history file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A completed move, recorded for undo.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MoveRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    /// Relative target the assignment resolved to, e.g. "Source/Footage".
    pub target: String,
}

/// Moves a file into its assignment's target directory under `base_path`.
///
/// Intermediate directories (folder, category, subcategory) are created as
/// needed. Returns the move record for history logging.
///
/// # Errors
///
/// Returns an `OrganizeError` when the base path is missing, a directory
/// cannot be created, or the move itself fails.
pub fn move_into_target(
    base_path: &Path,
    file_path: &Path,
    assignment: &Assignment,
) -> OrganizeResult<MoveRecord> {
    if !base_path.exists() {
        return Err(OrganizeError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "base path does not exist"),
        });
    }

    let mut target_dir = base_path.to_path_buf();
    for segment in &assignment.path_segments {
        target_dir.push(segment);
    }

    fs::create_dir_all(&target_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
        path: target_dir.clone(),
        source: e,
    })?;

    let file_name = file_path
        .file_name()
        .ok_or_else(|| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: target_dir.clone(),
            source_error: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file has no name component",
            ),
        })?;

    let destination = target_dir.join(file_name);
    fs::rename(file_path, &destination).map_err(|e| OrganizeError::FileMoveFailure {
        source: file_path.to_path_buf(),
        destination: destination.clone(),
        source_error: e,
    })?;

    Ok(MoveRecord {
        original_path: file_path.to_path_buf(),
        new_path: destination,
        target: assignment.target_path(),
    })
}

/// Removes now-empty directories left behind after an organization or undo
/// pass.
///
/// Only descends into the assignment target tree; files are never touched.
/// Errors on individual directories are ignored — a non-empty directory is
/// simply kept.
pub fn remove_empty_dirs(base_path: &Path) {
    if let Ok(entries) = fs::read_dir(base_path) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                remove_empty_dirs(&path);
                let _ = fs::remove_dir(&path);
            }
        }
    }
}
