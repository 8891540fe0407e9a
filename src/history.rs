/// Organization history and undo.
///
/// Every organize run writes a `.projtidy_history.json` transaction log next
/// to the organized directory. Undo replays the log in reverse, restoring
/// files to their original locations and backing up any conflicting file
/// with a timestamp suffix before overwriting its slot.
use crate::organizer::{MoveRecord, OrganizeError, OrganizeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const HISTORY_FILE: &str = ".projtidy_history.json";

/// A persisted organize transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    /// ISO 8601 timestamp of the organize run.
    pub timestamp: String,
    pub base_path: PathBuf,
    pub moves: Vec<MoveRecord>,
}

impl HistoryLog {
    /// Creates an empty log for a base path, stamped now.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_path,
            moves: Vec::new(),
        }
    }

    /// Appends a completed move.
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE)
    }

    /// Writes the log to disk in JSON format.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::HistoryWriteFailed` on serialization or IO
    /// failure.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            }
        })?;
        fs::write(Self::history_file_path(base_path), json)
            .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })
    }

    /// Loads the most recent log, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::HistoryReadFailed` on IO failure and
    /// `OrganizeError::InvalidHistoryFormat` on parse failure.
    pub fn load(base_path: &Path) -> OrganizeResult<Option<Self>> {
        let path = Self::history_file_path(base_path);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| OrganizeError::HistoryReadFailed { source: e })?;
        let log = serde_json::from_str(&json).map_err(|e| OrganizeError::InvalidHistoryFormat {
            reason: e.to_string(),
        })?;
        Ok(Some(log))
    }

    /// Deletes the history file for a base path.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::HistoryWriteFailed` if removal fails.
    pub fn delete(base_path: &Path) -> OrganizeResult<()> {
        let path = Self::history_file_path(base_path);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| OrganizeError::HistoryWriteFailed { source: e })?;
        }
        Ok(())
    }
}

/// Outcome of an undo pass.
#[derive(Debug)]
pub struct UndoReport {
    pub restored_files: usize,
    pub failed_restores: Vec<(PathBuf, String)>,
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    fn new() -> Self {
        Self {
            restored_files: 0,
            failed_restores: Vec::new(),
            skipped_files: Vec::new(),
        }
    }

    /// True when nothing failed and nothing was skipped.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Undoes the most recent organize run for `base_path`.
///
/// Moves are reverted in reverse order (LIFO). A file missing from its
/// organized location is skipped; a file already present at the original
/// location is backed up with a timestamp suffix before the restore. The
/// history file is deleted only when every move was restored.
///
/// # Errors
///
/// Returns an error when the base path does not exist or no history is
/// available.
pub fn undo(base_path: &Path) -> OrganizeResult<UndoReport> {
    if !base_path.exists() {
        return Err(OrganizeError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "base path does not exist"),
        });
    }

    let log = HistoryLog::load(base_path)?.ok_or_else(|| OrganizeError::InvalidHistoryFormat {
        reason: "No previous organization found to undo".to_string(),
    })?;

    let mut report = UndoReport::new();
    for record in log.moves.iter().rev() {
        match restore_move(record) {
            Ok(()) => report.restored_files += 1,
            Err((path, reason)) => {
                if reason.contains("not found") {
                    report.skipped_files.push((path, reason));
                } else {
                    report.failed_restores.push((path, reason));
                }
            }
        }
    }

    if report.is_complete_success()
        && let Err(e) = HistoryLog::delete(base_path)
    {
        log::warn!("could not delete history file: {}", e);
    }

    Ok(report)
}

/// Restores a single move, backing up any conflicting file first.
fn restore_move(record: &MoveRecord) -> Result<(), (PathBuf, String)> {
    if !record.new_path.exists() {
        return Err((
            record.new_path.clone(),
            "File not found at organized location".to_string(),
        ));
    }

    if record.original_path.exists() {
        let backup = backup_path(&record.original_path);
        fs::rename(&record.original_path, &backup).map_err(|e| {
            (
                record.original_path.clone(),
                format!("Could not backup conflicting file: {}", e),
            )
        })?;
    }

    fs::rename(&record.new_path, &record.original_path).map_err(|e| {
        (
            record.new_path.clone(),
            format!("Failed to restore file: {}", e),
        )
    })
}

/// `file.mov` becomes `file.mov.bak.20260115-103045`.
fn backup_path(original: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = original
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let backup_name = format!("{}.bak.{}", filename, timestamp);
    match original.parent() {
        Some(parent) => parent.join(backup_name),
        None => PathBuf::from(backup_name),
    }
}
