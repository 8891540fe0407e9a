//! Command-line interface.
//!
//! Subcommands cover the whole engine surface: organizing a project
//! directory (with dry-run), undoing the last run, checking a configuration,
//! migrating old configuration files, batch-rename previews, and project
//! statistics.

use crate::config::{RcFile, VersionedConfig};
use crate::category::Classifier;
use crate::history::{self, HistoryLog};
use crate::host::{self, DirectoryHost, ItemDescriptor, RenameRequest};
use crate::migrate;
use crate::organizer::{self, move_into_target};
use crate::output::OutputFormatter;
use crate::rename::{RenameOptions, build_preview};
use crate::resolver::{Assignment, diagnostics, resolve_target};
use clap::{Parser, Subcommand};
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Organize project assets into folder hierarchies driven by a versioned
/// rule set.
#[derive(Debug, Parser)]
#[command(name = "projtidy", version, about)]
pub struct Cli {
    /// Path to the rule-set configuration file (JSON).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Organize a project directory according to the rule set.
    Organize {
        dir: PathBuf,
        /// Show what would happen without moving anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Undo the previous organize run in a directory.
    Undo { dir: PathBuf },
    /// Validate the configuration and print diagnostics.
    Check,
    /// Upgrade a configuration file to the current schema version.
    Migrate {
        path: PathBuf,
        /// Write the upgraded document here instead of in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Preview (and optionally apply) a batch rename.
    Rename {
        dir: PathBuf,
        /// Literal text to find.
        #[arg(long, default_value = "")]
        find: String,
        /// Replacement text.
        #[arg(long, default_value = "")]
        replace: String,
        /// Text prepended to every name.
        #[arg(long, default_value = "")]
        prefix: String,
        /// Text inserted before the extension.
        #[arg(long, default_value = "")]
        suffix: String,
        /// Apply the renames instead of only previewing.
        #[arg(long)]
        apply: bool,
    },
    /// Print project statistics for a directory.
    Stats { dir: PathBuf },
}

/// Dispatches a parsed invocation.
pub fn run(cli: Cli) -> Result<(), String> {
    let explicit_config = cli.config;
    match cli.command {
        Command::Organize { dir, dry_run } => {
            let config = load_config(explicit_config.as_deref(), Some(&dir))?;
            organize(&dir, &config, dry_run)
        }
        Command::Undo { dir } => undo(&dir),
        Command::Check => {
            let config = load_config(explicit_config.as_deref(), None)?;
            check(&config)
        }
        Command::Migrate { path, output } => migrate_file(&path, output.as_deref()),
        Command::Rename {
            dir,
            find,
            replace,
            prefix,
            suffix,
            apply,
        } => {
            let options = RenameOptions {
                find_text: find,
                replace_text: replace,
                prefix,
                suffix,
            };
            rename(&dir, &options, apply)
        }
        Command::Stats { dir } => stats(&dir),
    }
}

/// Loads the rule set: explicit `--config`, then an `.projtidyrc.toml` in
/// the target directory, then the standard lookup chain.
fn load_config(explicit: Option<&Path>, dir: Option<&Path>) -> Result<VersionedConfig, String> {
    if explicit.is_none()
        && let Some(dir) = dir
        && let Some(rc) = RcFile::load(dir).map_err(|e| e.to_string())?
        && let Some(path) = rc.config_path
    {
        info!("using configuration from rc file: {}", path.display());
        return VersionedConfig::load_from_file(&path).map_err(|e| e.to_string());
    }
    VersionedConfig::load(explicit).map_err(|e| e.to_string())
}

/// Builds the organize plan: every non-folder, non-hidden item with a
/// resolved assignment.
fn build_plan(
    config: &VersionedConfig,
    items: &[ItemDescriptor],
) -> Result<Vec<(ItemDescriptor, Assignment)>, String> {
    let classifier = Classifier::default();
    let exceptions = config.compile_exceptions().map_err(|e| e.to_string())?;

    let mut plan = Vec::new();
    for item in items {
        if item.name.starts_with('.') {
            continue;
        }
        if let Some(assignment) = resolve_target(config, &classifier, &exceptions, item) {
            plan.push((item.clone(), assignment));
        }
    }
    Ok(plan)
}

fn print_warnings(config: &VersionedConfig) {
    for warning in diagnostics(config) {
        OutputFormatter::warning(&warning.to_string());
    }
}

fn organize(dir: &Path, config: &VersionedConfig, dry_run: bool) -> Result<(), String> {
    config.validate().map_err(|e| e.to_string())?;
    print_warnings(config);

    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", dir.display()));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", dir.display()));
    }

    let detect_sequences = config.detect_sequences_enabled();
    let directory_host = DirectoryHost::new(dir, detect_sequences);
    let items = host::items_or_empty(&directory_host);
    let plan = build_plan(config, &items)?;

    if plan.is_empty() {
        OutputFormatter::plain("No items to organize.");
        return Ok(());
    }

    let mut target_counts: HashMap<String, usize> = HashMap::new();
    for (item, assignment) in &plan {
        let target = assignment.target_path();
        *target_counts.entry(target.clone()).or_insert(0) += 1;
        if dry_run {
            OutputFormatter::plain(&format!(" - {} → {}/", item.name, target));
        }
    }

    if dry_run {
        OutputFormatter::target_summary(&target_counts, plan.len());
        OutputFormatter::success("Dry run complete. No files were moved.");
        return Ok(());
    }

    let progress = OutputFormatter::create_progress_bar(plan.len() as u64);
    let mut log = HistoryLog::new(dir.to_path_buf());
    let mut failed = 0usize;

    for (item, assignment) in &plan {
        progress.set_message(item.name.clone());
        match move_into_target(dir, &dir.join(&item.id), assignment) {
            Ok(record) => log.add_move(record),
            Err(e) => {
                progress.suspend(|| OutputFormatter::error(&e.to_string()));
                failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if let Err(e) = log.save(dir) {
        OutputFormatter::warning(&format!("Could not save history: {}", e));
    }

    if config.settings.delete_empty_folders {
        organizer::remove_empty_dirs(dir);
    }

    OutputFormatter::target_summary(&target_counts, plan.len());
    if failed > 0 {
        OutputFormatter::warning(&format!("{} item(s) could not be organized.", failed));
    }
    OutputFormatter::success(&format!(
        "Organization complete. Use 'projtidy undo {}' to revert.",
        dir.display()
    ));
    Ok(())
}

fn undo(dir: &Path) -> Result<(), String> {
    OutputFormatter::info("Undoing previous organization...");

    let report = history::undo(dir).map_err(|e| e.to_string())?;
    OutputFormatter::success(&format!("Restored: {}", report.restored_files));

    for (path, reason) in &report.skipped_files {
        OutputFormatter::warning(&format!("Skipped {}: {}", path.display(), reason));
    }
    for (path, reason) in &report.failed_restores {
        OutputFormatter::error(&format!("Failed {}: {}", path.display(), reason));
    }
    if !report.failed_restores.is_empty() {
        OutputFormatter::warning("History file was NOT deleted due to failures.");
    }
    Ok(())
}

fn check(config: &VersionedConfig) -> Result<(), String> {
    config.validate().map_err(|e| e.to_string())?;

    let warnings = diagnostics(config);
    if warnings.is_empty() {
        OutputFormatter::success(&format!(
            "Configuration OK (version {}, {} folder(s)).",
            config.version,
            config.folders.len()
        ));
    } else {
        for warning in &warnings {
            OutputFormatter::warning(&warning.to_string());
        }
        OutputFormatter::plain(&format!("{} warning(s) found.", warnings.len()));
    }
    Ok(())
}

fn migrate_file(path: &Path, output: Option<&Path>) -> Result<(), String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    let found_version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(1);

    let config = migrate::migrate(value).map_err(|e| e.to_string())?;
    let target = output.unwrap_or(path);
    config.save(target).map_err(|e| e.to_string())?;

    OutputFormatter::success(&format!(
        "Migrated {} from version {} to {} ({}).",
        path.display(),
        found_version,
        migrate::CURRENT_VERSION,
        target.display()
    ));
    Ok(())
}

fn rename(dir: &Path, options: &RenameOptions, apply: bool) -> Result<(), String> {
    let directory_host = DirectoryHost::new(dir, false);
    let items = host::items_or_empty(&directory_host);

    // Folders are excluded from rename batches.
    let files: Vec<&ItemDescriptor> = items.iter().filter(|i| !i.is_folder).collect();
    let preview = build_preview(
        files.iter().map(|i| (i.id.as_str(), i.name.as_str())),
        options,
    );

    OutputFormatter::header("RENAME PREVIEW");
    for entry in &preview.entries {
        OutputFormatter::rename_preview_row(
            &entry.original_name,
            &entry.preview_name,
            entry.is_changed(),
        );
    }

    if !preview.has_changes {
        OutputFormatter::plain("No changes.");
        return Ok(());
    }

    if !apply {
        OutputFormatter::plain("Run again with --apply to rename.");
        return Ok(());
    }

    let requests: Vec<RenameRequest> = preview
        .entries
        .iter()
        .filter(|e| e.is_changed())
        .map(|e| RenameRequest {
            id: e.id.clone(),
            new_name: e.preview_name.clone(),
        })
        .collect();

    match host::apply_renames(&directory_host, &requests) {
        Ok(refreshed) => {
            OutputFormatter::success(&format!(
                "Renamed {} item(s); {} item(s) in directory.",
                requests.len(),
                refreshed.len()
            ));
            Ok(())
        }
        Err(joined) => Err(format!("Rename failed: {}", joined)),
    }
}

fn stats(dir: &Path) -> Result<(), String> {
    let directory_host = DirectoryHost::new(dir, true);
    let stats = host::stats_or_zero(&directory_host);
    OutputFormatter::stats_table(&stats);
    Ok(())
}
