//! Terminal output formatting.
//!
//! Centralizes colored output, progress bars, and the summary tables printed
//! by the CLI commands so formatting stays consistent across them.

use crate::host::ProjectStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Consistent styling for all CLI output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green checkmark line.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Red cross line on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Yellow warning line.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Cyan informational line.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Unstyled line.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Bold section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Yellow dry-run marker line.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar for move batches.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Summary table of items per resolved target path.
    pub fn target_summary(target_counts: &HashMap<String, usize>, total_items: usize) {
        Self::header("SUMMARY");

        let mut targets: Vec<_> = target_counts.iter().collect();
        targets.sort_by_key(|&(name, _)| name);

        let width = targets
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6);

        println!("{:<width$} | {}", "Target".bold(), "Items".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (target, count) in &targets {
            let item_word = if **count == 1 { "item" } else { "items" };
            println!(
                "{:<width$} | {} {}",
                target,
                count.to_string().green(),
                item_word,
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_items.to_string().green().bold(),
            if total_items == 1 { "item" } else { "items" },
            width = width
        );
    }

    /// Two-column project statistics table.
    pub fn stats_table(stats: &ProjectStats) {
        Self::header("PROJECT STATISTICS");
        let rows = [
            ("Total items", stats.total_items),
            ("Comps", stats.comps),
            ("Footage", stats.footage),
            ("Images", stats.images),
            ("Audio", stats.audio),
            ("Sequences", stats.sequences),
            ("Solids", stats.solids),
            ("Folders", stats.folders),
            ("Missing footage", stats.missing_footage),
            ("Unused items", stats.unused_items),
        ];
        for (label, count) in rows {
            println!("  {:<16} {}", label, count.to_string().green());
        }
    }

    /// Side-by-side rename preview rows.
    pub fn rename_preview_row(original: &str, preview: &str, changed: bool) {
        if changed {
            println!("  {} {} {}", original, "→".cyan(), preview.green());
        } else {
            println!("  {} {} {}", original, "→".dimmed(), preview.dimmed());
        }
    }
}
