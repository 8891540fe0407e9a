use clap::Parser;
/// Integration tests for projtidy
///
/// These tests exercise the complete CLI workflows end-to-end against real
/// temporary directories.
///
/// Test categories:
/// 1. Basic organization by category
/// 2. Dry-run mode verification
/// 3. Render folders, exceptions, and sequence handling
/// 4. Subcategory and filtered-category routing
/// 5. Undo
/// 6. Configuration migration, check, rename, stats
use projtidy::cli::{Cli, run};
use projtidy::config::{CategoryConfig, FolderConfig, SubcategoryConfig, VersionedConfig};
use projtidy::filter::SubcategoryFilter;
use projtidy::CategoryType;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary project directory plus a rule-set file.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_file(&self, name: &str) {
        fs::write(self.path().join(name), b"content").expect("Failed to write file");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name);
        }
    }

    /// Writes a rule set to `rules.json` and returns its path.
    fn write_config(&self, config: &VersionedConfig) -> PathBuf {
        let path = self.path().join("rules.json");
        config.save(&path).expect("Failed to save config");
        path
    }

    /// Runs the CLI against this fixture with an explicit config.
    fn run_with_config(&self, config_path: &Path, args: &[&str]) -> Result<(), String> {
        let mut argv = vec!["projtidy", "--config", config_path.to_str().unwrap()];
        argv.extend_from_slice(args);
        run(Cli::parse_from(argv))
    }

    /// Runs the CLI without a config flag.
    fn run_bare(&self, args: &[&str]) -> Result<(), String> {
        let mut argv = vec!["projtidy"];
        argv.extend_from_slice(args);
        run(Cli::parse_from(argv))
    }

    fn dir_arg(&self) -> String {
        self.path().to_string_lossy().to_string()
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }
}

fn organize(fixture: &TestFixture, config_path: &Path) {
    fixture
        .run_with_config(config_path, &["organize", &fixture.dir_arg()])
        .expect("organize should succeed");
}

// ============================================================================
// Test Suite 1: Basic Organization
// ============================================================================

#[test]
fn test_organize_moves_files_by_category() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "track.wav", "logo.png"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);

    fixture.assert_file_exists("Source/Footage/clip.mp4");
    fixture.assert_file_exists("Source/Audio/track.wav");
    fixture.assert_file_exists("Source/Images/logo.png");
    fixture.assert_file_not_exists("clip.mp4");
}

#[test]
fn test_organize_leaves_unknown_extensions() {
    let fixture = TestFixture::new();
    fixture.create_files(&["mystery.xyz", "clip.mp4"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);

    fixture.assert_file_exists("mystery.xyz");
    fixture.assert_file_exists("Source/Footage/clip.mp4");
}

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    let result = fixture.run_with_config(&config_path, &["organize", &fixture.dir_arg()]);
    assert!(result.is_ok(), "Should succeed on empty directory");
}

#[test]
fn test_organize_writes_history() {
    let fixture = TestFixture::new();
    fixture.create_file("clip.mp4");
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);

    fixture.assert_file_exists(".projtidy_history.json");
}

// ============================================================================
// Test Suite 2: Dry Run
// ============================================================================

#[test]
fn test_dry_run_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "track.wav"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    fixture
        .run_with_config(&config_path, &["organize", &fixture.dir_arg(), "--dry-run"])
        .expect("dry run should succeed");

    fixture.assert_file_exists("clip.mp4");
    fixture.assert_file_exists("track.wav");
    fixture.assert_file_not_exists("Source");
    fixture.assert_file_not_exists(".projtidy_history.json");
}

// ============================================================================
// Test Suite 3: Render Folders, Exceptions, Sequences
// ============================================================================

#[test]
fn test_render_keyword_claims_item() {
    let fixture = TestFixture::new();
    fixture.create_files(&["shot_render_v1.mov", "shot_010.mov"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);

    fixture.assert_file_exists("Render/shot_render_v1.mov");
    fixture.assert_file_exists("Source/Footage/shot_010.mov");
}

#[test]
fn test_exceptions_keep_items_in_place() {
    let fixture = TestFixture::new();
    fixture.create_files(&["shot_KEEP.mov", "shot_010.mov"]);
    let mut config = VersionedConfig::default_seed();
    config.exceptions.push("*_keep*".to_string());
    let config_path = fixture.write_config(&config);

    organize(&fixture, &config_path);

    fixture.assert_file_exists("shot_KEEP.mov");
    fixture.assert_file_exists("Source/Footage/shot_010.mov");
}

#[test]
fn test_image_sequence_goes_to_footage() {
    let fixture = TestFixture::new();
    fixture.create_files(&["plate.0001.exr", "plate.0002.exr", "poster.png"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);

    fixture.assert_file_exists("Source/Footage/plate.0001.exr");
    fixture.assert_file_exists("Source/Footage/plate.0002.exr");
    fixture.assert_file_exists("Source/Images/poster.png");
}

// ============================================================================
// Test Suite 4: Subcategories and Filtered Categories
// ============================================================================

#[test]
fn test_subcategory_filter_routes_to_subfolder() {
    let fixture = TestFixture::new();
    fixture.create_files(&["city_plate.mov", "shot_010.mov"]);

    let mut config = VersionedConfig::default_seed();
    let footage = config.folders[1]
        .categories
        .iter_mut()
        .find(|c| c.category == CategoryType::Footage)
        .unwrap();
    footage.subcategories.push(SubcategoryConfig::new(
        "plates",
        "Plates",
        vec![SubcategoryFilter::keyword("plate")],
    ));
    let config_path = fixture.write_config(&config);

    organize(&fixture, &config_path);

    fixture.assert_file_exists("Source/Footage/Plates/city_plate.mov");
    fixture.assert_file_exists("Source/Footage/shot_010.mov");
}

#[test]
fn test_filtered_category_duplicates_type_across_folders() {
    let fixture = TestFixture::new();
    fixture.create_files(&["shot_vfx_010.mov", "shot_010.mov"]);

    let mut config = VersionedConfig::default_seed();
    let mut vfx_folder = FolderConfig::new("vfx", "VFX", 2);
    let mut footage = CategoryConfig::new(CategoryType::Footage, 0);
    footage.keywords.push("vfx".to_string());
    vfx_folder.categories.push(footage);
    config.folders.push(vfx_folder);
    let config_path = fixture.write_config(&config);

    organize(&fixture, &config_path);

    fixture.assert_file_exists("VFX/Footage/shot_vfx_010.mov");
    fixture.assert_file_exists("Source/Footage/shot_010.mov");
}

// ============================================================================
// Test Suite 5: Undo
// ============================================================================

#[test]
fn test_undo_restores_organized_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "track.wav"]);
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);
    fixture.assert_file_not_exists("clip.mp4");

    fixture
        .run_bare(&["undo", &fixture.dir_arg()])
        .expect("undo should succeed");

    fixture.assert_file_exists("clip.mp4");
    fixture.assert_file_exists("track.wav");
    fixture.assert_file_not_exists("Source/Footage/clip.mp4");
    fixture.assert_file_not_exists(".projtidy_history.json");
}

#[test]
fn test_undo_without_history_fails() {
    let fixture = TestFixture::new();
    let result = fixture.run_bare(&["undo", &fixture.dir_arg()]);
    assert!(result.is_err());
}

// ============================================================================
// Test Suite 6: Migration, Check, Rename, Stats
// ============================================================================

#[test]
fn test_migrate_upgrades_v1_document() {
    let fixture = TestFixture::new();
    let old_path = fixture.path().join("old_rules.json");
    fs::write(
        &old_path,
        r#"{
            "folders": [
                {
                    "name": "Footage Bin",
                    "categories": [
                        { "type": "Footage", "enabled": true, "order": 0 }
                    ]
                }
            ]
        }"#,
    )
    .unwrap();

    fixture
        .run_bare(&["migrate", old_path.to_str().unwrap()])
        .expect("migrate should succeed");

    let upgraded = VersionedConfig::load_from_file(&old_path).unwrap();
    assert_eq!(upgraded.version, projtidy::CURRENT_VERSION);
    assert_eq!(upgraded.folders[0].name, "Footage Bin");
}

#[test]
fn test_migrate_rejects_future_version() {
    let fixture = TestFixture::new();
    let path = fixture.path().join("future.json");
    fs::write(&path, r#"{ "version": 99, "folders": [] }"#).unwrap();

    let result = fixture.run_bare(&["migrate", path.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_check_reports_ok_for_seed() {
    let fixture = TestFixture::new();
    let config_path = fixture.write_config(&VersionedConfig::default_seed());
    fixture
        .run_with_config(&config_path, &["check"])
        .expect("check should succeed");
}

#[test]
fn test_check_fails_on_invalid_label_color() {
    let fixture = TestFixture::new();
    let mut config = VersionedConfig::default_seed();
    let mut subcategory = SubcategoryConfig::new("s1", "Plates", Vec::new());
    subcategory.label_color = Some(42);
    config.folders[1].categories[1].subcategories.push(subcategory);
    let config_path = fixture.write_config(&config);

    let result = fixture.run_with_config(&config_path, &["check"]);
    assert!(result.is_err());
}

#[test]
fn test_rename_preview_moves_nothing() {
    let fixture = TestFixture::new();
    fixture.create_file("clip.mp4");

    fixture
        .run_bare(&["rename", &fixture.dir_arg(), "--prefix", "A_"])
        .expect("preview should succeed");

    fixture.assert_file_exists("clip.mp4");
    fixture.assert_file_not_exists("A_clip.mp4");
}

#[test]
fn test_rename_apply_renames_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "track.wav"]);

    fixture
        .run_bare(&[
            "rename",
            &fixture.dir_arg(),
            "--prefix",
            "A_",
            "--suffix",
            "_v2",
            "--apply",
        ])
        .expect("apply should succeed");

    fixture.assert_file_exists("A_clip_v2.mp4");
    fixture.assert_file_exists("A_track_v2.wav");
    fixture.assert_file_not_exists("clip.mp4");
}

#[test]
fn test_stats_runs_on_directory() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "track.wav"]);

    fixture
        .run_bare(&["stats", &fixture.dir_arg()])
        .expect("stats should succeed");
}

#[test]
fn test_organize_twice_is_stable() {
    let fixture = TestFixture::new();
    fixture.create_file("clip.mp4");
    let config_path = fixture.write_config(&VersionedConfig::default_seed());

    organize(&fixture, &config_path);
    // Second pass sees only folders plus the config and history files.
    organize(&fixture, &config_path);

    fixture.assert_file_exists("Source/Footage/clip.mp4");
}
