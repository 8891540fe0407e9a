/// Category inference for project assets.
///
/// This module maps file extensions (plus sequence context) to the closed set
/// of asset categories used throughout the rule engine. Comps and Solids are
/// never inferred here; they are asserted by the host application's own item
/// metadata.
///
/// # Examples
///
/// ```
/// use projtidy::category::{CategoryType, Classifier};
///
/// let classifier = Classifier::default();
/// assert_eq!(classifier.classify("mp4", false), Some(CategoryType::Footage));
/// assert_eq!(classifier.classify("exr", false), Some(CategoryType::Images));
/// assert_eq!(classifier.classify("exr", true), Some(CategoryType::Footage));
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The closed set of asset categories.
///
/// Persisted configuration stores these as exact, case-sensitive strings
/// ("Comps", "Footage", ...); any other spelling is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryType {
    /// Compositions, asserted by the host (never inferred from extension).
    Comps,
    /// Video files and image sequences.
    Footage,
    /// Stand-alone still images.
    Images,
    /// Audio files.
    Audio,
    /// Solid layers, asserted by the host.
    Solids,
}

impl CategoryType {
    /// All valid category types, in canonical display order.
    pub const ALL: [CategoryType; 5] = [
        CategoryType::Comps,
        CategoryType::Footage,
        CategoryType::Images,
        CategoryType::Audio,
        CategoryType::Solids,
    ];

    /// Returns the exact persisted name of this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use projtidy::category::CategoryType;
    ///
    /// assert_eq!(CategoryType::Comps.name(), "Comps");
    /// assert_eq!(CategoryType::Footage.name(), "Footage");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            CategoryType::Comps => "Comps",
            CategoryType::Footage => "Footage",
            CategoryType::Images => "Images",
            CategoryType::Audio => "Audio",
            CategoryType::Solids => "Solids",
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks whether a string is a valid persisted category type.
///
/// The test is exact and case-sensitive; persisted data that fails it must be
/// ignored rather than coerced.
///
/// # Examples
///
/// ```
/// use projtidy::category::is_valid_category_type;
///
/// assert!(is_valid_category_type("Comps"));
/// assert!(!is_valid_category_type("comps"));
/// assert!(!is_valid_category_type(""));
/// ```
pub fn is_valid_category_type(value: &str) -> bool {
    CategoryType::ALL.iter().any(|c| c.name() == value)
}

/// Derives the extension from a filename: the substring after the last `.`.
///
/// Filenames without a dot yield an empty extension.
///
/// # Examples
///
/// ```
/// use projtidy::category::extension_from_filename;
///
/// assert_eq!(extension_from_filename("clip.MP4"), "MP4");
/// assert_eq!(extension_from_filename("archive.tar.gz"), "gz");
/// assert_eq!(extension_from_filename("noext"), "");
/// ```
pub fn extension_from_filename(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[idx + 1..],
        None => "",
    }
}

/// Maps file extensions to asset categories.
///
/// Holds the fixed reference tables of known video, audio, and image
/// extensions. Lookups are case-insensitive and tolerate a leading dot.
/// Custom extensions can be registered on top of the standard tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    video_extensions: HashSet<String>,
    audio_extensions: HashSet<String>,
    image_extensions: HashSet<String>,
}

impl Classifier {
    /// Creates a classifier with the standard extension tables.
    pub fn new() -> Self {
        let mut classifier = Self {
            video_extensions: HashSet::new(),
            audio_extensions: HashSet::new(),
            image_extensions: HashSet::new(),
        };
        classifier.populate_standard_extensions();
        classifier
    }

    fn populate_standard_extensions(&mut self) {
        // Video extensions
        for ext in [
            "mp4", "mov", "avi", "mxf", "mkv", "webm", "wmv", "flv", "m4v", "mpg", "mpeg", "r3d",
            "braw", "prores",
        ] {
            self.add_video_extension(ext);
        }

        // Audio extensions
        for ext in ["mp3", "wav", "aac", "aif", "aiff", "ogg", "flac", "m4a", "wma"] {
            self.add_audio_extension(ext);
        }

        // Image extensions
        for ext in [
            "jpg", "jpeg", "png", "psd", "exr", "tif", "tiff", "tga", "bmp", "gif", "dpx", "ai",
            "eps", "svg", "webp", "hdr", "dng", "raw",
        ] {
            self.add_image_extension(ext);
        }
    }

    /// Registers a custom video extension.
    pub fn add_video_extension(&mut self, ext: &str) {
        self.video_extensions.insert(normalize_extension(ext));
    }

    /// Registers a custom audio extension.
    pub fn add_audio_extension(&mut self, ext: &str) {
        self.audio_extensions.insert(normalize_extension(ext));
    }

    /// Registers a custom image extension.
    pub fn add_image_extension(&mut self, ext: &str) {
        self.image_extensions.insert(normalize_extension(ext));
    }

    /// Infers the category for a file extension.
    ///
    /// The extension is lower-cased and a leading dot, if present, is
    /// stripped before lookup. Video extensions map to Footage and audio
    /// extensions to Audio regardless of `is_sequence`; image extensions map
    /// to Images normally, but to Footage when `is_sequence` is true (a
    /// sequence of still frames is footage, not a set of stand-alone
    /// images). Unknown or empty extensions yield `None` — a normal outcome,
    /// not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use projtidy::category::{CategoryType, Classifier};
    ///
    /// let classifier = Classifier::default();
    /// assert_eq!(classifier.classify(".WAV", false), Some(CategoryType::Audio));
    /// assert_eq!(classifier.classify("xyz", false), None);
    /// assert_eq!(classifier.classify("", false), None);
    /// ```
    pub fn classify(&self, extension: &str, is_sequence: bool) -> Option<CategoryType> {
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return None;
        }

        if self.video_extensions.contains(&ext) {
            return Some(CategoryType::Footage);
        }
        if self.audio_extensions.contains(&ext) {
            return Some(CategoryType::Audio);
        }
        if self.image_extensions.contains(&ext) {
            if is_sequence {
                return Some(CategoryType::Footage);
            }
            return Some(CategoryType::Images);
        }

        None
    }

    /// Infers the category for a filename.
    ///
    /// The extension is derived as the substring after the last `.` in the
    /// filename (no dot yields an empty extension) and passed to
    /// [`Classifier::classify`].
    pub fn classify_from_filename(&self, filename: &str, is_sequence: bool) -> Option<CategoryType> {
        self.classify(extension_from_filename(filename), is_sequence)
    }

    /// Returns true if the extension is a known image extension.
    ///
    /// Used by sequence detection to restrict frame grouping to still-image
    /// formats.
    pub fn is_image_extension(&self, extension: &str) -> bool {
        self.image_extensions.contains(&normalize_extension(extension))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cases an extension and strips one leading dot.
fn normalize_extension(extension: &str) -> String {
    extension.strip_prefix('.').unwrap_or(extension).to_lowercase()
}
