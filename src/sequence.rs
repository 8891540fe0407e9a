//! Frame-number sequence detection.
//!
//! Still-image renders usually arrive as numbered frame files
//! (`shot_010.0001.exr`, `shot_010.0002.exr`, ...). Grouping them lets the
//! classifier treat the whole run as footage instead of a pile of single
//! images. A sequence is two or more names sharing the same stem and
//! extension with distinct trailing frame numbers.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Trailing frame-number pattern: stem, optional separator, at least two
/// digits, extension.
fn frame_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<stem>.*?)[._-]?(?P<frame>\d{2,})\.(?P<ext>[^.]+)$")
            .expect("frame pattern is valid")
    })
}

/// Splits a filename into (stem, frame, extension) if it carries a trailing
/// frame number.
///
/// Stem and extension are lower-cased for grouping; the frame digits keep
/// their padding.
pub fn frame_parts(name: &str) -> Option<(String, String, String)> {
    let captures = frame_pattern().captures(name)?;
    Some((
        captures["stem"].to_lowercase(),
        captures["frame"].to_string(),
        captures["ext"].to_lowercase(),
    ))
}

/// Returns the subset of `names` that belong to a frame sequence.
///
/// Names are grouped by (stem, extension); a group qualifies once it holds
/// two or more distinct frame numbers. The caller decides which names are
/// candidates (typically only still-image extensions).
pub fn sequence_members<'a, I>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut groups: HashMap<(String, String), Vec<(&str, String)>> = HashMap::new();
    for name in names {
        if let Some((stem, frame, ext)) = frame_parts(name) {
            groups.entry((stem, ext)).or_default().push((name, frame));
        }
    }

    let mut members = HashSet::new();
    for entries in groups.values() {
        let distinct_frames: HashSet<&str> =
            entries.iter().map(|(_, frame)| frame.as_str()).collect();
        if distinct_frames.len() >= 2 {
            for (name, _) in entries {
                members.insert((*name).to_string());
            }
        }
    }
    members
}
