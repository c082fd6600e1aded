//! File classification: copy, keep, or replace with a placeholder

use crate::types::{ClassificationDecision, ExtensionSet, FileEntry};

/// Decide what to do with `entry`.
///
/// Precedence, first match wins:
/// 1. extension in `force_keep` -> `ForceKeep`
/// 2. extension in `force_replace` -> `PlaceholderForced`
/// 3. size strictly greater than `threshold` -> `PlaceholderLarge`
/// 4. otherwise -> `Copy`
pub fn classify(
    entry: &FileEntry,
    threshold: u64,
    force_replace: &ExtensionSet,
    force_keep: &ExtensionSet,
) -> ClassificationDecision {
    decide(&entry.extension, entry.size, threshold, force_replace, force_keep)
}

/// Same rules as [`classify`] on the raw inputs
pub fn decide(
    extension: &str,
    size: u64,
    threshold: u64,
    force_replace: &ExtensionSet,
    force_keep: &ExtensionSet,
) -> ClassificationDecision {
    if force_keep.contains(extension) {
        ClassificationDecision::ForceKeep
    } else if force_replace.contains(extension) {
        ClassificationDecision::PlaceholderForced
    } else if size > threshold {
        ClassificationDecision::PlaceholderLarge
    } else {
        ClassificationDecision::Copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MB: u64 = 1024 * 1024;

    fn entry(name: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from("/src").join(name), PathBuf::from(name), size)
    }

    fn set(exts: &[&str]) -> ExtensionSet {
        exts.iter().collect()
    }

    #[test]
    fn test_threshold_is_strictly_greater_than() {
        let none = ExtensionSet::new();
        assert_eq!(
            classify(&entry("a.bin", 30 * MB), 30 * MB, &none, &none),
            ClassificationDecision::Copy
        );
        assert_eq!(
            classify(&entry("a.bin", 30 * MB + 1), 30 * MB, &none, &none),
            ClassificationDecision::PlaceholderLarge
        );
        assert_eq!(
            classify(&entry("empty.txt", 0), 1, &none, &none),
            ClassificationDecision::Copy
        );
    }

    #[test]
    fn test_force_keep_wins_over_size_and_force_replace() {
        let keep = set(&["iso"]);
        let replace = set(&[".ISO", "mp4"]);
        assert_eq!(
            classify(&entry("large.iso", 100 * MB), 30 * MB, &replace, &keep),
            ClassificationDecision::ForceKeep
        );
    }

    #[test]
    fn test_force_replace_applies_below_threshold() {
        let replace = set(&[".mp4"]);
        assert_eq!(
            classify(&entry("clip.mp4", 1024), 30 * MB, &replace, &ExtensionSet::new()),
            ClassificationDecision::PlaceholderForced
        );
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let replace = set(&["MKV"]);
        assert_eq!(
            classify(&entry("Movie.Mkv", 1), 30 * MB, &replace, &ExtensionSet::new()),
            ClassificationDecision::PlaceholderForced
        );
    }

    #[test]
    fn test_files_without_extension_use_size_only() {
        let replace = set(&["mp4"]);
        let keep = set(&["txt"]);
        assert_eq!(
            classify(&entry("README", 10), 5, &replace, &keep),
            ClassificationDecision::PlaceholderLarge
        );
        assert_eq!(
            classify(&entry(".bashrc", 1), 5, &replace, &keep),
            ClassificationDecision::Copy
        );
    }

    #[test]
    fn test_decision_is_deterministic() {
        let replace = set(&["mp4", "avi"]);
        let keep = set(&["srt"]);
        let cases = [
            (".mp4", 10u64),
            (".srt", 100 * MB),
            (".txt", 31 * MB),
            (".txt", 5),
        ];
        for (ext, size) in cases {
            let first = decide(ext, size, 30 * MB, &replace, &keep);
            for _ in 0..3 {
                assert_eq!(decide(ext, size, 30 * MB, &replace, &keep), first);
            }
        }
    }
}
