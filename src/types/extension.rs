//! ExtensionSet - Normalized set of file extensions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of lowercased, dot-prefixed extensions (`mp4` and `.MP4` are the same entry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one extension; blank input is ignored
    pub fn insert(&mut self, raw: &str) -> bool {
        match normalize_extension(raw) {
            Some(ext) => self.0.insert(ext),
            None => false,
        }
    }

    /// Membership test; `ext` is normalized the same way as inserted values
    pub fn contains(&self, ext: &str) -> bool {
        match normalize_extension(ext) {
            Some(ext) => self.0.contains(&ext),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined listing used in log headers
    pub fn display_list(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ExtensionSet::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for ExtensionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for raw in iter {
            self.insert(raw.as_ref());
        }
    }
}

impl From<Vec<String>> for ExtensionSet {
    fn from(values: Vec<String>) -> Self {
        values.into_iter().collect()
    }
}

impl From<ExtensionSet> for Vec<String> {
    fn from(set: ExtensionSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Lowercase and dot-prefix an extension string; `None` for blank input
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("mp4").as_deref(), Some(".mp4"));
        assert_eq!(normalize_extension(".MP4").as_deref(), Some(".mp4"));
        assert_eq!(normalize_extension("  Iso ").as_deref(), Some(".iso"));
        assert_eq!(normalize_extension(""), None);
        assert_eq!(normalize_extension("   "), None);
        assert_eq!(normalize_extension("."), None);
    }

    #[test]
    fn test_set_is_case_and_dot_insensitive() {
        let set: ExtensionSet = ["mp4", ".MKV"].into_iter().collect();

        assert!(set.contains(".mp4"));
        assert!(set.contains("MP4"));
        assert!(set.contains(".mkv"));
        assert!(!set.contains(".avi"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_duplicates_collapse() {
        let set: ExtensionSet = ["mp4", ".mp4", "MP4", ""].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.display_list(), ".mp4");
    }

    #[test]
    fn test_deserialize_from_toml_list() {
        #[derive(Deserialize)]
        struct Wrapper {
            exts: ExtensionSet,
        }

        let parsed: Wrapper = toml::from_str(r#"exts = ["ISO", ".img"]"#).expect("parse toml");
        assert!(parsed.exts.contains(".iso"));
        assert!(parsed.exts.contains(".img"));
    }
}
