//! Named extension presets

use clap::ValueEnum;
use serde::Deserialize;

/// A named group of extensions that can feed either override set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Video,
    Audio,
    Image,
    Archive,
    Executable,
    Document,
    Config,
    Code,
    Subtitle,
    Database,
}

impl Preset {
    /// Extensions covered by this preset, without leading dots
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Preset::Video => &[
                "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "3gp", "ts", "vob",
                "rmvb",
            ],
            Preset::Audio => &[
                "mp3", "flac", "wav", "aac", "ogg", "wma", "m4a", "ape", "dts", "ac3",
            ],
            Preset::Image => &[
                "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "webp", "raw", "cr2", "nef",
            ],
            Preset::Archive => &[
                "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "dmg", "img",
            ],
            Preset::Executable => &["exe", "msi", "deb", "rpm", "pkg", "app", "dmg", "bin", "run"],
            Preset::Document => &["txt", "doc", "docx", "pdf", "rtf", "odt", "pages", "md", "rst"],
            Preset::Config => &[
                "json",
                "xml",
                "yaml",
                "yml",
                "ini",
                "cfg",
                "conf",
                "toml",
                "properties",
            ],
            Preset::Code => &[
                "py", "js", "html", "css", "cpp", "c", "h", "java", "php", "rb", "go", "rs",
            ],
            Preset::Subtitle => &["srt", "ass", "ssa", "vtt", "sub", "sbv", "lrc", "idx", "sup"],
            Preset::Database => &["db", "sqlite", "sqlite3", "sql", "mdb", "accdb", "dbf"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtensionSet;

    #[test]
    fn test_presets_expand_into_normalized_sets() {
        let set: ExtensionSet = Preset::Video.extensions().iter().collect();
        assert!(set.contains(".mkv"));
        assert!(set.contains(".RMVB"));
        assert!(!set.contains(".mp3"));
    }

    #[test]
    fn test_preset_parses_from_toml_and_cli_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            presets: Vec<Preset>,
        }
        let parsed: Wrapper =
            toml::from_str(r#"presets = ["subtitle", "database"]"#).expect("parse presets");
        assert_eq!(parsed.presets, vec![Preset::Subtitle, Preset::Database]);

        assert_eq!(
            Preset::from_str("archive", true).expect("value enum"),
            Preset::Archive
        );
    }
}
