//! Command-line arguments

use super::presets::Preset;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Mirror a directory tree, replacing large files with text placeholders
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pathdump", version, about, long_about = None)]
pub struct Cli {
    /// Source directory to mirror
    pub source: Option<PathBuf>,

    /// Output directory (created if missing)
    pub destination: Option<PathBuf>,

    /// Size threshold: megabytes, or a number with B/K/M/G suffix; `1e3` style accepted [default: 30]
    #[arg(short = 's', long, value_name = "SIZE")]
    pub threshold: Option<String>,

    /// Directory name, relative path or glob to leave out (repeatable, comma-separated)
    #[arg(short = 'e', long = "exclude", value_name = "DIR", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Extensions always replaced by a placeholder
    #[arg(short = 'r', long = "force-replace", value_name = "EXT", value_delimiter = ',')]
    pub force_replace: Vec<String>,

    /// Extensions always copied, whatever their size
    #[arg(short = 'k', long = "force-keep", value_name = "EXT", value_delimiter = ',')]
    pub force_keep: Vec<String>,

    /// Add a preset's extensions to the force-replace set
    #[arg(long = "replace-preset", value_enum, value_delimiter = ',')]
    pub replace_presets: Vec<Preset>,

    /// Add a preset's extensions to the force-keep set
    #[arg(long = "keep-preset", value_enum, value_delimiter = ',')]
    pub keep_presets: Vec<Preset>,

    /// Exclude any directory whose name merely contains a token
    #[arg(long)]
    pub legacy_substring_match: bool,

    /// Load settings from a TOML file (flags take precedence)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the final statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Hide per-file log lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase diagnostic logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["pathdump", "/src", "/dst"]).expect("parse args");
        assert_eq!(cli.source, Some(PathBuf::from("/src")));
        assert_eq!(cli.destination, Some(PathBuf::from("/dst")));
        assert!(cli.threshold.is_none());
        assert!(!cli.legacy_substring_match);
    }

    #[test]
    fn test_comma_separated_lists() {
        let cli = Cli::try_parse_from([
            "pathdump",
            "/src",
            "/dst",
            "--exclude",
            "node_modules,.git",
            "-e",
            "build",
            "--force-keep",
            "iso,img",
            "--replace-preset",
            "video,audio",
        ])
        .expect("parse args");

        assert_eq!(cli.exclude, vec!["node_modules", ".git", "build"]);
        assert_eq!(cli.force_keep, vec!["iso", "img"]);
        assert_eq!(cli.replace_presets, vec![Preset::Video, Preset::Audio]);
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["pathdump", "-vv", "/src", "/dst"]).expect("parse args");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let result = Cli::try_parse_from(["pathdump", "--keep-preset", "movies", "/src", "/dst"]);
        assert!(result.is_err());
    }
}
