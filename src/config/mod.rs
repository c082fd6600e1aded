//! Configuration management

mod cli;
mod file;
mod presets;

pub use cli::Cli;
pub use file::{FileConfig, ThresholdValue};
pub use presets::Preset;

use crate::scanner::ExclusionMode;
use crate::types::{DumpError, ExtensionSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Default size threshold (30 MB)
pub const DEFAULT_THRESHOLD_BYTES: u64 = 30 * MIB;

/// Default minimum spacing between replaced/kept log lines
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(1);

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Configuration for one dump job
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Files strictly larger than this are replaced
    pub size_threshold: u64,

    /// Exclusion tokens, in order, without duplicates
    pub exclude: Vec<String>,

    /// Extensions that are always replaced
    pub force_replace: ExtensionSet,

    /// Extensions that are always copied (wins over force_replace)
    pub force_keep: ExtensionSet,

    /// How exclusion tokens are matched against directory names
    pub exclusion_mode: ExclusionMode,

    /// Minimum spacing between replaced/kept log lines
    pub log_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            size_threshold: DEFAULT_THRESHOLD_BYTES,
            exclude: Vec::new(),
            force_replace: ExtensionSet::new(),
            force_keep: ExtensionSet::new(),
            exclusion_mode: ExclusionMode::default(),
            log_interval: DEFAULT_LOG_INTERVAL,
        }
    }
}

/// Source and destination after resolving to absolute, symlink-free paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoots {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ResolvedRoots {
    /// Rewrite absolute exclusion tokens as paths relative to the source root.
    ///
    /// Absolute tokens are resolved like the roots first. Tokens outside the
    /// source (or naming the source itself) can never match and are dropped
    /// with a warning. Relative tokens pass through unchanged.
    pub fn relativize_exclusions(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter_map(|token| {
                let path = Path::new(token.trim());
                if !path.is_absolute() {
                    return Some(token.clone());
                }
                let resolved = resolve_lenient(path).unwrap_or_else(|_| path.to_path_buf());
                match resolved.strip_prefix(&self.source) {
                    Ok(rel) if !rel.as_os_str().is_empty() => {
                        Some(rel.to_string_lossy().replace('\\', "/"))
                    }
                    _ => {
                        warn!(
                            "Ignoring exclude '{}': not inside source directory {}",
                            token,
                            self.source.display()
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

impl Config {
    /// Pre-flight checks; nothing is scanned or written when this fails.
    ///
    /// Rejects a missing or non-directory source, a non-positive threshold,
    /// nested source/destination trees and an unlistable source.
    pub fn validate(&self) -> Result<ResolvedRoots, DumpError> {
        let metadata = match fs::metadata(&self.source) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DumpError::SourceMissing {
                    path: self.source.clone(),
                })
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(DumpError::PermissionDenied {
                    path: self.source.clone(),
                })
            }
            Err(e) => return Err(DumpError::Io(e)),
        };
        if !metadata.is_dir() {
            return Err(DumpError::SourceNotDirectory {
                path: self.source.clone(),
            });
        }

        if self.size_threshold == 0 {
            return Err(DumpError::InvalidThreshold(
                "threshold must be greater than zero".to_string(),
            ));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(DumpError::Config(
                "Output directory must be specified".to_string(),
            ));
        }

        let source = fs::canonicalize(&self.source)?;
        let destination = resolve_lenient(&self.destination)?;

        if destination.starts_with(&source) {
            return Err(DumpError::DestinationInsideSource {
                source_root: source,
                destination,
            });
        }
        if source.starts_with(&destination) {
            return Err(DumpError::SourceInsideDestination {
                source_root: source,
                destination,
            });
        }

        if let Err(e) = fs::read_dir(&source) {
            return Err(if e.kind() == ErrorKind::PermissionDenied {
                DumpError::PermissionDenied { path: source }
            } else {
                DumpError::Io(e)
            });
        }

        Ok(ResolvedRoots {
            source,
            destination,
        })
    }
}

impl TryFrom<Cli> for Config {
    type Error = DumpError;

    /// Merge defaults, the optional TOML file and command-line flags.
    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let source = cli
            .source
            .or(file.source)
            .ok_or_else(|| DumpError::Config("Source directory must be specified".to_string()))?;
        let destination = cli
            .destination
            .or(file.destination)
            .ok_or_else(|| DumpError::Config("Output directory must be specified".to_string()))?;

        let size_threshold = match cli.threshold.or(file.threshold.map(|t| t.as_text())) {
            Some(text) => parse_threshold(&text)?,
            None => DEFAULT_THRESHOLD_BYTES,
        };

        let exclude = merge_list(file.exclude.iter().chain(cli.exclude.iter()));

        let mut force_replace: ExtensionSet = merge_list(
            file.force_replace.iter().chain(cli.force_replace.iter()),
        )
        .into_iter()
        .collect();
        for preset in file.replace_presets.iter().chain(cli.replace_presets.iter()) {
            force_replace.extend(preset.extensions());
        }

        let mut force_keep: ExtensionSet =
            merge_list(file.force_keep.iter().chain(cli.force_keep.iter()))
                .into_iter()
                .collect();
        for preset in file.keep_presets.iter().chain(cli.keep_presets.iter()) {
            force_keep.extend(preset.extensions());
        }

        let exclusion_mode =
            if cli.legacy_substring_match || file.legacy_substring_match.unwrap_or(false) {
                ExclusionMode::Substring
            } else {
                ExclusionMode::Segment
            };

        let log_interval = file
            .log_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LOG_INTERVAL);

        Ok(Config {
            source,
            destination,
            size_threshold,
            exclude,
            force_replace,
            force_keep,
            exclusion_mode,
            log_interval,
        })
    }
}

/// Parse a size threshold into bytes.
///
/// A bare number is megabytes; `B`, `K`/`KB`, `M`/`MB` and `G`/`GB`
/// suffixes select the unit (binary multiples). Exponent notation (`1e3`)
/// is accepted. The result must be positive.
pub fn parse_threshold(text: &str) -> Result<u64, DumpError> {
    let trimmed = text.trim();
    let invalid = || DumpError::InvalidThreshold(format!("'{}' is not a positive size", text));

    let split_at = trimmed
        .find(|c: char| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid());
    }

    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "M" | "MB" | "MIB" => MIB,
        "B" => 1,
        "K" | "KB" | "KIB" => KIB,
        "G" | "GB" | "GIB" => GIB,
        _ => return Err(invalid()),
    };

    let bytes = (value * multiplier as f64).floor();
    if bytes < 1.0 || bytes >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

/// Split comma-separated values, trim them, drop blanks and duplicates (first wins)
pub fn merge_list<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut merged: Vec<String> = Vec::new();
    for value in values {
        for item in value.split(',') {
            let item = item.trim();
            if !item.is_empty() && !merged.iter().any(|m| m == item) {
                merged.push(item.to_string());
            }
        }
    }
    merged
}

/// Absolute, symlink-free form of a path that may not exist yet.
///
/// The nearest existing ancestor is canonicalized and the missing tail re-attached.
fn resolve_lenient(path: &Path) -> Result<PathBuf, DumpError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(mut resolved) => {
                for part in tail.iter().rev() {
                    resolved.push(part);
                }
                return Ok(resolved);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name);
                        existing = parent;
                    }
                    _ => return Ok(absolute),
                }
            }
            Err(e) => return Err(DumpError::Io(e)),
        }
    }
}
