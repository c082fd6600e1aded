//! TOML configuration file

use super::presets::Preset;
use crate::types::DumpError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Size threshold as written in the file: `30`, `12.5` or `"512K"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Number(f64),
    Text(String),
}

impl ThresholdValue {
    pub fn as_text(&self) -> String {
        match self {
            ThresholdValue::Number(n) => n.to_string(),
            ThresholdValue::Text(s) => s.clone(),
        }
    }
}

/// Settings loaded from `--config <file>`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub threshold: Option<ThresholdValue>,
    pub exclude: Vec<String>,
    pub force_replace: Vec<String>,
    pub force_keep: Vec<String>,
    pub replace_presets: Vec<Preset>,
    pub keep_presets: Vec<Preset>,
    pub legacy_substring_match: Option<bool>,
    pub log_interval_ms: Option<u64>,
}

impl FileConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, DumpError> {
        let text = fs::read_to_string(path).map_err(|e| {
            DumpError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text).map_err(|e| match e {
            DumpError::Config(msg) => {
                DumpError::Config(format!("{} (in {})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, DumpError> {
        toml::from_str(text).map_err(|e| DumpError::Config(format!("Invalid config file: {}", e)))
    }
}
