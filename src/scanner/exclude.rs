//! Directory exclusion matching

use crate::types::DumpError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// How plain tokens are compared with directory names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ExclusionMode {
    /// Tokens match whole path segments; glob tokens match paths and names
    #[default]
    Segment,

    /// Legacy: any directory whose name contains a token is excluded
    Substring,
}

/// Which rule caused a directory to be excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Relative path equals the token
    Exact,
    /// Relative path lies below the token
    Descendant,
    /// Token appears as whole segments inside the path
    Segment,
    /// Glob token matched the path or the directory name
    Glob,
    /// Token is a substring of the directory name (legacy mode)
    NameSubstring,
}

/// Compiled set of exclusion tokens
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    tokens: Vec<String>,
    globs: GlobSet,
    glob_tokens: Vec<String>,
    mode: ExclusionMode,
}

impl ExclusionMatcher {
    /// Normalize tokens to `/`-separated form and compile glob tokens.
    ///
    /// Blank tokens are dropped; an invalid glob is a configuration error.
    pub fn new<S: AsRef<str>>(tokens: &[S], mode: ExclusionMode) -> Result<Self, DumpError> {
        let mut plain = Vec::new();
        let mut glob_tokens = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for raw in tokens {
            let token = normalize_token(raw.as_ref());
            if token.is_empty() {
                continue;
            }
            if is_glob(&token) {
                let glob = Glob::new(&token).map_err(|e| {
                    DumpError::Config(format!("Invalid exclude pattern '{}': {}", token, e))
                })?;
                builder.add(glob);
                glob_tokens.push(token);
            } else if !plain.contains(&token) {
                plain.push(token);
            }
        }

        let globs = builder
            .build()
            .map_err(|e| DumpError::Config(format!("Failed to build exclude patterns: {}", e)))?;

        Ok(Self {
            tokens: plain,
            globs,
            glob_tokens,
            mode,
        })
    }

    /// Matcher that never excludes anything
    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            globs: GlobSet::empty(),
            glob_tokens: Vec::new(),
            mode: ExclusionMode::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.glob_tokens.is_empty()
    }

    pub fn mode(&self) -> ExclusionMode {
        self.mode
    }

    /// Whether the directory at `relative_dir` (relative to the source root) is excluded
    pub fn should_exclude(&self, relative_dir: &Path) -> bool {
        self.matching_rule(relative_dir).is_some()
    }

    /// First rule and token that exclude `relative_dir`, if any.
    ///
    /// The source root itself (empty relative path) is never excluded.
    pub fn matching_rule(&self, relative_dir: &Path) -> Option<(MatchRule, &str)> {
        let rel = normalize_relative(relative_dir);
        if rel.is_empty() {
            return None;
        }
        let name = rel.rsplit('/').next().unwrap_or(rel.as_str());
        let bounded = format!("/{}/", rel);

        for token in &self.tokens {
            if rel == *token {
                return Some((MatchRule::Exact, token.as_str()));
            }
            if rel.starts_with(token.as_str()) && rel[token.len()..].starts_with('/') {
                return Some((MatchRule::Descendant, token.as_str()));
            }
            if bounded.contains(&format!("/{}/", token)) {
                return Some((MatchRule::Segment, token.as_str()));
            }
            if self.mode == ExclusionMode::Substring && name.contains(token.as_str()) {
                return Some((MatchRule::NameSubstring, token.as_str()));
            }
        }

        self.matching_glob(&rel, name)
            .map(|token| (MatchRule::Glob, token))
    }

    /// Per-child pruning check made before descending from `parent_relative`
    /// into its child directory `name`.
    pub fn should_prune_child(&self, parent_relative: &Path, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        let parent = normalize_relative(parent_relative);
        let joined = if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent, name)
        };

        let by_token = self.tokens.iter().any(|token| {
            name == token.as_str()
                || joined == *token
                || (self.mode == ExclusionMode::Substring && name.contains(token.as_str()))
        });

        by_token || self.matching_glob(&joined, &name).is_some()
    }

    /// Whether some token names a directory strictly below `relative_dir`.
    ///
    /// Such directories are still traversed so the walk can reach the excluded point.
    pub fn leads_to_exclusion(&self, relative_dir: &Path) -> bool {
        let rel = normalize_relative(relative_dir);
        self.tokens.iter().any(|token| {
            rel.is_empty() || (token.starts_with(rel.as_str()) && token[rel.len()..].starts_with('/'))
        })
    }

    fn matching_glob(&self, rel: &str, name: &str) -> Option<&str> {
        if self.glob_tokens.is_empty() {
            return None;
        }
        let matches = self.globs.matches(rel);
        let index = match matches.first() {
            Some(i) => *i,
            None => *self.globs.matches(name).first()?,
        };
        self.glob_tokens.get(index).map(String::as_str)
    }
}

/// Canonical token form: `/` separators, no leading `./`, no trailing `/`
pub fn normalize_token(token: &str) -> String {
    let mut token = token.trim().replace('\\', "/");
    while let Some(rest) = token.strip_prefix("./") {
        token = rest.to_string();
    }
    while token.len() > 1 && token.ends_with('/') {
        token.pop();
    }
    if token == "." {
        token.clear();
    }
    token
}

/// Join the normal components of a relative path with `/`
fn normalize_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_glob(token: &str) -> bool {
    token.contains(['*', '?', '['])
}
