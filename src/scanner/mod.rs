//! Directory scanning logic

mod exclude;
mod walker;

pub use exclude::{normalize_token, ExclusionMatcher, ExclusionMode, MatchRule};
pub use walker::{walk, ProgressCallback, WalkSummary, Walker, DIR_PROGRESS_INTERVAL};
