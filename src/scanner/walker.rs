//! Sequential directory walker

use super::exclude::ExclusionMatcher;
use crate::types::FileEntry;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback for reporting scan progress
///
/// Arguments:
/// - `dirs_scanned`: Directories visited so far
/// - `files_found`: Files yielded so far
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Default number of directories between progress callbacks
pub const DIR_PROGRESS_INTERVAL: u64 = 10;

/// Traversal totals, available once the walker is drained
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Directories visited (excluded subtrees not included)
    pub dirs_scanned: u64,
    /// Files yielded as `FileEntry`
    pub files_found: u64,
    /// Entries that could not be stat'ed or are not regular files
    pub skipped: Vec<PathBuf>,
    /// Directories whose contents could not be listed
    pub unreadable_dirs: u64,
    /// Directories pruned by the exclusion matcher
    pub excluded_dirs: u64,
    /// Files below pruned directories
    pub excluded_files: u64,
}

#[derive(Debug, Default)]
struct ExclusionTally {
    dirs: AtomicU64,
    files: AtomicU64,
}

impl ExclusionTally {
    fn record(&self, dir: &Path) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
        self.files.fetch_add(count_files(dir), Ordering::Relaxed);
    }
}

/// Lazy, single-pass walk over the source tree.
///
/// Yields one `FileEntry` per regular file (symlinks to files included) in
/// depth-first order. Entries of a directory come sorted by name, with files
/// and subdirectories interleaved rather than subdirectories first.
/// Excluded directories are pruned before they are read. Per-entry errors
/// are logged and recorded in the summary; they never stop the walk.
pub struct Walker {
    inner: ignore::Walk,
    root: PathBuf,
    tally: Arc<ExclusionTally>,
    summary: WalkSummary,
    on_progress: Option<ProgressCallback>,
    progress_every: u64,
}

/// Start walking `root`, consulting `matcher` before descending into each directory
pub fn walk(root: &Path, matcher: &ExclusionMatcher) -> Walker {
    let tally = Arc::new(ExclusionTally::default());

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    if !matcher.is_empty() {
        let filter_root = root.to_path_buf();
        let filter_matcher = Arc::new(matcher.clone());
        let filter_tally = Arc::clone(&tally);
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir {
                return true;
            }
            let relative = match entry.path().strip_prefix(&filter_root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel,
                _ => return true,
            };
            let parent = relative.parent().unwrap_or_else(|| Path::new(""));

            let pruned = filter_matcher.should_prune_child(parent, entry.file_name())
                || filter_matcher.should_exclude(relative);
            if pruned {
                debug!(dir = %relative.display(), "excluding directory");
                filter_tally.record(entry.path());
            } else if filter_matcher.leads_to_exclusion(relative) {
                debug!(dir = %relative.display(), "descending toward excluded path");
            }
            !pruned
        });
    }

    Walker {
        inner: builder.build(),
        root: root.to_path_buf(),
        tally,
        summary: WalkSummary::default(),
        on_progress: None,
        progress_every: DIR_PROGRESS_INTERVAL,
    }
}

impl Walker {
    /// Call `callback` every `every` directories; the yielded sequence is unchanged
    pub fn with_progress(mut self, every: u64, callback: ProgressCallback) -> Self {
        self.progress_every = every.max(1);
        self.on_progress = Some(callback);
        self
    }

    /// Totals so far, including exclusions recorded by the directory filter
    pub fn summary(&self) -> WalkSummary {
        let mut summary = self.summary.clone();
        summary.excluded_dirs = self.tally.dirs.load(Ordering::Relaxed);
        summary.excluded_files = self.tally.files.load(Ordering::Relaxed);
        summary
    }

    fn visited_dir(&mut self) {
        self.summary.dirs_scanned += 1;
        if self.summary.dirs_scanned % self.progress_every == 0 {
            if let Some(callback) = &self.on_progress {
                callback(self.summary.dirs_scanned, self.summary.files_found);
            }
        }
    }

    fn skip(&mut self, path: &Path, reason: &str) {
        warn!(
            "Skipping {}: {}. Try checking file permissions or if the file was deleted during scan.",
            path.display(),
            reason
        );
        self.summary.skipped.push(path.to_path_buf());
    }
}

impl Iterator for Walker {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        "Error during directory traversal: {}. Scan will continue with remaining files.",
                        e
                    );
                    self.summary.unreadable_dirs += 1;
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Some(ft) => ft,
                None => continue,
            };

            if file_type.is_dir() {
                self.visited_dir();
                continue;
            }

            // Follows symlinks: a dangling link fails here and is skipped.
            let metadata = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(e) => {
                    self.skip(entry.path(), &e.to_string());
                    continue;
                }
            };

            if metadata.is_dir() {
                debug!(path = %entry.path().display(), "not following directory symlink");
                continue;
            }
            if !metadata.is_file() {
                self.skip(entry.path(), "not a regular file");
                continue;
            }

            let relative_path = match entry.path().strip_prefix(&self.root) {
                Ok(p) => p.to_path_buf(),
                Err(_) => {
                    self.skip(entry.path(), "outside the source root");
                    continue;
                }
            };

            self.summary.files_found += 1;
            return Some(FileEntry::new(
                entry.path().to_path_buf(),
                relative_path,
                metadata.len(),
            ));
        }
    }
}

/// Count the files the walker would have yielded below `dir`: regular files
/// and symlinks to files, without descending into linked directories
fn count_files(dir: &Path) -> u64 {
    ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build()
        .filter_map(Result::ok)
        .filter(|e| match e.file_type() {
            Some(ft) if ft.is_file() => true,
            Some(ft) if ft.is_symlink() => fs::metadata(e.path()).is_ok_and(|m| m.is_file()),
            _ => false,
        })
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ExclusionMode;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create dirs");
        }
        let mut file = fs::File::create(path).expect("Failed to create file");
        file.write_all(content).expect("Failed to write");
    }

    fn relative_paths(walker: Walker) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = walker.map(|e| e.relative_path).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut walker = walk(temp_dir.path(), &ExclusionMatcher::empty());

        assert!(walker.next().is_none());
        let summary = walker.summary();
        assert_eq!(summary.files_found, 0);
        assert_eq!(summary.dirs_scanned, 1, "root directory counts as visited");
    }

    #[test]
    fn test_walk_nested_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("a/b/file.txt"), b"File 1");
        write_file(&root.join("c/Clip.MP4"), b"File 2 content");

        let walker = walk(root, &ExclusionMatcher::empty());
        let entries: Vec<FileEntry> = walker.collect();
        assert_eq!(entries.len(), 2);

        let clip = entries
            .iter()
            .find(|e| e.relative_path == Path::new("c/Clip.MP4"))
            .expect("clip entry");
        assert_eq!(clip.size, 14);
        assert_eq!(clip.extension, ".mp4");
        assert_eq!(clip.absolute_path, root.join("c/Clip.MP4"));
    }

    #[test]
    fn test_excluded_directory_yields_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("project/node_modules/pkg/index.js"), b"x");
        write_file(&root.join("project/node_modules/pkg/lib/util.js"), b"y");
        write_file(&root.join("project/src/main.js"), b"z");

        let matcher =
            ExclusionMatcher::new(&["node_modules"], ExclusionMode::Segment).expect("matcher");
        let mut walker = walk(root, &matcher);
        let mut paths: Vec<PathBuf> = walker.by_ref().map(|e| e.relative_path).collect();
        paths.sort();

        assert_eq!(paths, vec![PathBuf::from("project/src/main.js")]);
        let summary = walker.summary();
        assert_eq!(summary.excluded_dirs, 1);
        assert_eq!(summary.excluded_files, 2);
    }

    #[test]
    fn test_exact_relative_path_exclusion_keeps_siblings() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("photos/raw/a.cr2"), b"raw");
        write_file(&root.join("photos/jpg/a.jpg"), b"jpg");
        write_file(&root.join("backup/raw/b.cr2"), b"raw");

        let matcher =
            ExclusionMatcher::new(&["photos/raw"], ExclusionMode::Segment).expect("matcher");
        let paths = relative_paths(walk(root, &matcher));

        assert_eq!(
            paths,
            vec![
                PathBuf::from("backup/raw/b.cr2"),
                PathBuf::from("photos/jpg/a.jpg"),
            ]
        );
    }

    #[test]
    fn test_legacy_substring_mode_prunes_lookalikes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("tmp/a.txt"), b"a");
        write_file(&root.join("attempt/b.txt"), b"b");

        let segment = ExclusionMatcher::new(&["tmp"], ExclusionMode::Segment).expect("matcher");
        assert_eq!(
            relative_paths(walk(root, &segment)),
            vec![PathBuf::from("attempt/b.txt")]
        );

        let legacy = ExclusionMatcher::new(&["tmp"], ExclusionMode::Substring).expect("matcher");
        assert!(relative_paths(walk(root, &legacy)).is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_dangling_symlink_is_skipped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("real.txt"), b"real");
        std::os::unix::fs::symlink(root.join("missing.txt"), root.join("broken.txt"))
            .expect("Failed to create symlink");

        let mut walker = walk(root, &ExclusionMatcher::empty());
        let paths: Vec<PathBuf> = walker.by_ref().map(|e| e.relative_path).collect();

        assert_eq!(paths, vec![PathBuf::from("real.txt")]);
        assert_eq!(walker.summary().skipped, vec![root.join("broken.txt")]);
    }

    #[test]
    #[cfg(unix)]
    fn test_excluded_count_includes_symlinked_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("keep/target.bin"), b"target");
        write_file(&root.join("cache/own.bin"), b"own");
        std::os::unix::fs::symlink(root.join("keep/target.bin"), root.join("cache/link.bin"))
            .expect("Failed to create symlink");
        std::os::unix::fs::symlink(root.join("keep"), root.join("cache/dirlink"))
            .expect("Failed to create dir symlink");

        let matcher = ExclusionMatcher::new(&["cache"], ExclusionMode::Segment).expect("matcher");
        let mut walker = walk(root, &matcher);
        let paths: Vec<PathBuf> = walker.by_ref().map(|e| e.relative_path).collect();

        assert_eq!(paths, vec![PathBuf::from("keep/target.bin")]);
        assert_eq!(walker.summary().excluded_files, 2);
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_directory_is_counted_and_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let locked = root.join("locked");
        write_file(&locked.join("secret.txt"), b"secret");
        write_file(&root.join("open/visible.txt"), b"visible");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");

        // Root can list anything; nothing to observe in that case.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore");
            return;
        }

        let mut walker = walk(root, &ExclusionMatcher::empty());
        let paths: Vec<PathBuf> = walker.by_ref().map(|e| e.relative_path).collect();
        let summary = walker.summary();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore");

        assert_eq!(paths, vec![PathBuf::from("open/visible.txt")]);
        assert_eq!(summary.unreadable_dirs, 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_to_file_is_yielded_with_target_size() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        write_file(&root.join("target.bin"), &[7u8; 64]);
        std::os::unix::fs::symlink(root.join("target.bin"), root.join("link.bin"))
            .expect("Failed to create symlink");

        let entries: Vec<FileEntry> = walk(root, &ExclusionMatcher::empty()).collect();
        let link = entries
            .iter()
            .find(|e| e.relative_path == Path::new("link.bin"))
            .expect("link entry");
        assert_eq!(link.size, 64);
    }

    #[test]
    fn test_progress_callback_every_n_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        for i in 0..5 {
            write_file(&root.join(format!("dir{}/f.txt", i)), b"x");
        }

        let calls: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
        let calls_ref = Arc::clone(&calls);
        let walker = walk(root, &ExclusionMatcher::empty()).with_progress(
            2,
            Box::new(move |dirs, files| {
                calls_ref.lock().expect("lock calls").push((dirs, files));
            }),
        );
        let count = walker.count();

        assert_eq!(count, 5);
        let calls = calls.lock().expect("lock calls").clone();
        // root + 5 subdirectories = 6 directories -> callbacks at 2, 4, 6
        assert_eq!(calls.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![2, 4, 6]);
    }
}
