//! Atomic file writes for the destination tree

use crate::types::DumpError;
use filetime::FileTime;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Copy a file with its permissions and timestamps, atomically.
///
/// 1. Stream into a sibling `.part` file
/// 2. Flush and sync to disk
/// 3. Preserve permissions, access and modification time
/// 4. Rename over the final destination
///
/// The `.part` file is removed if any step fails.
///
/// # Example
/// ```no_run
/// use pathdump::executor::copy_with_metadata;
/// use std::path::Path;
///
/// let bytes = copy_with_metadata(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), pathdump::DumpError>(())
/// ```
pub fn copy_with_metadata(src: &Path, dest: &Path) -> Result<u64, DumpError> {
    let part_path = part_path_for(dest);
    let result = copy_into_part(src, &part_path).and_then(|bytes| {
        fs::rename(&part_path, dest)?;
        Ok(bytes)
    });
    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }
    result
}

/// Write `contents` to `dest` through a `.part` file and rename.
///
/// Replaces an existing destination file even if it is read-only.
pub fn write_atomic(dest: &Path, contents: &[u8]) -> Result<(), DumpError> {
    let part_path = part_path_for(dest);
    let result = (|| -> Result<(), DumpError> {
        let mut part_file = File::create(&part_path)?;
        part_file.write_all(contents)?;
        part_file.sync_all()?;
        drop(part_file);
        fs::rename(&part_path, dest)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }
    result
}

fn copy_into_part(src: &Path, part_path: &Path) -> Result<u64, DumpError> {
    let mut src_file = File::open(src)?;
    let src_metadata = src_file.metadata()?;
    let mut part_file = File::create(part_path)?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;
    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        part_file.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;
    // Drop the file handle before rename (required on Windows)
    drop(part_file);

    fs::set_permissions(part_path, src_metadata.permissions())?;
    let atime = FileTime::from_last_access_time(&src_metadata);
    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_times(part_path, atime, mtime)?;

    Ok(total_bytes)
}

/// `dir/name.ext` -> `dir/name.ext.part`
fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("pathdump"));
    name.push(".part");
    dest.with_file_name(name)
}
