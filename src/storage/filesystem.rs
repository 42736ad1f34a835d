//! File system operations
//!
//! Low-level helpers shared by the storage operations.

use log::warn;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Result, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, UNIX_EPOCH};

const MAX_RETRIES: u64 = 3;

/// Run `op`, retrying with a short backoff while it fails with
/// `PermissionDenied` (transient on some platforms while another process
/// holds the file open).
pub fn retry_on_permission_denied<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if attempt < MAX_RETRIES && e.kind() == io::ErrorKind::PermissionDenied => {
                warn!("Permission denied (attempt {}/{}), retrying", attempt, MAX_RETRIES);
                thread::sleep(Duration::from_millis(100 * attempt));
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Write everything from `reader` to `path`, replacing any existing file, and
/// sync it to storage before returning the number of bytes written.
pub fn write_durably(path: &Path, reader: &mut impl Read) -> Result<u64> {
    let mut file = File::create(path)?;
    let written = io::copy(reader, &mut file)?;
    file.flush()?;
    file.sync_all()?;
    Ok(written)
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether the directory at `path` has at least one entry.
pub fn directory_has_entries(path: &Path) -> Result<bool> {
    Ok(fs::read_dir(path)?.next().is_some())
}

/// Modification time in whole seconds since the Unix epoch, or 0 if unknown.
pub fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|dur| dur.as_secs())
        .unwrap_or(0)
}
