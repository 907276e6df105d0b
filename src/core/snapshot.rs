//! Whole-file JSON snapshots.
//!
//! Snapshots are always rewritten in full. A write goes to a temporary file
//! in the target directory which is then renamed over the old snapshot, so a
//! crash mid-write leaves either the old or the new content, never a
//! truncated file. Writers also hold an exclusive lock on `<file>.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

/// Read a snapshot file. Returns `Ok(None)` when it does not exist yet.
pub fn read_text(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read and parse a JSON snapshot
pub fn read_json<T: DeserializeOwned>(
    path: &Path,
) -> io::Result<Option<Result<T, serde_json::Error>>> {
    Ok(read_text(path)?.map(|content| serde_json::from_str(&content)))
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let content = serde_json::to_vec_pretty(value).map_err(io::Error::from)?;
    write_atomic(path, &content)
}

/// Atomically replace `path` with `content`
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;

    let result: io::Result<()> = (|| {
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        sync_dir(&dir);
        Ok(())
    })();

    let _ = FileExt::unlock(&lock);
    result
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

/// Make the rename durable where the platform allows opening directories
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}
