//! Metadata reads for entries under the working directory.
//!
//! Everything here is recomputed on every call; results reflect the live
//! filesystem at call time with no staleness guarantee.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clean_path::Clean;
use walkdir::WalkDir;

use crate::error::{OpError, OpResult};

/// Closed entry-kind tag.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Kind of an existing path. Symlinks and special files report as
    /// whatever `is_dir` resolves them to.
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "FILE",
            EntryKind::Directory => "DIR",
        }
    }
}

/// Snapshot of one entry's metadata.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Byte length for files; recursive content sum for directories.
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub created: Option<DateTime<Local>>,
    /// Nine-character rwx triple for owner/group/other.
    pub permissions: String,
}

impl EntryMeta {
    /// Stat `path` and compute the full snapshot, including the recursive
    /// size when the entry is a directory.
    pub fn read(path: &Path) -> OpResult<Self> {
        let meta = fs::metadata(path).map_err(|e| OpError::io(path, e))?;
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = match kind {
            EntryKind::Directory => size_of(path)?,
            EntryKind::File => meta.len(),
        };

        Ok(Self {
            name: entry_name(path),
            path: path.to_path_buf(),
            kind,
            size,
            modified: meta.modified().ok().map(DateTime::<Local>::from),
            created: meta.created().ok().map(DateTime::<Local>::from),
            permissions: permission_string(&meta),
        })
    }
}

/// Display name of a path: its final component.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Join `name` against `base` and normalize lexically. Symlinks are not
/// canonicalized. Fails when the result does not exist.
pub fn resolve(base: &Path, name: &Path) -> OpResult<PathBuf> {
    let joined = resolve_new(base, name);
    if !joined.exists() {
        return Err(OpError::NotFound(name.display().to_string()));
    }
    Ok(joined)
}

/// Same join-and-clean as [`resolve`], without the existence requirement.
/// Used for destinations that are allowed (or required) to be absent.
pub fn resolve_new(base: &Path, name: &Path) -> PathBuf {
    base.join(name).clean()
}

/// Byte length of a file, or the sum of sizes of every file reachable by
/// recursive descent for a directory. Symlinks are never followed, which
/// keeps the traversal bounded; unreadable entries are skipped.
pub fn size_of(path: &Path) -> OpResult<u64> {
    if path.is_dir() {
        let total = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum();
        Ok(total)
    } else {
        let meta = fs::metadata(path).map_err(|e| OpError::io(path, e))?;
        Ok(meta.len())
    }
}

/// Nine-character rwx summary derived from the host mode bits.
#[cfg(unix)]
pub fn permission_string(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(9);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Without POSIX mode bits the summary degrades to the readonly flag.
#[cfg(not(unix))]
pub fn permission_string(meta: &fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}

/// Render an optional timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_time(time: &Option<DateTime<Local>>) -> String {
    match time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_missing_entry() -> Result<()> {
        // Arrange
        let dir = tempdir()?;

        // Act
        let result = resolve(dir.path(), Path::new("nope.txt"));

        // Assert
        assert_eq!(result.unwrap_err(), OpError::NotFound("nope.txt".into()));
        Ok(())
    }

    #[test]
    fn test_resolve_normalizes_dot_segments() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;

        // Act
        let resolved = resolve(dir.path(), Path::new("./sub/../sub"))?;

        // Assert
        assert_eq!(resolved, dir.path().join("sub").clean());
        Ok(())
    }

    #[test]
    fn test_file_size_matches_written_bytes() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let path = dir.path().join("data.bin");
        File::create(&path)?.write_all(&[0u8; 1536])?;

        // Act / Assert
        assert_eq!(size_of(&path)?, 1536);
        Ok(())
    }

    #[test]
    fn test_directory_size_is_recursive() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("inner"))?;
        File::create(dir.path().join("a.bin"))?.write_all(&[0u8; 100])?;
        File::create(dir.path().join("inner/b.bin"))?.write_all(&[0u8; 200])?;

        // Act / Assert
        assert_eq!(size_of(dir.path())?, 300);
        Ok(())
    }

    #[test]
    fn test_entry_meta_for_new_directory() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let sub = dir.path().join("fresh");
        fs::create_dir(&sub)?;

        // Act
        let meta = EntryMeta::read(&sub)?;

        // Assert
        assert_eq!(meta.kind, EntryKind::Directory);
        assert_eq!(meta.size, 0);
        assert_eq!(meta.name, "fresh");
        assert_eq!(meta.permissions.len(), 9);
        Ok(())
    }
}
