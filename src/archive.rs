//! Zip packing and unpacking, consumed by compress/decompress.
//!
//! The operation engine treats both directions as all-or-nothing; no
//! progress is reported for archives.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{OpError, OpResult};
use crate::meta::entry_name;

/// Pack `source` (a file or a whole directory tree) into a zip archive at
/// `archive`. Tree entries are stored under the source's own name, so
/// unpacking recreates one top-level entry.
pub fn pack(source: &Path, archive: &Path) -> OpResult<()> {
    let file = File::create(archive).map_err(|e| OpError::io(archive, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let root_name = entry_name(source);

    if source.is_dir() {
        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| OpError::Unexpected("walked outside the archive root".into()))?;
            let stored = Path::new(&root_name).join(rel);
            let stored = stored.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                zip.add_directory(stored, options)?;
            } else {
                debug!("packing {}", entry.path().display());
                zip.start_file(stored, options)?;
                let mut reader = File::open(entry.path()).map_err(|e| OpError::io(entry.path(), e))?;
                io::copy(&mut reader, &mut zip)?;
            }
        }
    } else {
        zip.start_file(root_name, options)?;
        let mut reader = File::open(source).map_err(|e| OpError::io(source, e))?;
        io::copy(&mut reader, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

/// Unpack the zip archive at `archive` into the directory `dest`, creating
/// it if needed. Entries whose stored names would escape `dest` are skipped.
pub fn unpack(archive: &Path, dest: &Path) -> OpResult<()> {
    let file = File::open(archive).map_err(|e| OpError::io(archive, e))?;
    let mut zip = ZipArchive::new(file)?;

    fs::create_dir_all(dest).map_err(|e| OpError::io(dest, e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            debug!("skipping unsafe archive member {}", entry.name());
            continue;
        };
        let target = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| OpError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| OpError::io(parent, e))?;
            }
            let mut out = File::create(&target).map_err(|e| OpError::io(&target, e))?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_pack_and_unpack_single_file() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let source = dir.path().join("note.txt");
        File::create(&source)?.write_all(b"hello zip")?;
        let archive = dir.path().join("note.zip");

        // Act
        pack(&source, &archive)?;
        let out = dir.path().join("restored");
        unpack(&archive, &out)?;

        // Assert
        assert_eq!(fs::read(out.join("note.txt"))?, b"hello zip");
        Ok(())
    }

    #[test]
    fn test_pack_and_unpack_tree() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let tree = dir.path().join("project");
        fs::create_dir_all(tree.join("sub"))?;
        File::create(tree.join("a.txt"))?.write_all(b"aaa")?;
        File::create(tree.join("sub/b.txt"))?.write_all(b"bbbb")?;
        let archive = dir.path().join("project.zip");

        // Act
        pack(&tree, &archive)?;
        let out = dir.path().join("restored");
        unpack(&archive, &out)?;

        // Assert: one top-level entry named after the source
        assert_eq!(fs::read(out.join("project/a.txt"))?, b"aaa");
        assert_eq!(fs::read(out.join("project/sub/b.txt"))?, b"bbbb");
        Ok(())
    }

    #[test]
    fn test_unpack_missing_archive() -> Result<()> {
        // Arrange
        let dir = tempdir()?;

        // Act
        let result = unpack(&dir.path().join("nope.zip"), &dir.path().join("out"));

        // Assert
        assert!(matches!(result, Err(OpError::NotFound(_))));
        Ok(())
    }
}
