use std::fs;
use std::path::{Path, PathBuf};

use clean_path::Clean;
use filetime::FileTime;
use tracing::debug;
use walkdir::WalkDir;

use crate::archive;
use crate::command::{
    ChangeDirCommand, CompressCommand, CopyCommand, DecompressCommand, DeleteCommand,
    DeleteManyCommand, InfoCommand, KindFilter, ListCommand, MakeDirCommand, MoveCommand,
    RenameCommand, SearchCommand, SortKey,
};
use crate::config::Config;
use crate::error::{OpError, OpResult};
use crate::format::{human_size, paint, Color, CLEAR_SCREEN};
use crate::meta::{self, format_time, EntryKind, EntryMeta};
use crate::progress::Progress;

/// Rendered outcome of one command.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// Console text for this command.
    pub rendered: String,
    /// Pipeline-passable text; only `list` and `search` produce it.
    pub pipe: Option<String>,
}

impl CommandOutput {
    fn plain(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            pipe: None,
        }
    }

    fn piped(rendered: impl Into<String>, pipe: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            pipe: Some(pipe.into()),
        }
    }
}

/// A system that can execute shell commands
///
/// This trait is used to define the interface for a system that can execute
/// the shell's command catalog.
pub trait System {
    /// Get the current working directory
    fn cwd(&self) -> &Path;
    /// Names of the entries directly under the working directory
    fn entry_names(&self) -> Vec<String>;
    /// Change the working directory
    fn change_dir(&mut self, cmd: &ChangeDirCommand) -> OpResult<CommandOutput>;
    /// Print the working directory
    fn pwd(&self) -> OpResult<CommandOutput>;
    /// List the working directory, or re-stat names from piped input
    fn list(&self, cmd: &ListCommand, piped: Option<&str>) -> OpResult<CommandOutput>;
    /// Show metadata for one entry
    fn info(&self, cmd: &InfoCommand) -> OpResult<CommandOutput>;
    /// Copy a file or directory tree
    fn copy(&self, cmd: &CopyCommand) -> OpResult<CommandOutput>;
    /// Relocate a file or directory tree
    fn mv(&self, cmd: &MoveCommand) -> OpResult<CommandOutput>;
    /// Delete one entry
    fn delete(&self, cmd: &DeleteCommand) -> OpResult<CommandOutput>;
    /// Delete several entries independently
    fn delete_many(&self, cmd: &DeleteManyCommand) -> OpResult<CommandOutput>;
    /// Create a new directory
    fn make_dir(&self, cmd: &MakeDirCommand) -> OpResult<CommandOutput>;
    /// Rename an entry, refusing collisions
    fn rename(&self, cmd: &RenameCommand) -> OpResult<CommandOutput>;
    /// Search entry names or file contents
    fn search(&self, cmd: &SearchCommand, piped: Option<&str>) -> OpResult<CommandOutput>;
    /// Pack an entry into a zip archive
    fn compress(&self, cmd: &CompressCommand) -> OpResult<CommandOutput>;
    /// Unpack a zip archive
    fn decompress(&self, cmd: &DecompressCommand) -> OpResult<CommandOutput>;
    /// Clear the terminal
    fn clear(&self) -> OpResult<CommandOutput>;
}

/// The operation engine: executes the command catalog against the host
/// filesystem, rooted at a mutable working directory.
#[derive(Debug, Clone)]
pub struct HostSystem {
    cwd: PathBuf,
    config: Config,
}

impl HostSystem {
    /// Create a system rooted at `start`, which must be an existing
    /// directory. Relative starts are resolved against the process cwd.
    pub fn new(start: PathBuf, config: Config) -> OpResult<Self> {
        let start = if start.is_absolute() {
            start.clean()
        } else {
            std::env::current_dir()?.join(start).clean()
        };

        if !start.is_dir() {
            return Err(OpError::InvalidTarget(format!(
                "'{}' is not a directory",
                start.display()
            )));
        }

        Ok(Self { cwd: start, config })
    }

    fn colors(&self) -> bool {
        self.config.use_colors
    }

    fn resolve(&self, name: &Path) -> OpResult<PathBuf> {
        meta::resolve(&self.cwd, name)
    }

    fn entries_from_cwd(&self) -> OpResult<Vec<EntryMeta>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.cwd).map_err(|e| OpError::io(&self.cwd, e))? {
            let entry = entry.map_err(|e| OpError::io(&self.cwd, e))?;
            match EntryMeta::read(&entry.path()) {
                Ok(meta) => entries.push(meta),
                Err(err) => debug!(
                    "skipping unreadable entry {}: {err}",
                    entry.path().display()
                ),
            }
        }
        Ok(entries)
    }

    /// Re-stat entry names taken from prior pipeline output. Each input
    /// line's trailing whitespace-delimited token is the entry name; names
    /// that no longer resolve are dropped.
    fn entries_from_piped(&self, text: &str) -> Vec<EntryMeta> {
        text.lines()
            .filter_map(|line| line.split_whitespace().last())
            .filter_map(|name| meta::resolve(&self.cwd, Path::new(name)).ok())
            .filter_map(|path| EntryMeta::read(&path).ok())
            .collect()
    }

    fn render_entry(&self, entry: &EntryMeta) -> String {
        let kind = format!("{:<4}", entry.kind.label());
        let kind = match entry.kind {
            EntryKind::Directory => paint(&kind, Color::Blue, self.colors()),
            EntryKind::File => paint(&kind, Color::Gray, self.colors()),
        };
        format!(
            "{kind}  {:>10}  {:<19}  {:<9}  {}",
            human_size(entry.size),
            format_time(&entry.modified),
            entry.permissions,
            entry.name,
        )
    }

    fn search_flat(&self, cmd: &SearchCommand, needle: &str) -> OpResult<Vec<String>> {
        let mut matches = Vec::new();
        for entry in fs::read_dir(&self.cwd).map_err(|e| OpError::io(&self.cwd, e))? {
            let entry = entry.map_err(|e| OpError::io(&self.cwd, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let hit = if cmd.content {
                entry.path().is_file() && content_matches(&entry.path(), needle)
            } else {
                name.to_lowercase().contains(needle)
            };
            if hit {
                matches.push(name);
            }
        }
        Ok(matches)
    }

    /// Recursive search over the full subtree; matches report paths relative
    /// to the working directory. Unreadable entries are skipped.
    fn search_tree(&self, cmd: &SearchCommand, needle: &str) -> Vec<String> {
        WalkDir::new(&self.cwd)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| {
                if cmd.content {
                    entry.file_type().is_file() && content_matches(entry.path(), needle)
                } else {
                    entry
                        .file_name()
                        .to_string_lossy()
                        .to_lowercase()
                        .contains(needle)
                }
            })
            .map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.cwd)
                    .map(|rel| rel.display().to_string())
                    .unwrap_or_else(|_| entry.path().display().to_string())
            })
            .collect()
    }
}

impl System for HostSystem {
    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn entry_names(&self) -> Vec<String> {
        fs::read_dir(&self.cwd)
            .map(|rd| {
                rd.filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn change_dir(&mut self, cmd: &ChangeDirCommand) -> OpResult<CommandOutput> {
        let target = if cmd.path.as_os_str() == ".." {
            match self.cwd.parent() {
                Some(parent) => parent.to_path_buf(),
                // already at a filesystem root
                None => self.cwd.clone(),
            }
        } else {
            self.cwd.join(&cmd.path).clean()
        };

        if !target.is_dir() {
            return Err(OpError::InvalidTarget("Invalid directory".into()));
        }

        debug!("cwd {} -> {}", self.cwd.display(), target.display());
        self.cwd = target;
        Ok(CommandOutput::plain(format!(
            "Changed to: {}",
            self.cwd.display()
        )))
    }

    fn pwd(&self) -> OpResult<CommandOutput> {
        Ok(CommandOutput::plain(self.cwd.display().to_string()))
    }

    fn list(&self, cmd: &ListCommand, piped: Option<&str>) -> OpResult<CommandOutput> {
        let mut entries = match piped {
            Some(text) => self.entries_from_piped(text),
            None => self.entries_from_cwd()?,
        };

        if let Some(filter) = cmd.filter {
            entries.retain(|e| match filter {
                KindFilter::File => e.kind == EntryKind::File,
                KindFilter::Dir => e.kind == EntryKind::Directory,
            });
        }

        match cmd.sort {
            Some(SortKey::Size) => entries.sort_by(|a, b| b.size.cmp(&a.size)),
            Some(SortKey::Name) => entries.sort_by_key(|e| e.name.to_lowercase()),
            None => {}
        }

        if entries.is_empty() {
            return Ok(CommandOutput::piped("Directory is empty", ""));
        }

        let body = entries
            .iter()
            .map(|e| self.render_entry(e))
            .collect::<Vec<_>>()
            .join("\n");
        let header = format!(
            "{:<4}  {:>10}  {:<19}  {:<9}  NAME",
            "KIND", "SIZE", "MODIFIED", "PERMS"
        );
        let rendered = format!("{header}\n{body}\n{} entries", entries.len());

        Ok(CommandOutput::piped(rendered, body))
    }

    fn info(&self, cmd: &InfoCommand) -> OpResult<CommandOutput> {
        let path = self.resolve(&cmd.name)?;
        let entry = EntryMeta::read(&path)?;

        Ok(CommandOutput::plain(format!(
            "Name: {}\nKind: {}\nSize: {} ({} bytes)\nPermissions: {}\nCreated: {}\nModified: {}\nPath: {}",
            entry.name,
            entry.kind.label(),
            human_size(entry.size),
            entry.size,
            entry.permissions,
            format_time(&entry.created),
            format_time(&entry.modified),
            entry.path.display(),
        )))
    }

    fn copy(&self, cmd: &CopyCommand) -> OpResult<CommandOutput> {
        let src = self.resolve(&cmd.src)?;
        let dst = meta::resolve_new(&self.cwd, &cmd.dst);

        let total = meta::size_of(&src)?;
        let mut progress = Progress::new(total);
        debug!("copy {} -> {} ({total} bytes)", src.display(), dst.display());

        if src.is_dir() {
            if dst.starts_with(&src) {
                return Err(OpError::InvalidTarget(format!(
                    "cannot copy '{}' into itself",
                    cmd.src.display()
                )));
            }
            copy_tree(&src, &dst, &mut progress)?;
        } else {
            let target = file_target(&src, &dst);
            copy_file(&src, &target, &mut progress)?;
        }

        Ok(CommandOutput::plain(format!(
            "Copied '{}' to '{}': {}",
            cmd.src.display(),
            cmd.dst.display(),
            progress.finish(),
        )))
    }

    fn mv(&self, cmd: &MoveCommand) -> OpResult<CommandOutput> {
        let src = self.resolve(&cmd.src)?;
        let dst = meta::resolve_new(&self.cwd, &cmd.dst);

        if src.is_dir() && dst.starts_with(&src) {
            return Err(OpError::InvalidTarget(format!(
                "cannot move '{}' into itself",
                cmd.src.display()
            )));
        }

        let total = meta::size_of(&src)?;
        let mut progress = Progress::new(total);
        debug!("move {} -> {} ({total} bytes)", src.display(), dst.display());

        let target = if src.is_file() {
            file_target(&src, &dst)
        } else {
            dst.clone()
        };

        match fs::rename(&src, &target) {
            Ok(()) => {
                println!("{}", progress.advance(total));
            }
            // cross-device moves and merges into an existing tree go the
            // long way: copy first, remove the source once the data is there
            Err(err) => {
                debug!("rename failed ({err}), falling back to copy and delete");
                if src.is_dir() {
                    copy_tree(&src, &dst, &mut progress)?;
                    fs::remove_dir_all(&src).map_err(|e| OpError::io(&src, e))?;
                } else {
                    copy_file(&src, &target, &mut progress)?;
                    fs::remove_file(&src).map_err(|e| OpError::io(&src, e))?;
                }
            }
        }

        Ok(CommandOutput::plain(format!(
            "Moved '{}' to '{}': {}",
            cmd.src.display(),
            cmd.dst.display(),
            progress.finish(),
        )))
    }

    fn delete(&self, cmd: &DeleteCommand) -> OpResult<CommandOutput> {
        let path = self.resolve(&cmd.name)?;
        delete_entry(&path)?;
        Ok(CommandOutput::plain(format!(
            "Deleted '{}'",
            cmd.name.display()
        )))
    }

    fn delete_many(&self, cmd: &DeleteManyCommand) -> OpResult<CommandOutput> {
        let mut deleted = 0usize;
        let mut lines = Vec::with_capacity(cmd.names.len() + 1);

        for name in &cmd.names {
            let result = self.resolve(name).and_then(|path| delete_entry(&path));
            match result {
                Ok(()) => {
                    deleted += 1;
                    lines.push(format!("Deleted '{}'", name.display()));
                }
                Err(err) => lines.push(format!("Skipped '{}': {err}", name.display())),
            }
        }

        lines.push(format!("{deleted} deleted"));
        Ok(CommandOutput::plain(lines.join("\n")))
    }

    fn make_dir(&self, cmd: &MakeDirCommand) -> OpResult<CommandOutput> {
        let path = meta::resolve_new(&self.cwd, &cmd.name);
        if path.exists() {
            return Err(OpError::InvalidTarget(format!(
                "'{}' already exists",
                cmd.name.display()
            )));
        }

        fs::create_dir(&path).map_err(|e| OpError::io(&path, e))?;
        Ok(CommandOutput::plain(format!(
            "Created directory '{}'",
            cmd.name.display()
        )))
    }

    fn rename(&self, cmd: &RenameCommand) -> OpResult<CommandOutput> {
        let old = self.resolve(&cmd.old)?;
        let new = meta::resolve_new(&self.cwd, &cmd.new);
        if new.exists() {
            return Err(OpError::InvalidTarget(format!(
                "'{}' already exists",
                cmd.new.display()
            )));
        }

        fs::rename(&old, &new).map_err(|e| OpError::io(&old, e))?;
        Ok(CommandOutput::plain(format!(
            "Renamed '{}' to '{}'",
            cmd.old.display(),
            cmd.new.display()
        )))
    }

    fn search(&self, cmd: &SearchCommand, piped: Option<&str>) -> OpResult<CommandOutput> {
        let needle = cmd.term.to_lowercase();

        let matches: Vec<String> = match piped {
            // filter incoming lines by their trailing name token, keeping
            // the incoming order
            Some(text) => text
                .lines()
                .filter(|line| {
                    line.split_whitespace()
                        .last()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
                })
                .map(str::to_string)
                .collect(),
            None if cmd.recursive => self.search_tree(cmd, &needle),
            None => self.search_flat(cmd, &needle)?,
        };

        if matches.is_empty() {
            return Ok(CommandOutput::piped("0 matches", ""));
        }

        let body = matches.join("\n");
        let rendered = format!("{body}\n{} matches", matches.len());
        Ok(CommandOutput::piped(rendered, body))
    }

    fn compress(&self, cmd: &CompressCommand) -> OpResult<CommandOutput> {
        let src = self.resolve(&cmd.name)?;
        let archive_path = meta::resolve_new(&self.cwd, &cmd.archive);

        archive::pack(&src, &archive_path)?;
        Ok(CommandOutput::plain(format!(
            "Compressed '{}' to '{}'",
            cmd.name.display(),
            cmd.archive.display()
        )))
    }

    fn decompress(&self, cmd: &DecompressCommand) -> OpResult<CommandOutput> {
        let archive_path = self.resolve(&cmd.archive)?;
        let dst = meta::resolve_new(&self.cwd, &cmd.dst);

        archive::unpack(&archive_path, &dst)?;
        Ok(CommandOutput::plain(format!(
            "Decompressed '{}' to '{}'",
            cmd.archive.display(),
            cmd.dst.display()
        )))
    }

    fn clear(&self) -> OpResult<CommandOutput> {
        Ok(CommandOutput::plain(CLEAR_SCREEN))
    }
}

/// Target for a file copy: copying onto an existing directory places the
/// file inside it.
fn file_target(src: &Path, dst: &Path) -> PathBuf {
    if dst.is_dir() {
        dst.join(meta::entry_name(src))
    } else {
        dst.to_path_buf()
    }
}

/// Copy one file, carrying permissions (via the host copy) and mtime.
/// The source was already resolved, so failures are attributed to `dst`.
fn copy_file(src: &Path, dst: &Path, progress: &mut Progress) -> OpResult<()> {
    let bytes = fs::copy(src, dst).map_err(|e| OpError::io(dst, e))?;

    let src_meta = fs::metadata(src).map_err(|e| OpError::io(src, e))?;
    if let Ok(modified) = src_meta.modified() {
        if let Err(err) = filetime::set_file_mtime(dst, FileTime::from_system_time(modified)) {
            debug!("could not carry mtime to {}: {err}", dst.display());
        }
    }

    println!("{}", progress.advance(bytes));
    Ok(())
}

/// Copy a whole tree into `dst`, merging with anything already there.
fn copy_tree(src: &Path, dst: &Path, progress: &mut Progress) -> OpResult<()> {
    fs::create_dir_all(dst).map_err(|e| OpError::io(dst, e))?;

    for entry in WalkDir::new(src).follow_links(false).min_depth(1) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| OpError::Unexpected("walked outside the copy root".into()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| OpError::io(&target, e))?;
        } else {
            copy_file(entry.path(), &target, progress)?;
        }
    }

    Ok(())
}

fn delete_entry(path: &Path) -> OpResult<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| OpError::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| OpError::io(path, e))
    }
}

/// Best-effort content probe: lossy UTF-8 decode, unreadable files skipped.
fn content_matches(path: &Path, needle: &str) -> bool {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes)
            .to_lowercase()
            .contains(needle),
        Err(_) => false,
    }
}
