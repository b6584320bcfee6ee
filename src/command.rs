use std::path::PathBuf;

/// Sort order for a directory listing.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortKey {
    /// Descending by byte size.
    Size,
    /// Ascending, case-insensitive, by entry name.
    Name,
}

/// Entry-kind filter for a directory listing, applied before sorting.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KindFilter {
    File,
    Dir,
}

/// List the working directory, or re-stat entry names taken from piped input
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ListCommand {
    pub sort: Option<SortKey>,
    pub filter: Option<KindFilter>,
}

/// Change the working directory
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChangeDirCommand {
    /// Target path; `..` means the parent of the current directory
    pub path: PathBuf,
}

/// Show kind, size, permissions and timestamps for one entry
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InfoCommand {
    pub name: PathBuf,
}

/// Copy a file or a whole directory tree
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CopyCommand {
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// Relocate a file or a whole directory tree
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MoveCommand {
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// Delete a single entry; directories are removed recursively
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteCommand {
    pub name: PathBuf,
}

/// Delete several entries independently, reporting each outcome
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteManyCommand {
    pub names: Vec<PathBuf>,
}

/// Create a new directory under the working directory
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MakeDirCommand {
    pub name: PathBuf,
}

/// Rename an entry, refusing if the new name already exists
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RenameCommand {
    pub old: PathBuf,
    pub new: PathBuf,
}

/// Case-insensitive substring search over names or file contents
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchCommand {
    pub term: String,
    /// Recurse through the full subtree instead of the immediate directory
    pub recursive: bool,
    /// Match file contents (lossy UTF-8) instead of entry names
    pub content: bool,
}

/// Pack a file or directory tree into a zip archive
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CompressCommand {
    pub name: PathBuf,
    pub archive: PathBuf,
}

/// Unpack a zip archive into a destination directory
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecompressCommand {
    pub archive: PathBuf,
    pub dst: PathBuf,
}

/// The complete set of commands understood by the shell.
///
/// One pipeline stage parses to exactly one of these; the dispatcher routes
/// it to the operation engine (or handles it itself for `History`, `Help`
/// and `Exit`).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    List(ListCommand),
    ChangeDir(ChangeDirCommand),
    Pwd,
    Info(InfoCommand),
    Copy(CopyCommand),
    Move(MoveCommand),
    Delete(DeleteCommand),
    DeleteMany(DeleteManyCommand),
    MakeDir(MakeDirCommand),
    Rename(RenameCommand),
    Search(SearchCommand),
    Compress(CompressCommand),
    Decompress(DecompressCommand),
    Clear,
    History,
    Help,
    Exit,
}
