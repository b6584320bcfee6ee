use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::command::Command;
use crate::config::Config;
use crate::parser::WinnowCommandParser;
use crate::system::{CommandOutput, System};

/// Every command name the shell understands, used for `?` suggestions and
/// the help text.
pub static COMMAND_NAMES: [&str; 17] = [
    "cd",
    "clear",
    "compress",
    "copy",
    "decompress",
    "del",
    "delmany",
    "exit",
    "help",
    "history",
    "info",
    "list",
    "mkdir",
    "move",
    "pwd",
    "rename",
    "search",
];

static HELP_TEXT: &str = "\
Available commands:
  list [sort:size|name] [type:file|dir] - List contents (with size/permissions)
  cd <path>                  - Change directory
  pwd                        - Show current path
  info <name>                - Show file/directory info (with permissions)
  copy <src> <dst>           - Copy file or directory (with progress)
  move <src> <dst>           - Move file or directory (with progress)
  del <name>                 - Delete file or directory
  delmany <name1> <name2> .. - Delete multiple files/directories
  mkdir <name>               - Create directory
  rename <old> <new>         - Rename file/directory
  search <term> [-r] [-c]    - Search files (-r recursive, -c content)
  compress <name> <zipname>  - Compress file/directory to zip
  decompress <zipname> <dst> - Decompress zip to directory
  clear                      - Clear the screen
  history                    - Show command history
  exit                       - Quit the program

Tip: type '<prefix>?' for command suggestions ('??' includes entry names)
Pipe: use '|' to chain commands (e.g. 'list | search test')";

/// Bounded FIFO of raw input lines.
///
/// Lines are recorded before alias or pipeline processing; once the bound is
/// hit the oldest entry is evicted.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    cap: usize,
}

impl History {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, line: &str) {
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

/// What one dispatched line produced.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Dispatched {
    /// Console text to print; may be empty.
    Output(String),
    /// The user asked to leave the shell.
    Exit,
}

/// Routes raw input lines to the operation engine.
///
/// Splits a line into `|`-separated stages, substitutes aliases per stage by
/// exact whole-command match, parses each stage, threads pipe text between
/// stages and renders the final result. Owns the bounded history and the
/// immutable alias table.
pub struct Dispatcher<S: System> {
    system: S,
    aliases: HashMap<String, String>,
    history: History,
}

impl<S: System> Dispatcher<S> {
    pub fn new(system: S, config: &Config) -> Self {
        Self {
            system,
            aliases: config.aliases.clone(),
            history: History::new(config.history_size),
        }
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Process one raw input line.
    pub fn dispatch(&mut self, line: &str) -> Dispatched {
        let line = line.trim();
        if line.is_empty() {
            return Dispatched::Output(String::new());
        }

        // suggestion queries never execute and are not recorded
        if !line.contains('|') {
            if let Some(stripped) = line.strip_suffix("??") {
                return Dispatched::Output(self.suggest(stripped.trim_end(), true));
            }
            if let Some(stripped) = line.strip_suffix('?') {
                return Dispatched::Output(self.suggest(stripped.trim_end(), false));
            }
        }

        self.history.push(line);

        let mut piped: Option<String> = None;
        let mut rendered = String::new();

        for stage in line.split('|').map(str::trim) {
            let stage = self
                .aliases
                .get(stage)
                .map(String::as_str)
                .unwrap_or(stage);
            debug!("dispatching stage {stage:?}");

            let command = match WinnowCommandParser::new(stage).get_command() {
                Ok(command) => command,
                Err(err) => {
                    return Dispatched::Output(format!("{:?}", miette::Report::new(err)));
                }
            };

            if let Command::Exit = command {
                return Dispatched::Exit;
            }

            let output = match self.execute(&command, piped.as_deref()) {
                Ok(output) => output,
                Err(err) => return Dispatched::Output(err.to_string()),
            };

            piped = output.pipe.clone();
            rendered = output.rendered;
        }

        Dispatched::Output(rendered)
    }

    fn execute(
        &mut self,
        command: &Command,
        piped: Option<&str>,
    ) -> crate::error::OpResult<CommandOutput> {
        match command {
            Command::List(cmd) => self.system.list(cmd, piped),
            Command::ChangeDir(cmd) => self.system.change_dir(cmd),
            Command::Pwd => self.system.pwd(),
            Command::Info(cmd) => self.system.info(cmd),
            Command::Copy(cmd) => self.system.copy(cmd),
            Command::Move(cmd) => self.system.mv(cmd),
            Command::Delete(cmd) => self.system.delete(cmd),
            Command::DeleteMany(cmd) => self.system.delete_many(cmd),
            Command::MakeDir(cmd) => self.system.make_dir(cmd),
            Command::Rename(cmd) => self.system.rename(cmd),
            Command::Search(cmd) => self.system.search(cmd, piped),
            Command::Compress(cmd) => self.system.compress(cmd),
            Command::Decompress(cmd) => self.system.decompress(cmd),
            Command::Clear => self.system.clear(),
            Command::History => Ok(CommandOutput {
                rendered: self.render_history(),
                pipe: None,
            }),
            Command::Help => Ok(CommandOutput {
                rendered: HELP_TEXT.to_string(),
                pipe: None,
            }),
            // handled by dispatch before execution
            Command::Exit => Ok(CommandOutput::default()),
        }
    }

    /// Command-name suggestions for a `?` query; `??` also offers entry
    /// names from the working directory.
    fn suggest(&self, base: &str, include_entries: bool) -> String {
        let mut suggestions: Vec<String> = COMMAND_NAMES
            .iter()
            .filter(|name| name.starts_with(base))
            .map(|name| name.to_string())
            .collect();

        if include_entries {
            let mut names = self.system.entry_names();
            names.retain(|name| name.starts_with(base));
            names.sort();
            suggestions.extend(names);
        }

        if suggestions.is_empty() {
            "No suggestions".to_string()
        } else {
            format!("Suggestions: {}", suggestions.join(", "))
        }
    }

    fn render_history(&self) -> String {
        if self.history.is_empty() {
            return "Command history is empty".to_string();
        }

        let mut lines = vec!["Command History:".to_string()];
        for (i, entry) in self.history.iter().enumerate() {
            lines.push(format!("{}. {entry}", i + 1));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::system::HostSystem;

    fn test_dispatcher(root: &Path) -> Dispatcher<HostSystem> {
        let config = Config {
            use_colors: false,
            ..Config::default()
        };
        let system = HostSystem::new(root.to_path_buf(), config.clone()).unwrap();
        Dispatcher::new(system, &config)
    }

    fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
        File::create(path)?.write_all(bytes)?;
        Ok(())
    }

    #[test]
    fn test_pipeline_list_then_search_keeps_order() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        write_file(&dir.path().join("test-small.txt"), &[0u8; 10])?;
        write_file(&dir.path().join("test-big.txt"), &[0u8; 9000])?;
        write_file(&dir.path().join("unrelated.txt"), &[0u8; 500])?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let result = dispatcher.dispatch("list sort:size | search test");

        // Assert: only matching names, still in descending-size order
        let Dispatched::Output(output) = result else {
            panic!("expected output");
        };
        let names: Vec<&str> = output
            .lines()
            .filter(|l| l.contains(".txt"))
            .map(|l| l.split_whitespace().last().unwrap())
            .collect();
        assert_eq!(names, vec!["test-big.txt", "test-small.txt"]);
        assert!(!output.contains("unrelated.txt"));
        Ok(())
    }

    #[test]
    fn test_alias_substitution_is_whole_command() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        write_file(&dir.path().join("a.txt"), b"x")?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act: "ls" is an alias for "list"
        let aliased = dispatcher.dispatch("ls");
        // "ls sort:size" is not an exact alias match and stays unknown
        let not_aliased = dispatcher.dispatch("ls sort:size");

        // Assert
        let Dispatched::Output(output) = aliased else {
            panic!("expected output");
        };
        assert!(output.contains("a.txt"));
        let Dispatched::Output(output) = not_aliased else {
            panic!("expected output");
        };
        assert!(output.contains("Unknown command"));
        Ok(())
    }

    #[test]
    fn test_history_is_bounded_fifo() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act: default bound is 10, insert 13
        for i in 0..13 {
            dispatcher.dispatch(&format!("mkdir dir-{i}"));
        }

        // Assert: only the 10 most recent remain, oldest first
        let recorded: Vec<&str> = dispatcher.history().iter().collect();
        assert_eq!(recorded.len(), 10);
        assert_eq!(recorded.first(), Some(&"mkdir dir-3"));
        assert_eq!(recorded.last(), Some(&"mkdir dir-12"));
        Ok(())
    }

    #[test]
    fn test_history_command_renders_numbered_lines() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());
        dispatcher.dispatch("pwd");

        // Act
        let result = dispatcher.dispatch("history");

        // Assert: the raw line is recorded before any processing
        let Dispatched::Output(output) = result else {
            panic!("expected output");
        };
        assert!(output.contains("1. pwd"));
        assert!(output.contains("2. history"));
        Ok(())
    }

    #[test]
    fn test_exit_signals_the_repl() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act / Assert
        assert_eq!(dispatcher.dispatch("exit"), Dispatched::Exit);
        Ok(())
    }

    #[test]
    fn test_suggestions_by_prefix() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let result = dispatcher.dispatch("de?");

        // Assert
        let Dispatched::Output(output) = result else {
            panic!("expected output");
        };
        assert!(output.contains("decompress"));
        assert!(output.contains("del"));
        assert!(output.contains("delmany"));
        assert!(!output.contains("copy"));
        // suggestion queries are not recorded in history
        assert!(dispatcher.history().is_empty());
        Ok(())
    }

    #[test]
    fn test_double_question_mark_includes_entries() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        write_file(&dir.path().join("copy-of-report.txt"), b"x")?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let result = dispatcher.dispatch("copy??");

        // Assert
        let Dispatched::Output(output) = result else {
            panic!("expected output");
        };
        assert!(output.contains("copy"));
        assert!(output.contains("copy-of-report.txt"));
        Ok(())
    }

    #[test]
    fn test_failed_command_reports_and_loop_continues() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let missing = dispatcher.dispatch("del ghost.txt");
        let still_alive = dispatcher.dispatch("pwd");

        // Assert
        let Dispatched::Output(output) = missing else {
            panic!("expected output");
        };
        assert!(output.contains("not found"));
        assert!(matches!(still_alive, Dispatched::Output(_)));
        Ok(())
    }

    #[test]
    fn test_empty_line_is_ignored() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let result = dispatcher.dispatch("   ");

        // Assert
        assert_eq!(result, Dispatched::Output(String::new()));
        assert!(dispatcher.history().is_empty());
        Ok(())
    }

    #[test]
    fn test_clear_emits_ansi_sequence() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act
        let result = dispatcher.dispatch("clear");

        // Assert
        assert_eq!(
            result,
            Dispatched::Output(crate::format::CLEAR_SCREEN.to_string())
        );
        Ok(())
    }

    #[test]
    fn test_mid_pipeline_failure_stops_the_chain() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        let mut dispatcher = test_dispatcher(dir.path());

        // Act: first stage fails to parse, nothing executes
        let result = dispatcher.dispatch("bogus | search x");

        // Assert
        let Dispatched::Output(output) = result else {
            panic!("expected output");
        };
        assert!(output.contains("Unknown command"));
        Ok(())
    }
}
