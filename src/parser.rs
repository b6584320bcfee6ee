use std::path::PathBuf;
use std::sync::Arc;

use miette::{Severity, SourceSpan};
use winnow::ascii::{multispace0, Caseless};
use winnow::combinator::{alt, cut_err, delimited, eof, preceded, repeat};
use winnow::{
    error::{AddContext, ErrorKind, FromRecoverableError, ParserError},
    prelude::*,
    stream::{Location, Recoverable, Stream},
    token::{literal, one_of, take_while},
    LocatingSlice,
};

use crate::command::{
    ChangeDirCommand, Command, CompressCommand, CopyCommand, DecompressCommand, DeleteCommand,
    DeleteManyCommand, InfoCommand, KindFilter, ListCommand, MakeDirCommand, MoveCommand,
    RenameCommand, SearchCommand, SortKey,
};
use crate::error::{ShellDiagnostic, ShellError};

type Input<'a> = Recoverable<LocatingSlice<&'a str>, CommandParserError>;
type ParserResult<T> = winnow::PResult<T, CommandParserError>;

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct CommandParserError {
    pub message: Option<String>,
    pub span: Option<SourceSpan>,
    pub label: Option<String>,
    pub help: Option<String>,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
struct ParseContext {
    message: Option<String>,
    label: Option<String>,
    help: Option<String>,
    severity: Option<Severity>,
}

impl ParseContext {
    fn msg(mut self, txt: impl AsRef<str>) -> Self {
        self.message = Some(txt.as_ref().to_string());
        self
    }

    fn lbl(mut self, txt: impl AsRef<str>) -> Self {
        self.label = Some(txt.as_ref().to_string());
        self
    }
}

fn cx() -> ParseContext {
    Default::default()
}

impl<I: Stream> ParserError<I> for CommandParserError {
    fn from_error_kind(_input: &I, _kind: ErrorKind) -> Self {
        Self {
            message: None,
            span: None,
            label: None,
            help: None,
            severity: None,
        }
    }

    fn append(
        self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        _kind: ErrorKind,
    ) -> Self {
        self
    }
}

impl<I: Stream> AddContext<I, ParseContext> for CommandParserError {
    fn add_context(
        mut self,
        _input: &I,
        _token_start: &<I as Stream>::Checkpoint,
        ctx: ParseContext,
    ) -> Self {
        self.message = ctx.message.or(self.message);
        self.label = ctx.label.or(self.label);
        self.help = ctx.help.or(self.help);
        self.severity = ctx.severity.or(self.severity);
        self
    }
}

impl<I: Stream + Location> FromRecoverableError<I, Self> for CommandParserError {
    #[inline]
    fn from_recoverable_error(
        token_start: &<I as Stream>::Checkpoint,
        _err_start: &<I as Stream>::Checkpoint,
        input: &I,
        mut e: Self,
    ) -> Self {
        e.span = e
            .span
            .or_else(|| Some(span_from_checkpoint(input, token_start)));
        e
    }
}

fn span_from_checkpoint<I: Stream + Location>(
    input: &I,
    start: &<I as Stream>::Checkpoint,
) -> SourceSpan {
    let offset = input.offset_from(start);
    ((input.location() - offset)..input.location()).into()
}

pub fn try_parse<'a, P, T>(mut parser: P, input: &'a str) -> Result<T, ShellError>
where
    P: Parser<Input<'a>, T, CommandParserError>,
{
    let (_, maybe_val, errs) = parser.recoverable_parse(LocatingSlice::new(input));
    if let (Some(v), true) = (maybe_val, errs.is_empty()) {
        Ok(v)
    } else {
        Err(failure_from_errs(errs, input))
    }
}

pub fn failure_from_errs(errs: Vec<CommandParserError>, input: &str) -> ShellError {
    let src = Arc::new(String::from(input));
    ShellError {
        input: src.clone(),
        diagnostics: errs
            .into_iter()
            .map(|e| ShellDiagnostic {
                input: src.clone(),
                span: e.span.unwrap_or_else(|| (0usize..0usize).into()),
                message: e
                    .message
                    .or_else(|| e.label.clone().map(|l| format!("Expected {l}"))),
                label: e.label.map(|l| format!("not {l}")),
                help: e.help,
                severity: Severity::Error,
            })
            .collect(),
    }
}

/// Diagnostic for a line whose leading token matches no known command.
fn unknown_command(input: &str) -> ShellError {
    let src = Arc::new(String::from(input));
    ShellError {
        input: src.clone(),
        diagnostics: vec![ShellDiagnostic {
            input: src,
            span: (0..input.len()).into(),
            message: Some("Unknown command".into()),
            label: Some("not a known command".into()),
            help: Some("Type 'help' for available commands".into()),
            severity: Severity::Error,
        }],
    }
}

/// Internal tag for one `list` option token.
#[derive(Debug, Clone, Copy)]
enum ListOpt {
    Sort(SortKey),
    Kind(KindFilter),
}

/// Internal tag for one `search` flag.
#[derive(Debug, Clone, Copy)]
enum SearchFlag {
    Recursive,
    Content,
}

/// A parser for one pipeline stage of shell input
/// This parser turns a single stage (no `|`) into a [`Command`] that can be
/// executed by the operation engine
/// The parser is based on the [Winnow](https://docs.rs/winnow) parser combinator library
pub struct WinnowCommandParser<'a> {
    input: &'a str,
}

impl<'a> WinnowCommandParser<'a> {
    /// Create a new parser for the given stage text
    pub fn new(input: &'a str) -> Self {
        WinnowCommandParser { input }
    }

    /// Parse the stage and return the command it names
    /// If there are any errors, return a ShellError
    pub fn get_command(&self) -> Result<Command, ShellError> {
        try_parse(Self::parse_command, self.input).map_err(|err| {
            if err.diagnostics.iter().all(|d| d.message.is_none()) {
                unknown_command(self.input)
            } else {
                err
            }
        })
    }

    /// Parse a complete command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// command := list_command
    ///        | cd_command
    ///        | pwd_command
    ///        | info_command
    ///        | copy_command
    ///        | move_command
    ///        | delmany_command
    ///        | del_command
    ///        | mkdir_command
    ///        | rename_command
    ///        | search_command
    ///        | compress_command
    ///        | decompress_command
    ///        | clear_command
    ///        | history_command
    ///        | help_command
    ///        | exit_command;
    /// ```
    ///
    /// `delmany` is tried before `del` so the longer keyword wins.
    fn parse_command(input: &mut Input<'_>) -> ParserResult<Command> {
        delimited(
            multispace0,
            alt((
                alt((
                    Self::parse_list_command,
                    Self::parse_cd_command,
                    Self::parse_pwd_command,
                    Self::parse_info_command,
                    Self::parse_copy_command,
                    Self::parse_move_command,
                    Self::parse_delmany_command,
                    Self::parse_del_command,
                    Self::parse_mkdir_command,
                )),
                alt((
                    Self::parse_rename_command,
                    Self::parse_search_command,
                    Self::parse_compress_command,
                    Self::parse_decompress_command,
                    Self::parse_clear_command,
                    Self::parse_history_command,
                    Self::parse_help_command,
                    Self::parse_exit_command,
                )),
            )),
            (Self::wss, eof.context(cx().lbl("end of command"))),
        )
        .parse_next(input)
    }

    /// Parse a list command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// list_command := "list" list_opt*;
    /// list_opt := "sort:" ("size" | "name")
    ///         | "type:" ("file" | "dir");
    /// ```
    fn parse_list_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("list")).parse_next(input)?;

        let cmd = repeat(0.., Self::parse_list_opt)
            .fold(ListCommand::default, |mut acc, opt| {
                match opt {
                    ListOpt::Sort(key) => acc.sort = Some(key),
                    ListOpt::Kind(filter) => acc.filter = Some(filter),
                }
                acc
            })
            .parse_next(input)?;

        Ok(Command::List(cmd))
    }

    fn parse_list_opt(input: &mut Input<'_>) -> ParserResult<ListOpt> {
        preceded(
            Self::wsp,
            alt((
                preceded(
                    "sort:",
                    cut_err(alt((
                        literal(Caseless("size")).value(SortKey::Size),
                        literal(Caseless("name")).value(SortKey::Name),
                    ))),
                )
                .map(ListOpt::Sort),
                preceded(
                    "type:",
                    cut_err(alt((
                        literal(Caseless("file")).value(KindFilter::File),
                        literal(Caseless("dir")).value(KindFilter::Dir),
                    ))),
                )
                .map(ListOpt::Kind),
            )),
        )
        .parse_next(input)
        .map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected sort:size, sort:name, type:file or type:dir"),
            )
        })
    }

    /// Parse a cd command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// cd_command := "cd" word;
    /// ```
    fn parse_cd_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("cd")).parse_next(input)?;

        let path = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a path for cd"),
            )
        })?;

        Ok(Command::ChangeDir(ChangeDirCommand { path }))
    }

    fn parse_pwd_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;
        literal(Caseless("pwd")).parse_next(input)?;
        Ok(Command::Pwd)
    }

    /// Parse an info command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// info_command := "info" word;
    /// ```
    fn parse_info_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("info")).parse_next(input)?;

        let name = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected an entry name for info"),
            )
        })?;

        Ok(Command::Info(InfoCommand { name }))
    }

    /// Parse a copy command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// copy_command := "copy" word word;
    /// ```
    fn parse_copy_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("copy")).parse_next(input)?;

        let src = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a source path for copy"),
            )
        })?;
        let dst = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a destination path for copy"),
            )
        })?;

        Ok(Command::Copy(CopyCommand { src, dst }))
    }

    /// Parse a move command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// move_command := "move" word word;
    /// ```
    fn parse_move_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("move")).parse_next(input)?;

        let src = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a source path for move"),
            )
        })?;
        let dst = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a destination path for move"),
            )
        })?;

        Ok(Command::Move(MoveCommand { src, dst }))
    }

    /// Parse a delmany command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// delmany_command := "delmany" word+;
    /// ```
    fn parse_delmany_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("delmany")).parse_next(input)?;

        let names: Vec<PathBuf> = cut_err(repeat(1.., Self::arg_path).fold(
            Vec::new,
            |mut acc, item| {
                acc.push(item);
                acc
            },
        ))
        .parse_next(input)
        .map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected at least one entry name for delmany"),
            )
        })?;

        Ok(Command::DeleteMany(DeleteManyCommand { names }))
    }

    /// Parse a del command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// del_command := "del" word;
    /// ```
    fn parse_del_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("del")).parse_next(input)?;

        let name = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected an entry name for del"),
            )
        })?;

        Ok(Command::Delete(DeleteCommand { name }))
    }

    /// Parse a mkdir command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// mkdir_command := "mkdir" word;
    /// ```
    fn parse_mkdir_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("mkdir")).parse_next(input)?;

        let name = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a directory name for mkdir"),
            )
        })?;

        Ok(Command::MakeDir(MakeDirCommand { name }))
    }

    /// Parse a rename command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// rename_command := "rename" word word;
    /// ```
    fn parse_rename_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("rename")).parse_next(input)?;

        let old = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected the current name for rename"),
            )
        })?;
        let new = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected the new name for rename"),
            )
        })?;

        Ok(Command::Rename(RenameCommand { old, new }))
    }

    /// Parse a search command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// search_command := "search" term ("-r" | "-c")*;
    /// ```
    ///
    /// The term is any argument token that does not start with `-`.
    fn parse_search_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("search")).parse_next(input)?;

        let term = cut_err(Self::arg_term).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a search term"),
            )
        })?;

        let (recursive, content) = repeat(0.., Self::parse_search_flag)
            .fold(
                || (false, false),
                |(mut recursive, mut content), flag| {
                    match flag {
                        SearchFlag::Recursive => recursive = true,
                        SearchFlag::Content => content = true,
                    }
                    (recursive, content)
                },
            )
            .parse_next(input)?;

        Ok(Command::Search(SearchCommand {
            term,
            recursive,
            content,
        }))
    }

    fn parse_search_flag(input: &mut Input<'_>) -> ParserResult<SearchFlag> {
        preceded(
            Self::wsp,
            alt((
                "-r".value(SearchFlag::Recursive),
                "-c".value(SearchFlag::Content),
            )),
        )
        .parse_next(input)
    }

    /// Parse a compress command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// compress_command := "compress" word word;
    /// ```
    fn parse_compress_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("compress")).parse_next(input)?;

        let name = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected an entry name for compress"),
            )
        })?;
        let archive = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected an archive name for compress"),
            )
        })?;

        Ok(Command::Compress(CompressCommand { name, archive }))
    }

    /// Parse a decompress command from the input
    ///
    /// # Grammar
    ///
    /// ```md
    /// decompress_command := "decompress" word word;
    /// ```
    fn parse_decompress_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;

        literal(Caseless("decompress")).parse_next(input)?;

        let archive = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected an archive name for decompress"),
            )
        })?;
        let dst = cut_err(Self::arg_path).parse_next(input).map_err(|e| {
            e.add_context(
                input,
                &input.checkpoint(),
                cx().msg("Expected a destination directory for decompress"),
            )
        })?;

        Ok(Command::Decompress(DecompressCommand { archive, dst }))
    }

    fn parse_clear_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;
        literal(Caseless("clear")).parse_next(input)?;
        Ok(Command::Clear)
    }

    fn parse_history_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;
        literal(Caseless("history")).parse_next(input)?;
        Ok(Command::History)
    }

    fn parse_help_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;
        literal(Caseless("help")).parse_next(input)?;
        Ok(Command::Help)
    }

    fn parse_exit_command(input: &mut Input<'_>) -> ParserResult<Command> {
        Self::wss.parse_next(input)?;
        literal(Caseless("exit")).parse_next(input)?;
        Ok(Command::Exit)
    }

    /// Parse one whitespace-delimited argument token
    ///
    /// # Grammar
    ///
    /// ```md
    /// word := ws+ ^(ws | "|")+;
    /// ```
    fn arg_word(input: &mut Input<'_>) -> ParserResult<String> {
        preceded(
            Self::wsp,
            take_while(1.., |c: char| !c.is_whitespace() && c != '|'),
        )
        .map(|s: &str| s.to_string())
        .parse_next(input)
        .map_err(|e| e.add_context(input, &input.checkpoint(), cx().msg("Expected an argument")))
    }

    /// Parse one argument token as a path
    fn arg_path(input: &mut Input<'_>) -> ParserResult<PathBuf> {
        Self::arg_word.map(PathBuf::from).parse_next(input)
    }

    /// Parse a search term: any argument token that is not a flag
    fn arg_term(input: &mut Input<'_>) -> ParserResult<String> {
        Self::arg_word
            .verify(|s: &String| !s.starts_with('-'))
            .parse_next(input)
    }

    /// Parse a whitespace character from the input
    fn ws(input: &mut Input<'_>) -> ParserResult<()> {
        one_of(UNICODE_SPACES).void().parse_next(input)
    }

    /// Parse zero or more whitespace characters from the input
    fn wss(input: &mut Input<'_>) -> ParserResult<()> {
        repeat(0.., Self::ws).parse_next(input)
    }

    /// Parse one or more whitespace characters from the input
    fn wsp(input: &mut Input<'_>) -> ParserResult<()> {
        repeat(1.., Self::ws).parse_next(input)
    }
}

static UNICODE_SPACES: [char; 18] = [
    '\u{0009}', '\u{0020}', '\u{00A0}', '\u{1680}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}',
    '\u{2004}', '\u{2005}', '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{202F}',
    '\u{205F}', '\u{3000}',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_command() {
        // Arrange
        let inputs = [
            "list",
            "list sort:size",
            "list sort:name",
            "list type:dir",
            "list sort:size type:file",
            "list type:file sort:size",
            "   LIST sort:NAME   ",
        ];
        let outputs = [
            ListCommand::default(),
            ListCommand {
                sort: Some(SortKey::Size),
                filter: None,
            },
            ListCommand {
                sort: Some(SortKey::Name),
                filter: None,
            },
            ListCommand {
                sort: None,
                filter: Some(KindFilter::Dir),
            },
            ListCommand {
                sort: Some(SortKey::Size),
                filter: Some(KindFilter::File),
            },
            ListCommand {
                sort: Some(SortKey::Size),
                filter: Some(KindFilter::File),
            },
            ListCommand {
                sort: Some(SortKey::Name),
                filter: None,
            },
        ];

        // Act / Assert
        for (input, output) in inputs.iter().zip(outputs.iter()) {
            let result = WinnowCommandParser::new(input).get_command();
            assert_eq!(result.unwrap(), Command::List(output.clone()), "{input}");
        }
    }

    #[test]
    fn test_parse_cd_command() {
        // Arrange
        let inputs = ["cd ..", "cd docs", "  cd  /tmp/stuff  "];
        let outputs = [
            PathBuf::from(".."),
            PathBuf::from("docs"),
            PathBuf::from("/tmp/stuff"),
        ];

        // Act / Assert
        for (input, output) in inputs.iter().zip(outputs.iter()) {
            let result = WinnowCommandParser::new(input).get_command();
            assert_eq!(
                result.unwrap(),
                Command::ChangeDir(ChangeDirCommand {
                    path: output.clone()
                })
            );
        }
    }

    #[test]
    fn test_parse_two_path_commands() {
        // Arrange
        let cases = [
            (
                "copy a.txt b.txt",
                Command::Copy(CopyCommand {
                    src: "a.txt".into(),
                    dst: "b.txt".into(),
                }),
            ),
            (
                "move old-dir new-dir",
                Command::Move(MoveCommand {
                    src: "old-dir".into(),
                    dst: "new-dir".into(),
                }),
            ),
            (
                "rename notes.md notes.bak",
                Command::Rename(RenameCommand {
                    old: "notes.md".into(),
                    new: "notes.bak".into(),
                }),
            ),
            (
                "compress photos photos.zip",
                Command::Compress(CompressCommand {
                    name: "photos".into(),
                    archive: "photos.zip".into(),
                }),
            ),
            (
                "decompress photos.zip restored",
                Command::Decompress(DecompressCommand {
                    archive: "photos.zip".into(),
                    dst: "restored".into(),
                }),
            ),
        ];

        // Act / Assert
        for (input, expected) in cases {
            let result = WinnowCommandParser::new(input).get_command();
            assert_eq!(result.unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_parse_del_and_delmany() {
        // Arrange / Act
        let del = WinnowCommandParser::new("del many.txt").get_command();
        let delmany = WinnowCommandParser::new("delmany a b c").get_command();

        // Assert
        assert_eq!(
            del.unwrap(),
            Command::Delete(DeleteCommand {
                name: "many.txt".into()
            })
        );
        assert_eq!(
            delmany.unwrap(),
            Command::DeleteMany(DeleteManyCommand {
                names: vec!["a".into(), "b".into(), "c".into()]
            })
        );
    }

    #[test]
    fn test_parse_search_command() {
        // Arrange
        let cases = [
            ("search needle", ("needle", false, false)),
            ("search needle -r", ("needle", true, false)),
            ("search needle -c", ("needle", false, true)),
            ("search needle -c -r", ("needle", true, true)),
        ];

        // Act / Assert
        for (input, (term, recursive, content)) in cases {
            let result = WinnowCommandParser::new(input).get_command();
            assert_eq!(
                result.unwrap(),
                Command::Search(SearchCommand {
                    term: term.into(),
                    recursive,
                    content,
                })
            );
        }
    }

    #[test]
    fn test_parse_bare_commands() {
        // Arrange
        let cases = [
            ("pwd", Command::Pwd),
            ("clear", Command::Clear),
            ("history", Command::History),
            ("help", Command::Help),
            ("exit", Command::Exit),
            ("EXIT", Command::Exit),
        ];

        // Act / Assert
        for (input, expected) in cases {
            let result = WinnowCommandParser::new(input).get_command();
            assert_eq!(result.unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        // Act
        let result = WinnowCommandParser::new("frobnicate the disk").get_command();

        // Assert
        let err = result.unwrap_err();
        assert!(err
            .diagnostics
            .iter()
            .any(|d| d.message.as_deref() == Some("Unknown command")));
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        // Arrange
        let inputs = ["cd", "copy only-one", "search", "delmany", "info"];

        // Act / Assert
        for input in inputs {
            let result = WinnowCommandParser::new(input).get_command();
            assert!(result.is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn test_bad_list_token_is_rejected() {
        // Act
        let result = WinnowCommandParser::new("list sort:bogus").get_command();

        // Assert
        let err = result.unwrap_err();
        assert!(err
            .diagnostics
            .iter()
            .any(|d| d.message.as_deref().is_some_and(|m| m.contains("sort:"))));
    }
}
