use std::borrow::Cow;
use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};

use clap_repl::reedline::{Prompt, PromptHistorySearchStatus, Reedline, Signal};

use crate::config::Config;
use crate::dispatch::{Dispatched, Dispatcher};
use crate::system::System;

static DEFAULT_PROMPT_INDICATOR: &str = "FE> ";
static DEFAULT_MULTILINE_INDICATOR: &str = "::: ";

#[derive(Clone)]
pub enum FexPromptSegment {
    /// A basic user-defined prompt (i.e. just text)
    Basic(String),
    /// The path of the current working directory
    WorkingDirectory(PathBuf),
    /// An empty prompt segment
    Empty,
}

pub struct FexPrompt {
    segment: FexPromptSegment,
}

impl FexPrompt {
    pub fn new(segment: FexPromptSegment) -> Self {
        Self { segment }
    }

    fn render_prompt_segment(&self) -> Cow<str> {
        match &self.segment {
            FexPromptSegment::Basic(s) => s.into(),
            FexPromptSegment::WorkingDirectory(path) => Cow::Owned(format!("{} ", path.display())),
            FexPromptSegment::Empty => Cow::Borrowed(""),
        }
    }
}

impl Prompt for FexPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<str> {
        self.render_prompt_segment()
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: clap_repl::reedline::PromptEditMode,
    ) -> std::borrow::Cow<str> {
        DEFAULT_PROMPT_INDICATOR.into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<str> {
        Cow::Borrowed(DEFAULT_MULTILINE_INDICATOR)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: clap_repl::reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

/// Startup banner printed once before the first prompt.
pub fn banner(config: &Config) -> String {
    format!(
        r"
    ____
   / __/__ _  __
  / /_/ _ \ |/_/
 / __/  __/>  <
/_/  \___/_/|_|
          v{}

Welcome to fex (colors: {})
Type 'help' for commands",
        env!("CARGO_PKG_VERSION"),
        if config.use_colors { "on" } else { "off" },
    )
}

pub struct Repl {}

impl Repl {
    /// Run the interactive loop until the user exits.
    ///
    /// An interrupt at the prompt is converted into a notice; it never
    /// terminates the loop or aborts anything in flight.
    pub fn run<S: System>(mut dispatcher: Dispatcher<S>) -> Result<()> {
        let mut editor = Reedline::create();

        loop {
            let prompt = FexPrompt::new(FexPromptSegment::WorkingDirectory(
                dispatcher.system().cwd().to_path_buf(),
            ));

            match editor.read_line(&prompt).into_diagnostic()? {
                Signal::Success(line) => match dispatcher.dispatch(&line) {
                    Dispatched::Exit => {
                        println!("Goodbye!");
                        break;
                    }
                    Dispatched::Output(text) => {
                        if !text.is_empty() {
                            println!("{text}");
                        }
                    }
                },
                Signal::CtrlC | Signal::CtrlD => {
                    println!("Use 'exit' to quit");
                }
            }
        }

        Ok(())
    }
}
