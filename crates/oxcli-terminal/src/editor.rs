//! Line input for local sessions.
//!
//! [`RustylineEditor`] gives history and TAB completion driven by the
//! active grammar. [`StreamEditor`] reads plain lines from any reader and
//! is used when stdin is not a terminal.

use std::io::{BufRead, Write};
use std::rc::Rc;

use oxcli_grammar::{CompletionKind, Node, complete};
use oxcli_types::error::{CliError, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Context, Editor, Helper, Highlighter, Hinter, Validator};

/// Result of reading a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    /// Ctrl+C.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

/// Source of interactive lines.
pub trait LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    fn add_history(&mut self, line: &str);

    /// Grammar to complete against, and the context frames to prefix
    /// before the typed text (`"interface eth0 "`, or empty at the root).
    fn set_completion(&mut self, grammar: Rc<Node>, prefix: String);
}

// ---------------------------------------------------------------------------
// rustyline
// ---------------------------------------------------------------------------

#[derive(Helper, Hinter, Highlighter, Validator)]
struct GrammarHelper {
    grammar: Option<Rc<Node>>,
    prefix: String,
}

impl Completer for GrammarHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let Some(grammar) = &self.grammar else {
            return Ok((pos, Vec::new()));
        };
        let typed = &line[..pos];
        let start = typed.rfind(char::is_whitespace).map_or(0, |i| i + 1);
        let full = format!("{}{typed}", self.prefix);
        let candidates = complete(grammar, &full)
            .into_iter()
            .filter(|c| c.kind == CompletionKind::Full)
            .map(|c| Pair {
                display: match &c.help {
                    Some(help) => format!("{:<20} {help}", c.text),
                    None => c.text.clone(),
                },
                replacement: format!("{} ", c.text),
            })
            .collect();
        Ok((start, candidates))
    }
}

/// Terminal editor with history and grammar-driven completion.
pub struct RustylineEditor {
    editor: Editor<GrammarHelper, DefaultHistory>,
}

impl RustylineEditor {
    pub fn new(history_size: usize) -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(history_size)
            .map_err(|e| CliError::Config(format!("history size {history_size}: {e}")))?
            .build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| CliError::Startup(format!("line editor: {e}")))?;
        editor.set_helper(Some(GrammarHelper {
            grammar: None,
            prefix: String::new(),
        }));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(CliError::Io(std::io::Error::other(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_completion(&mut self, grammar: Rc<Node>, prefix: String) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.grammar = Some(grammar);
            helper.prefix = prefix;
        }
    }
}

// ---------------------------------------------------------------------------
// Plain streams
// ---------------------------------------------------------------------------

/// Reads lines from `R`, writing prompts to `W`. No completion.
pub struct StreamEditor<R, W> {
    reader: R,
    prompts: W,
    history: Vec<String>,
}

impl<R: BufRead, W: Write> StreamEditor<R, W> {
    pub fn new(reader: R, prompts: W) -> Self {
        Self {
            reader,
            prompts,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn into_prompts(self) -> W {
        self.prompts
    }
}

impl<R: BufRead, W: Write> LineEditor for StreamEditor<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        self.prompts.write_all(prompt.as_bytes())?;
        self.prompts.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadResult::Eof);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(ReadResult::Line(trimmed.to_string()))
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_completion(&mut self, _grammar: Rc<Node>, _prefix: String) {}
}
