//! The dispatch engine.
//!
//! A [`Cli`] owns the application state, the assembled grammar and its
//! registries, and one [`Session`]. Each input line is prefixed with the
//! active context frames, matched against the session grammar, and
//! handed to the resolved handler. A line that does not match is retried
//! once with every word replaced by its unique completion (`sh ver` becomes
//! `show version`). A lone context-group keyword that matches nothing
//! enters that context.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use oxcli_grammar::{Completion, CompletionKind, Node, Parse, complete, full_count, parse};
use oxcli_types::CliConfig;
use oxcli_types::error::{CliError, Result};

use crate::assembly::{GrammarBuilder, Registry};
use crate::builtins::register_builtins;
use crate::command::{CommandOutput, Environment};
use crate::doc::DocTable;
use crate::handlers::HandlerTable;
use crate::locale::{self, FormatOverrides};
use crate::output::OutputRegistry;
use crate::session::{Session, SessionMode};

/// What became of a line once it reached the grammar.
enum Outcome {
    Ran(CommandOutput),
    NoMatch,
}

/// A command-line interpreter over application state `S`.
pub struct Cli<S> {
    pub(crate) config: CliConfig,
    state: S,
    pub(crate) session: Session,
    compiled: Rc<Node>,
    handlers: HandlerTable<S>,
    outputs: OutputRegistry<S>,
    formats: FormatOverrides,
    docs: DocTable,
    context_groups: Vec<String>,
    running: Arc<AtomicBool>,
}

impl<S: 'static> Cli<S> {
    /// Register the builtins, assemble the grammar, and pick the startup
    /// grammar (the document named by `config.grammar_env`, if any).
    pub fn new(config: CliConfig, state: S, mut builder: GrammarBuilder<S>) -> Result<Self> {
        register_builtins(&mut builder)?;
        let registry = builder.build()?;
        let mut cli = Self::from_registry(config, state, registry);
        cli.load_overlay_from_env();
        Ok(cli)
    }
}

impl<S> Cli<S> {
    /// Wrap an already built registry. No overlay is loaded.
    pub fn from_registry(config: CliConfig, state: S, registry: Registry<S>) -> Self {
        let Registry {
            grammar,
            handlers,
            outputs,
            context_groups,
        } = registry;
        let compiled = Rc::new(grammar);
        let mode = if config.is_remote() {
            SessionMode::Remote
        } else {
            SessionMode::Local
        };
        let session = Session::new(mode, &config.prompt, Rc::clone(&compiled));
        Self {
            config,
            state,
            session,
            compiled,
            handlers,
            outputs,
            formats: FormatOverrides::new(),
            docs: DocTable::new(),
            context_groups,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_docs(mut self, docs: DocTable) -> Self {
        self.docs = docs;
        self
    }

    // -- Overlay --

    /// Replace the session grammar with a document and dispatch by
    /// identifier from now on. Companion formats are merged.
    pub fn load_overlay(&mut self, path: &Path) -> Result<()> {
        let tree = locale::load_grammar(path, &mut self.formats)?;
        self.session.use_overlay(Rc::new(tree));
        log::info!("using grammar overlay {}", path.display());
        Ok(())
    }

    /// Load the overlay named by the configured environment variable.
    ///
    /// Returns whether an overlay is active. Failures fall back to the
    /// compiled grammar.
    pub fn load_overlay_from_env(&mut self) -> bool {
        let Ok(path) = std::env::var(&self.config.grammar_env) else {
            return false;
        };
        match self.load_overlay(Path::new(&path)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("cannot load grammar {path}: {e}; using compiled grammar");
                false
            },
        }
    }

    /// Drop the overlay and go back to the compiled grammar.
    pub fn use_compiled(&mut self) {
        self.session.use_compiled(Rc::clone(&self.compiled));
    }

    /// Merge output format overrides from a document.
    pub fn load_formats(&mut self, path: &Path) -> Result<usize> {
        self.formats.load_file(path)
    }

    pub fn formats(&self) -> &FormatOverrides {
        &self.formats
    }

    pub fn formats_mut(&mut self) -> &mut FormatOverrides {
        &mut self.formats
    }

    // -- Dispatch --

    /// Run one interactive line and return the text to show.
    ///
    /// Errors are rendered into the text; nothing here ends the session
    /// except a handler asking to exit.
    pub fn process_line(&mut self, line: &str) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }
        if line == "end" {
            self.exit_all();
            return String::new();
        }
        if line == "exit" && self.session.context.depth() > 0 {
            return self.exit_context();
        }

        let full = self.session.context.full_command(line);
        match self.dispatch(&full) {
            Ok(Outcome::Ran(output)) => into_text(output),
            Ok(Outcome::NoMatch) => {
                if self.is_context_group(line) {
                    self.enter_context(line);
                    String::new()
                } else {
                    format!("Error: {}\n", CliError::UnknownCommand(line.to_string()))
                }
            },
            Err(e) => {
                log::debug!("'{full}' failed: {e}");
                format!("Error: {e}\n")
            },
        }
    }

    /// Run one line the way configuration replay does: no navigation
    /// words, no context entry, and failures returned as errors.
    pub fn execute_command(&mut self, line: &str) -> Result<String> {
        let line = line.trim();
        let full = self.session.context.full_command(line);
        match self.dispatch(&full)? {
            Outcome::Ran(output) => Ok(into_text(output)),
            Outcome::NoMatch => Err(CliError::UnknownCommand(line.to_string())),
        }
    }

    /// Replay a configuration file line by line.
    ///
    /// Blank lines and lines starting with `!` or `#` are skipped. Returns
    /// the number of lines that failed; replay continues past failures.
    pub fn load_config(&mut self, path: &Path) -> Result<usize> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.replay(&source, &path.display().to_string()))
    }

    /// Replay configuration text. `origin` only labels log messages.
    pub fn replay(&mut self, source: &str, origin: &str) -> usize {
        let mut errors = 0;
        for (n, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
                continue;
            }
            match self.execute_command(line) {
                Ok(text) => log::trace!("{origin}:{}: {}", n + 1, text.trim_end()),
                Err(e) => {
                    log::warn!("{origin}:{}: {e}", n + 1);
                    errors += 1;
                },
            }
        }
        log::info!("replayed {origin}: {errors} error(s)");
        errors
    }

    /// Replace every word of `cmd` that has exactly one keyword completion.
    ///
    /// Returns `None` when no word changed.
    pub fn expand_prefixes(&self, cmd: &str) -> Option<String> {
        let mut expanded = String::with_capacity(cmd.len() + 16);
        let mut changed = false;
        for token in cmd.split([' ', '\t']).filter(|t| !t.is_empty()) {
            let attempt = if expanded.is_empty() {
                token.to_string()
            } else {
                format!("{expanded} {token}")
            };
            let items = complete(&self.session.grammar, &attempt);
            let word = match unique_keyword(&items) {
                Some(word) => word,
                None => token,
            };
            if word != token {
                changed = true;
            }
            if !expanded.is_empty() {
                expanded.push(' ');
            }
            expanded.push_str(word);
        }
        changed.then_some(expanded)
    }

    fn dispatch(&mut self, full: &str) -> Result<Outcome> {
        let grammar = Rc::clone(&self.session.grammar);
        let parsed = parse(&grammar, full)?;
        if parsed.matches() {
            return self.invoke(&grammar, &parsed).map(Outcome::Ran);
        }

        let Some(expanded) = self.expand_prefixes(full) else {
            return Ok(Outcome::NoMatch);
        };
        let parsed = parse(&grammar, &expanded)?;
        if !parsed.matches() {
            log::debug!("'{full}' expanded to '{expanded}' still does not match");
            return Ok(Outcome::NoMatch);
        }
        log::debug!("'{full}' expanded to '{expanded}'");
        self.invoke(&grammar, &parsed).map(Outcome::Ran)
    }

    fn invoke(&mut self, grammar: &Node, parsed: &Parse<'_>) -> Result<CommandOutput> {
        let handler = self.session.dispatch.resolve(&self.handlers, parsed)?;
        let mut env = Environment {
            state: &mut self.state,
            context: &self.session.context,
            mode: self.session.mode,
            grammar,
            compiled: &self.compiled,
            outputs: &self.outputs,
            formats: &self.formats,
            docs: &self.docs,
            config: &self.config,
            running: self.running.as_ref(),
        };
        handler(&mut env, parsed).map_err(|e| match e {
            CliError::Handler(_) => e,
            other => CliError::Handler(other.to_string()),
        })
    }

    // -- Contexts --

    fn is_context_group(&self, line: &str) -> bool {
        !line.contains(char::is_whitespace) && self.context_groups.iter().any(|g| g == line)
    }

    pub fn enter_context(&mut self, name: &str) {
        self.session.context.enter(name);
        log::debug!("entered context, prompt now '{}'", self.session.context.prompt());
    }

    /// Leave the innermost context. At the root this returns a notice.
    pub fn exit_context(&mut self) -> String {
        if self.session.context.exit() {
            String::new()
        } else {
            "Already at top level\n".to_string()
        }
    }

    pub fn exit_all(&mut self) {
        self.session.context.exit_all();
    }

    pub fn context_groups(&self) -> &[String] {
        &self.context_groups
    }

    // -- Accessors --

    pub fn prompt(&self) -> &str {
        self.session.context.prompt()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Grammar lines are currently matched against.
    pub fn grammar(&self) -> Rc<Node> {
        Rc::clone(&self.session.grammar)
    }

    pub fn compiled_grammar(&self) -> &Node {
        &self.compiled
    }

    pub fn running_config(&self) -> String {
        self.outputs.dump(&self.state, &self.formats)
    }

    /// Completion candidates for `line` typed at the current context.
    pub fn complete(&self, line: &str) -> Vec<Completion> {
        let full = self.session.context.full_command(line);
        complete(&self.session.grammar, &full)
    }

    /// Shared flag the main loop polls. Clearing it stops the loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_exit(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn unique_keyword(items: &[Completion]) -> Option<&str> {
    if full_count(items) != 1 {
        return None;
    }
    items
        .iter()
        .find(|c| c.kind == CompletionKind::Full)
        .map(|c| c.text.as_str())
}

fn into_text(output: CommandOutput) -> String {
    match output {
        CommandOutput::Text(text) => text,
        CommandOutput::None => String::new(),
    }
}
