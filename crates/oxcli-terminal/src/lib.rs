//! Command interpreter for oxcli.
//!
//! Applications describe their commands as [`CommandDef`]s, queue them on a
//! [`GrammarBuilder`], and hand the builder to [`Cli::new`]. The resulting
//! interpreter tracks a context stack, expands abbreviated words, dispatches
//! to handlers, serializes state as a replayable running configuration, and
//! can swap its grammar for a translated YAML document at startup.

pub mod args;
mod assembly;
mod builtins;
mod command;
mod context;
mod doc;
mod editor;
mod fmt;
mod handlers;
mod interpreter;
mod locale;
mod output;
mod runtime;
mod session;

/// Grammar assembly units and the build result.
pub use assembly::{
    Assembly, GrammarBuilder, PRIO_ATTACH, PRIO_COMMANDS, PRIO_FINALIZE, PRIO_GROUPS, PRIO_ROOT,
    Registry,
};
/// Builtin help, quit, show and write commands.
pub use builtins::register_builtins;
/// Command definitions and the handler calling convention.
pub use command::{Alias, CommandDef, CommandOutput, Environment, Handler, OutputSpec, Syntax};
/// Context frames and prompt derivation.
pub use context::ContextStack;
/// Command documentation tables and renderers.
pub use doc::{
    DocEntry, DocFormat, DocTable, command_help, command_listing, command_syntax, render_file,
    render_terminal,
};
/// Line sources for local sessions.
pub use editor::{LineEditor, ReadResult, RustylineEditor, StreamEditor};
/// `{name}` template substitution.
pub use fmt::{FmtValue, format_template};
/// Handler lookup by slot or identifier.
pub use handlers::{Dispatch, HandlerTable};
/// The interpreter.
pub use interpreter::Cli;
/// Output format overrides and grammar documents.
pub use locale::{
    FormatOverrides, companion_formats_path, export_document, load_grammar, write_grammar,
};
/// Running-configuration serializers.
pub use output::{Emitter, OutputEntry, OutputRegistry};
/// Remote session front end.
pub use runtime::RemoteServer;
/// Per-session mode, context and grammar.
pub use session::{Session, SessionMode};
