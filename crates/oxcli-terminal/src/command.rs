//! Command definitions, handler signature, and the environment handlers see.

use std::sync::atomic::{AtomicBool, Ordering};

use oxcli_grammar::{Node, Parse};
use oxcli_types::CliConfig;
use oxcli_types::error::Result;

use crate::context::ContextStack;
use crate::doc::DocTable;
use crate::locale::FormatOverrides;
use crate::output::{Emitter, OutputRegistry};
use crate::session::SessionMode;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Text written to the session as-is.
    Text(String),
    /// Command produced no visible output.
    None,
}

/// Native command handler.
pub type Handler<S> = fn(&mut Environment<'_, S>, &Parse<'_>) -> Result<CommandOutput>;

/// Everything a handler may touch while it runs.
pub struct Environment<'a, S> {
    /// Application state.
    pub state: &'a mut S,
    pub context: &'a ContextStack,
    pub mode: SessionMode,
    /// Grammar the line was matched against (possibly a loaded overlay).
    pub grammar: &'a Node,
    /// Grammar compiled into the program, before any overlay.
    pub compiled: &'a Node,
    pub outputs: &'a OutputRegistry<S>,
    pub formats: &'a FormatOverrides,
    pub docs: &'a DocTable,
    pub config: &'a CliConfig,
    pub running: &'a AtomicBool,
}

impl<S> Environment<'_, S> {
    /// Ask the main loop to stop after this line.
    pub fn request_exit(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Running configuration of the current state.
    pub fn running_config(&self) -> String {
        self.outputs.dump(self.state, self.formats)
    }
}

/// How a command's words are written.
#[derive(Debug, Clone)]
pub enum Syntax {
    /// Space-separated expression; words naming an argument id are slots.
    Expr { expr: String, args: Vec<Node> },
    /// A hand-built grammar node.
    Node(Node),
}

/// Serialization data of a stateful command.
pub struct OutputSpec<S> {
    pub group: String,
    pub template: String,
    pub priority: i32,
    pub emitter: Emitter<S>,
}

/// Alternative spelling of a command that runs the same handler.
#[derive(Debug, Clone)]
pub struct Alias {
    pub expr: String,
    pub help: String,
}

/// A command contributed to the grammar.
pub struct CommandDef<S> {
    pub(crate) identifier: String,
    pub(crate) help: String,
    pub(crate) syntax: Syntax,
    pub(crate) handler: Handler<S>,
    pub(crate) group: Option<String>,
    pub(crate) output: Option<OutputSpec<S>>,
    pub(crate) aliases: Vec<Alias>,
}

impl<S> CommandDef<S> {
    /// Command written as an expression such as `"name value"`.
    ///
    /// Argument slots are added with [`CommandDef::arg`].
    pub fn new(identifier: &str, expr: &str, help: &str, handler: Handler<S>) -> Self {
        Self {
            identifier: identifier.to_string(),
            help: help.to_string(),
            syntax: Syntax::Expr {
                expr: expr.to_string(),
                args: Vec::new(),
            },
            handler,
            group: None,
            output: None,
            aliases: Vec::new(),
        }
    }

    /// Command backed by a hand-built node, for optional tails and the like.
    pub fn with_node(identifier: &str, help: &str, node: Node, handler: Handler<S>) -> Self {
        Self {
            identifier: identifier.to_string(),
            help: help.to_string(),
            syntax: Syntax::Node(node),
            handler,
            group: None,
            output: None,
            aliases: Vec::new(),
        }
    }

    /// Add an argument slot. The node's id must appear in the expression.
    pub fn arg(mut self, node: Node) -> Self {
        if let Syntax::Expr { args, .. } = &mut self.syntax {
            args.push(node);
        }
        self
    }

    /// Attach under a group instead of the root.
    pub fn under(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Register a running-config emitter for this command.
    pub fn serialize(
        mut self,
        group: &str,
        template: &str,
        priority: i32,
        emitter: Emitter<S>,
    ) -> Self {
        self.output = Some(OutputSpec {
            group: group.to_string(),
            template: template.to_string(),
            priority,
            emitter,
        });
        self
    }

    /// Add an alternative spelling with its own help text.
    pub fn alias(mut self, expr: &str, help: &str) -> Self {
        self.aliases.push(Alias {
            expr: expr.to_string(),
            help: help.to_string(),
        });
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Environment<'_, ()>, _: &Parse<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::None)
    }

    fn silent(_: &(), _: &str, _: &mut String) {}

    #[test]
    fn builder_collects_parts() {
        let def = CommandDef::new("set_name", "name value", "set the name", noop)
            .arg(Node::any().with_id("value"))
            .under("set")
            .serialize("greeting", "set name {value}\n", 10, silent)
            .alias("nom value", "alias");
        assert_eq!(def.identifier(), "set_name");
        assert_eq!(def.group(), Some("set"));
        assert_eq!(def.help(), "set the name");
        let Syntax::Expr { expr, args } = def.syntax() else {
            panic!("expected expression syntax");
        };
        assert_eq!(expr, "name value");
        assert_eq!(args.len(), 1);
        let out = def.output.as_ref().unwrap();
        assert_eq!(out.priority, 10);
        assert_eq!(def.aliases.len(), 1);
    }

    #[test]
    fn arg_is_ignored_for_node_syntax() {
        let def = CommandDef::with_node("x", "x", Node::keyword("x"), noop).arg(Node::any());
        assert!(matches!(def.syntax(), Syntax::Node(_)));
    }
}
