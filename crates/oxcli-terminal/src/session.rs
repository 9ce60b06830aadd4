//! Per-user session state.

use std::rc::Rc;

use oxcli_grammar::Node;

use crate::context::ContextStack;
use crate::handlers::Dispatch;

/// Where the session's input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Foreground terminal user.
    Local,
    /// The single TCP client.
    Remote,
}

/// One interactive session: its mode, context stack and active grammar.
#[derive(Debug)]
pub struct Session {
    pub mode: SessionMode,
    pub context: ContextStack,
    pub dispatch: Dispatch,
    /// Grammar lines are matched against. Shared with the line editor.
    pub grammar: Rc<Node>,
}

impl Session {
    pub fn new(mode: SessionMode, prompt: &str, grammar: Rc<Node>) -> Self {
        Self {
            mode,
            context: ContextStack::new(prompt),
            dispatch: Dispatch::Direct,
            grammar,
        }
    }

    pub fn prompt(&self) -> &str {
        self.context.prompt()
    }

    /// Switch to a grammar loaded from a document.
    pub fn use_overlay(&mut self, grammar: Rc<Node>) {
        self.grammar = grammar;
        self.dispatch = Dispatch::ByIdentifier;
    }

    /// Back to the compiled grammar.
    pub fn use_compiled(&mut self, grammar: Rc<Node>) {
        self.grammar = grammar;
        self.dispatch = Dispatch::Direct;
    }

    pub fn is_overlay(&self) -> bool {
        self.dispatch == Dispatch::ByIdentifier
    }
}
