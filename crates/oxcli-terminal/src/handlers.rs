//! Identifier-keyed handler table and the two ways a parse reaches it.

use std::collections::HashMap;

use oxcli_grammar::{ATTR_CALLBACK, Parse};
use oxcli_types::error::{CliError, Result};

use crate::command::Handler;

/// Native handlers addressed by slot or by stable identifier.
///
/// Slots are what the compiled grammar embeds in its nodes; identifiers
/// are what survives in an exported grammar document.
pub struct HandlerTable<S> {
    slots: Vec<Handler<S>>,
    by_name: HashMap<String, usize>,
}

impl<S> Default for HandlerTable<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<S> HandlerTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identifier` to `handler` and return its slot.
    ///
    /// Binding an identifier again replaces the handler in place.
    pub fn bind(&mut self, identifier: &str, handler: Handler<S>) -> usize {
        if let Some(&slot) = self.by_name.get(identifier) {
            log::debug!("rebinding handler '{identifier}'");
            self.slots[slot] = handler;
            return slot;
        }
        let slot = self.slots.len();
        self.slots.push(handler);
        self.by_name.insert(identifier.to_string(), slot);
        slot
    }

    pub fn by_slot(&self, slot: usize) -> Option<Handler<S>> {
        self.slots.get(slot).copied()
    }

    pub fn by_name(&self, identifier: &str) -> Option<Handler<S>> {
        self.by_name.get(identifier).and_then(|&s| self.by_slot(s))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_name.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// How a matched parse is resolved to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Use the slot embedded in the matched grammar node.
    #[default]
    Direct,
    /// Read the command identifier off the match and look it up by name.
    /// Used when the active grammar came from a document.
    ByIdentifier,
}

impl Dispatch {
    pub fn resolve<S>(self, table: &HandlerTable<S>, parse: &Parse<'_>) -> Result<Handler<S>> {
        match self {
            Dispatch::Direct => parse
                .find_binding()
                .and_then(|slot| table.by_slot(slot))
                .ok_or_else(|| CliError::Handler("no handler for command".to_string())),
            Dispatch::ByIdentifier => {
                let Some(identifier) = parse.find_attr(ATTR_CALLBACK) else {
                    return Err(CliError::Handler(
                        "no callback attribute found in parse tree".to_string(),
                    ));
                };
                table.by_name(identifier).ok_or_else(|| {
                    CliError::Handler(format!("no handler registered for callback: {identifier}"))
                })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, Environment};
    use oxcli_grammar::{Node, parse};

    fn first(_: &mut Environment<'_, ()>, _: &Parse<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text("first".into()))
    }

    fn second(_: &mut Environment<'_, ()>, _: &Parse<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text("second".into()))
    }

    #[test]
    fn bind_assigns_sequential_slots() {
        let mut table: HandlerTable<()> = HandlerTable::new();
        assert_eq!(table.bind("a", first), 0);
        assert_eq!(table.bind("b", second), 1);
        assert!(table.contains("a"));
        assert!(table.by_name("c").is_none());
        assert!(table.by_slot(2).is_none());
    }

    #[test]
    fn duplicate_identifier_replaces() {
        let mut table: HandlerTable<()> = HandlerTable::new();
        table.bind("a", first);
        assert_eq!(table.bind("a", second), 0);
        assert_eq!(table.len(), 1);
        let h = table.by_name("a").unwrap();
        assert!(std::ptr::fn_addr_eq(h, second as Handler<()>));
    }

    #[test]
    fn direct_uses_binding() {
        let mut table: HandlerTable<()> = HandlerTable::new();
        table.bind("a", first);
        let slot = table.bind("b", second);
        let tree = Node::sh_lex(Node::keyword("go").with_binding(slot));
        let p = parse(&tree, "go").unwrap();
        let h = Dispatch::Direct.resolve(&table, &p).unwrap();
        assert!(std::ptr::fn_addr_eq(h, second as Handler<()>));
    }

    #[test]
    fn direct_without_binding_fails() {
        let table: HandlerTable<()> = HandlerTable::new();
        let tree = Node::sh_lex(Node::keyword("go"));
        let p = parse(&tree, "go").unwrap();
        let err = Dispatch::Direct.resolve(&table, &p).err().unwrap();
        assert_eq!(err.to_string(), "command failed: no handler for command");
    }

    #[test]
    fn by_identifier_uses_callback_attr() {
        let mut table: HandlerTable<()> = HandlerTable::new();
        table.bind("a", first);
        table.bind("b", second);
        // Translated keyword, stable identifier, no binding.
        let tree = Node::sh_lex(Node::keyword("aller").with_attr(ATTR_CALLBACK, "a"));
        let p = parse(&tree, "aller").unwrap();
        let h = Dispatch::ByIdentifier.resolve(&table, &p).unwrap();
        assert!(std::ptr::fn_addr_eq(h, first as Handler<()>));
    }

    #[test]
    fn by_identifier_errors() {
        let table: HandlerTable<()> = HandlerTable::new();
        let bare = Node::sh_lex(Node::keyword("x"));
        let p = parse(&bare, "x").unwrap();
        let err = Dispatch::ByIdentifier.resolve(&table, &p).err().unwrap();
        assert!(err.to_string().contains("no callback attribute found"));

        let tagged = Node::sh_lex(Node::keyword("x").with_attr(ATTR_CALLBACK, "ghost"));
        let p = parse(&tagged, "x").unwrap();
        let err = Dispatch::ByIdentifier.resolve(&table, &p).err().unwrap();
        assert!(err.to_string().contains("no handler registered for callback: ghost"));
    }
}
