//! Deferred, priority-ordered grammar assembly.
//!
//! Commands and groups are contributed from anywhere during startup as
//! units of work tagged with a priority. [`GrammarBuilder::build`] runs
//! every unit once in ascending priority order:
//!
//! | priority | unit                                       |
//! |----------|--------------------------------------------|
//! | 110      | create the root alternative                |
//! | 115      | create empty group alternatives            |
//! | 120      | attach commands to the root or their group |
//! | 125      | attach each group to the root              |
//! | 190      | wrap the root for tokenized parsing        |

use oxcli_grammar::{ATTR_CALLBACK, Node};
use oxcli_types::error::{CliError, Result};

use crate::command::{CommandDef, Syntax};
use crate::handlers::HandlerTable;
use crate::output::OutputRegistry;

pub const PRIO_ROOT: i32 = 110;
pub const PRIO_GROUPS: i32 = 115;
pub const PRIO_COMMANDS: i32 = 120;
pub const PRIO_ATTACH: i32 = 125;
pub const PRIO_FINALIZE: i32 = 190;

type UnitFn<S> = Box<dyn FnOnce(&mut Assembly<S>) -> Result<()>>;

struct Unit<S> {
    priority: i32,
    name: String,
    run: UnitFn<S>,
}

struct PendingGroup {
    keyword: String,
    help: String,
    alternatives: Node,
}

/// Grammar under construction, handed to each unit in turn.
pub struct Assembly<S> {
    root: Option<Node>,
    groups: Vec<PendingGroup>,
    attached: Vec<String>,
    handlers: HandlerTable<S>,
    outputs: OutputRegistry<S>,
    context_groups: Vec<String>,
    grammar: Option<Node>,
}

impl<S> Assembly<S> {
    fn new() -> Self {
        Self {
            root: None,
            groups: Vec::new(),
            attached: Vec::new(),
            handlers: HandlerTable::new(),
            outputs: OutputRegistry::new(),
            context_groups: Vec::new(),
            grammar: None,
        }
    }

    pub fn create_root(&mut self) -> Result<()> {
        if self.root.is_some() || self.grammar.is_some() {
            return Err(CliError::Startup("grammar root already created".to_string()));
        }
        self.root = Some(Node::or(Vec::new()));
        Ok(())
    }

    /// Create an empty group. Every group can also be entered as a context.
    pub fn create_group(&mut self, keyword: &str, help: &str) -> Result<()> {
        let pending = self.groups.iter().any(|g| g.keyword == keyword);
        if pending || self.attached.iter().any(|k| k == keyword) {
            return Err(CliError::Startup(format!("group '{keyword}' defined twice")));
        }
        self.groups.push(PendingGroup {
            keyword: keyword.to_string(),
            help: help.to_string(),
            alternatives: Node::or(Vec::new()),
        });
        self.register_context_group(keyword);
        Ok(())
    }

    pub fn register_context_group(&mut self, keyword: &str) {
        if !self.context_groups.iter().any(|k| k == keyword) {
            self.context_groups.push(keyword.to_string());
        }
    }

    /// Bind the handler, register the emitter and add the command nodes.
    pub fn attach(&mut self, def: CommandDef<S>) -> Result<()> {
        let CommandDef {
            identifier,
            help,
            syntax,
            handler,
            group,
            output,
            aliases,
        } = def;

        let slot = self.handlers.bind(&identifier, handler);
        let tag = |node: Node, help: &str| {
            node.with_help(help)
                .with_attr(ATTR_CALLBACK, &identifier)
                .with_binding(slot)
        };

        let mut nodes = Vec::with_capacity(1 + aliases.len());
        match syntax {
            Syntax::Expr { expr, args } => {
                for alias in &aliases {
                    nodes.push(tag(Node::cmd(&alias.expr, args.clone())?, &alias.help));
                }
                nodes.insert(0, tag(Node::cmd(&expr, args)?, &help));
            },
            Syntax::Node(node) => {
                if !aliases.is_empty() {
                    return Err(CliError::Startup(format!(
                        "command '{identifier}': aliases need an expression syntax"
                    )));
                }
                nodes.push(tag(node, &help));
            },
        }

        let target = match &group {
            Some(keyword) => match self.groups.iter_mut().find(|g| &g.keyword == keyword) {
                Some(g) => &mut g.alternatives,
                None => {
                    return Err(CliError::Startup(format!(
                        "command '{identifier}': group '{keyword}' is not open"
                    )));
                },
            },
            None => self
                .root
                .as_mut()
                .ok_or_else(|| CliError::Startup("grammar root not created".to_string()))?,
        };
        for node in nodes {
            target.push_child(node)?;
        }

        if let Some(entry) = output {
            self.outputs.register(
                &identifier,
                &entry.group,
                &entry.template,
                entry.emitter,
                entry.priority,
            );
        }
        log::trace!("attached command '{identifier}'");
        Ok(())
    }

    /// Add `keyword <group alternatives>` to the root.
    pub fn attach_group(&mut self, keyword: &str) -> Result<()> {
        let Some(pos) = self.groups.iter().position(|g| g.keyword == keyword) else {
            return Err(CliError::Startup(format!("group '{keyword}' was never created")));
        };
        let group = self.groups.remove(pos);
        let root = self
            .root
            .as_mut()
            .ok_or_else(|| CliError::Startup("grammar root not created".to_string()))?;
        let seq = Node::seq(vec![
            Node::keyword(&group.keyword).with_help(&group.help),
            group.alternatives,
        ])
        .with_help(&group.help);
        root.push_child(seq)?;
        self.attached.push(group.keyword);
        Ok(())
    }

    /// Wrap the root for tokenized parsing. No unit may add nodes after this.
    pub fn finalize(&mut self) -> Result<()> {
        let root = self
            .root
            .take()
            .ok_or_else(|| CliError::Startup("grammar root not created".to_string()))?;
        for pending in &self.groups {
            log::warn!("group '{}' was never attached to the root", pending.keyword);
        }
        self.grammar = Some(Node::sh_lex(root));
        Ok(())
    }
}

/// Finished grammar and the registries built alongside it.
pub struct Registry<S> {
    /// Root wrapped for tokenized parsing.
    pub grammar: Node,
    pub handlers: HandlerTable<S>,
    pub outputs: OutputRegistry<S>,
    pub context_groups: Vec<String>,
}

/// Collects units of grammar work until [`GrammarBuilder::build`].
pub struct GrammarBuilder<S> {
    units: Vec<Unit<S>>,
    built: bool,
}

impl<S: 'static> Default for GrammarBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> GrammarBuilder<S> {
    /// A builder holding only the root and finalize units.
    pub fn new() -> Self {
        let mut builder = Self {
            units: Vec::new(),
            built: false,
        };
        builder.add_unit(PRIO_ROOT, "root", Assembly::create_root);
        builder.add_unit(PRIO_FINALIZE, "finalize", Assembly::finalize);
        builder
    }

    /// Queue an arbitrary unit. Units of equal priority run in the order added.
    pub fn add_unit(
        &mut self,
        priority: i32,
        name: &str,
        run: impl FnOnce(&mut Assembly<S>) -> Result<()> + 'static,
    ) -> &mut Self {
        self.units.push(Unit {
            priority,
            name: name.to_string(),
            run: Box::new(run),
        });
        self
    }

    /// Declare a command group such as `show` or `set`.
    pub fn group(&mut self, keyword: &str, help: &str) -> &mut Self {
        let kw = keyword.to_string();
        let help = help.to_string();
        self.add_unit(PRIO_GROUPS, &format!("group {keyword}"), move |a| {
            a.create_group(&kw, &help)
        });
        let kw = keyword.to_string();
        self.add_unit(PRIO_ATTACH, &format!("attach {keyword}"), move |a| {
            a.attach_group(&kw)
        })
    }

    pub fn command(&mut self, def: CommandDef<S>) -> &mut Self {
        let name = format!("command {}", def.identifier());
        self.add_unit(PRIO_COMMANDS, &name, move |a| a.attach(def))
    }

    /// Offer a keyword for context entry without creating a group.
    pub fn context_group(&mut self, keyword: &str) -> &mut Self {
        let kw = keyword.to_string();
        self.add_unit(PRIO_GROUPS, &format!("context {keyword}"), move |a| {
            a.register_context_group(&kw);
            Ok(())
        })
    }

    /// Run every queued unit once, in priority order.
    ///
    /// Any unit failure aborts the build. Building twice is an error.
    pub fn build(&mut self) -> Result<Registry<S>> {
        if self.built {
            return Err(CliError::Startup("grammar already built".to_string()));
        }
        self.built = true;

        let mut units = std::mem::take(&mut self.units);
        units.sort_by_key(|u| u.priority);

        let mut assembly = Assembly::new();
        for unit in units {
            log::trace!("grammar unit {} ({})", unit.name, unit.priority);
            (unit.run)(&mut assembly).map_err(|e| match e {
                CliError::Startup(_) => e,
                other => CliError::Startup(format!("{}: {other}", unit.name)),
            })?;
        }

        let Some(grammar) = assembly.grammar else {
            return Err(CliError::Startup("grammar was never finalized".to_string()));
        };
        log::debug!(
            "grammar built: {} handlers, {} output entries",
            assembly.handlers.len(),
            assembly.outputs.len()
        );
        Ok(Registry {
            grammar,
            handlers: assembly.handlers,
            outputs: assembly.outputs,
            context_groups: assembly.context_groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, Environment};
    use oxcli_grammar::{NodeKind, Parse, parse};

    fn noop(_: &mut Environment<'_, ()>, _: &Parse<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::None)
    }

    fn silent(_: &(), _: &str, _: &mut String) {}

    fn sample() -> GrammarBuilder<()> {
        let mut b = GrammarBuilder::new();
        // Commands queued before their group still land inside it.
        b.command(CommandDef::new("show_version", "version", "version", noop).under("show"));
        b.command(CommandDef::new("show_vhosts", "vhosts", "vhosts", noop).under("show"));
        b.command(
            CommandDef::new("set_name", "name value", "set the name", noop)
                .arg(Node::any().with_id("value"))
                .under("set")
                .serialize("greeting", "set name {value}\n", 10, silent),
        );
        b.command(CommandDef::new("hello", "hello", "say hello", noop).alias("hi", "say hi"));
        b.group("show", "display information");
        b.group("set", "change settings");
        b
    }

    #[test]
    fn canonical_syntax_resolves_to_identifier() {
        let reg = sample().build().unwrap();
        for (line, id) in [
            ("show version", "show_version"),
            ("show vhosts", "show_vhosts"),
            ("set name Alice", "set_name"),
            ("hello", "hello"),
            ("hi", "hello"),
        ] {
            let p = parse(&reg.grammar, line).unwrap();
            assert!(p.matches(), "{line}");
            assert_eq!(p.find_attr(ATTR_CALLBACK), Some(id));
            let slot = p.find_binding().unwrap();
            assert!(reg.handlers.by_slot(slot).is_some());
        }
    }

    #[test]
    fn root_is_wrapped_for_tokens() {
        let reg = sample().build().unwrap();
        assert!(matches!(reg.grammar.kind(), NodeKind::ShLex(_)));
    }

    #[test]
    fn groups_become_context_groups() {
        let reg = sample().build().unwrap();
        assert_eq!(reg.context_groups, vec!["show", "set"]);
    }

    #[test]
    fn outputs_registered() {
        let reg = sample().build().unwrap();
        assert_eq!(reg.outputs.template("set_name"), Some("set name {value}\n"));
    }

    #[test]
    fn second_build_rejected() {
        let mut b = sample();
        assert!(b.build().is_ok());
        assert!(matches!(b.build(), Err(CliError::Startup(_))));
    }

    #[test]
    fn unknown_group_is_startup_error() {
        let mut b: GrammarBuilder<()> = GrammarBuilder::new();
        b.command(CommandDef::new("x", "x", "x", noop).under("nowhere"));
        let err = b.build().err().unwrap();
        assert!(matches!(err, CliError::Startup(ref m) if m.contains("nowhere")));
    }

    #[test]
    fn bad_expression_is_startup_error() {
        let mut b: GrammarBuilder<()> = GrammarBuilder::new();
        b.command(CommandDef::new("x", "name", "x", noop).arg(Node::any().with_id("value")));
        assert!(matches!(b.build(), Err(CliError::Startup(_))));
    }

    #[test]
    fn custom_unit_runs_in_priority_order() {
        let mut b: GrammarBuilder<()> = GrammarBuilder::new();
        // Runs after finalize: the root is gone.
        b.add_unit(200, "late", |a| {
            a.attach(CommandDef::new("late", "late", "too late", noop))
        });
        assert!(matches!(b.build(), Err(CliError::Startup(_))));
    }

    #[test]
    fn group_defined_twice() {
        let mut b: GrammarBuilder<()> = GrammarBuilder::new();
        b.group("show", "a").group("show", "b");
        assert!(b.build().is_err());
    }

    #[test]
    fn group_help_on_keyword() {
        let reg = sample().build().unwrap();
        let items = oxcli_grammar::complete(&reg.grammar, "sh");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].help.as_deref(), Some("display information"));
    }
}
