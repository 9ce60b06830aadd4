//! Command documentation: help listing, syntax strings, and `show doc`
//! rendering to the terminal or to Markdown, reStructuredText and plain
//! text files.
//!
//! Long descriptions and examples live in an optional [`DocTable`]. A
//! command without an entry still gets its syntax and one-line help,
//! which are read from the grammar.

use oxcli_grammar::{ATTR_CALLBACK, Node, NodeKind};

/// Extended documentation of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocEntry {
    pub identifier: &'static str,
    pub description: Option<&'static str>,
    /// One example per line.
    pub examples: Option<&'static str>,
}

/// Optional identifier-keyed documentation.
#[derive(Debug, Clone, Default)]
pub struct DocTable {
    entries: Vec<DocEntry>,
}

impl DocTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_static(entries: &[DocEntry]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Add an entry. A later entry for the same identifier wins.
    pub fn add(&mut self, entry: DocEntry) {
        self.entries.retain(|e| e.identifier != entry.identifier);
        self.entries.push(entry);
    }

    pub fn lookup(&self, identifier: &str) -> Option<&DocEntry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output format of `show doc ... file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocFormat {
    #[default]
    Markdown,
    Rst,
    Text,
}

impl DocFormat {
    /// `md`, `rst` or `txt`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "md" => Some(DocFormat::Markdown),
            "rst" => Some(DocFormat::Rst),
            "txt" => Some(DocFormat::Text),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocFormat::Markdown => "Markdown",
            DocFormat::Rst => "reStructuredText",
            DocFormat::Text => "plain text",
        }
    }
}

// ---------------------------------------------------------------------------
// Grammar walks
// ---------------------------------------------------------------------------

fn leading_keyword(node: &Node) -> Option<&str> {
    match node.children().first().map(Node::kind) {
        Some(NodeKind::Str(word)) => Some(word),
        _ => None,
    }
}

fn joined(prefix: &str, word: &str) -> String {
    if prefix.is_empty() {
        word.to_string()
    } else {
        format!("{prefix} {word}")
    }
}

/// One `  <command> - <help>` line per documented command, in grammar order.
pub fn command_listing(grammar: &Node) -> String {
    let mut out = String::new();
    list_into(grammar, "", &mut out);
    out
}

fn list_into(node: &Node, prefix: &str, out: &mut String) {
    let help = node.help();
    match node.kind() {
        NodeKind::Cmd { expr, .. } => {
            if let Some(help) = help {
                out.push_str(&format!("  {} - {help}\n", joined(prefix, expr)));
            }
        },
        NodeKind::Str(word) => {
            if let Some(help) = help {
                out.push_str(&format!("  {} - {help}\n", joined(prefix, word)));
            }
        },
        NodeKind::Seq(children) => {
            let Some(word) = leading_keyword(node) else {
                for child in children {
                    list_into(child, prefix, out);
                }
                return;
            };
            let path = joined(prefix, word);
            // A tagged sequence is a command even when it holds alternatives.
            let is_group = node.attr(ATTR_CALLBACK).is_none()
                && children[1..]
                    .iter()
                    .any(|c| matches!(c.kind(), NodeKind::Or(_)));
            if let Some(help) = help
                && !is_group
            {
                out.push_str(&format!("  {path} - {help}\n"));
                return;
            }
            for child in &children[1..] {
                list_into(child, &path, out);
            }
        },
        _ => {
            for child in node.children() {
                list_into(child, prefix, out);
            }
        },
    }
}

/// Help attribute of the node tagged with `identifier`.
pub fn command_help<'g>(grammar: &'g Node, identifier: &str) -> Option<&'g str> {
    if grammar.attr(ATTR_CALLBACK) == Some(identifier) {
        return grammar.help();
    }
    grammar
        .children()
        .iter()
        .find_map(|c| command_help(c, identifier))
}

fn find_with_prefix<'g>(
    node: &'g Node,
    identifier: &str,
    prefix: &str,
) -> Option<(&'g Node, String)> {
    if node.attr(ATTR_CALLBACK) == Some(identifier) {
        return Some((node, prefix.to_string()));
    }
    if let NodeKind::Seq(children) = node.kind()
        && let Some(word) = leading_keyword(node)
    {
        let path = joined(prefix, word);
        if let Some(found) = children[1..]
            .iter()
            .find_map(|c| find_with_prefix(c, identifier, &path))
        {
            return Some(found);
        }
    }
    node.children()
        .iter()
        .find_map(|c| find_with_prefix(c, identifier, prefix))
}

/// Usage string of the command tagged with `identifier`, including the
/// enclosing group keywords, e.g. `set name <value>`.
pub fn command_syntax(grammar: &Node, identifier: &str) -> Option<String> {
    let (node, prefix) = find_with_prefix(grammar, identifier, "")?;
    let mut buf = prefix;
    match node.kind() {
        NodeKind::Cmd { seq, .. } => syntax_into(seq, &mut buf),
        _ => {
            for child in node.children() {
                syntax_into(child, &mut buf);
            }
        },
    }
    if buf.is_empty() { None } else { Some(buf) }
}

fn push_word(buf: &mut String, word: &str) {
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(word);
}

fn strip_space_at(buf: &mut String, at: usize) {
    if buf[at..].starts_with(' ') {
        buf.remove(at);
    }
}

fn syntax_into(node: &Node, buf: &mut String) {
    match node.kind() {
        NodeKind::Str(word) => push_word(buf, word),
        NodeKind::Int { .. } | NodeKind::Re(_) | NodeKind::Any => {
            let name = node.id().or(node.help()).unwrap_or(node.type_name());
            push_word(buf, &format!("<{name}>"));
        },
        NodeKind::Option(child) => {
            push_word(buf, "[");
            let inner = buf.len();
            syntax_into(child, buf);
            strip_space_at(buf, inner);
            buf.push(']');
        },
        NodeKind::Or(children) if children.len() > 1 => {
            push_word(buf, "(");
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    buf.push('|');
                }
                let start = buf.len();
                syntax_into(child, buf);
                strip_space_at(buf, start);
            }
            buf.push(')');
        },
        NodeKind::Cmd { seq, .. } => syntax_into(seq, buf),
        _ => {
            for child in node.children() {
                syntax_into(child, buf);
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// `show doc <identifier>` terminal text.
pub fn render_terminal(grammar: &Node, docs: &DocTable, identifier: &str) -> String {
    let syntax = command_syntax(grammar, identifier);
    let help = command_help(grammar, identifier);

    let mut out = String::from("\nSyntax:\n");
    out.push_str(&format!("    {}\n\n", syntax.as_deref().unwrap_or(identifier)));
    if let Some(help) = help {
        out.push_str(&format!("    {help}\n\n"));
    }
    match docs.lookup(identifier) {
        Some(entry) => {
            if let Some(desc) = entry.description {
                out.push_str(&format!("Description:\n    {desc}\n\n"));
            }
            if let Some(examples) = entry.examples {
                out.push_str("Examples:\n");
                for line in examples.lines() {
                    out.push_str(&format!("    {line}\n"));
                }
                out.push('\n');
            }
        },
        None => out.push_str("  (no extended documentation available)\n\n"),
    }
    out
}

fn underline(title: &str, ch: char) -> String {
    format!("{title}\n{}\n\n", ch.to_string().repeat(title.chars().count()))
}

/// Documentation file contents for `identifier` in `format`.
pub fn render_file(
    grammar: &Node,
    docs: &DocTable,
    identifier: &str,
    format: DocFormat,
) -> String {
    let syntax = command_syntax(grammar, identifier);
    let help = command_help(grammar, identifier);
    let entry = docs.lookup(identifier);
    let description = entry.and_then(|e| e.description);
    let examples = entry.and_then(|e| e.examples);

    let mut out = String::new();
    match format {
        DocFormat::Markdown => {
            out.push_str(&format!("# {identifier}\n\n"));
            if let Some(s) = &syntax {
                out.push_str(&format!("## Syntax\n\n```\n{s}\n```\n\n"));
            }
            if let Some(h) = help {
                out.push_str(&format!("## Summary\n\n{h}\n\n"));
            }
            if let Some(d) = description {
                out.push_str(&format!("## Description\n\n{d}\n\n"));
            }
            if let Some(e) = examples {
                out.push_str(&format!("## Examples\n\n```\n{e}```\n\n"));
            }
        },
        DocFormat::Rst => {
            out.push_str(&underline(identifier, '='));
            if let Some(s) = &syntax {
                out.push_str(&format!("Syntax\n------\n\n::\n\n    {s}\n\n"));
            }
            if let Some(h) = help {
                out.push_str(&format!("Summary\n-------\n\n{h}\n\n"));
            }
            if let Some(d) = description {
                out.push_str(&format!("Description\n-----------\n\n{d}\n\n"));
            }
            if let Some(e) = examples {
                out.push_str(&format!("Examples\n--------\n\n::\n\n    {e}\n"));
            }
        },
        DocFormat::Text => {
            out.push_str(&underline(identifier, '-'));
            if let Some(s) = &syntax {
                out.push_str(&format!("SYNTAX:\n    {s}\n\n"));
            }
            if let Some(h) = help {
                out.push_str(&format!("SUMMARY:\n    {h}\n\n"));
            }
            if let Some(d) = description {
                out.push_str(&format!("DESCRIPTION:\n    {d}\n\n"));
            }
            if let Some(e) = examples {
                out.push_str(&format!("EXAMPLES:\n    {e}\n"));
            }
        },
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(node: Node, id: &str, help: &str) -> Node {
        node.with_help(help).with_attr(ATTR_CALLBACK, id)
    }

    fn grammar() -> Node {
        let set_name = tagged(
            Node::cmd("name value", vec![Node::any().with_id("value")]).unwrap(),
            "set_name",
            "set the greeting name",
        );
        let set = Node::seq(vec![
            Node::keyword("set").with_help("change settings"),
            Node::or(vec![set_name]),
        ])
        .with_help("change settings");
        let fmt = Node::pattern("(md|rst|txt)").unwrap().with_id("fmt");
        let doc = tagged(
            Node::seq(vec![
                Node::keyword("doc").with_help("document a command"),
                Node::pattern("[a-z_]+").unwrap().with_id("name"),
                Node::option(Node::seq(vec![
                    Node::keyword("file"),
                    Node::pattern("[^ ]+").unwrap().with_id("file"),
                    Node::option(Node::seq(vec![Node::keyword("format"), fmt])),
                ])),
            ]),
            "show_doc",
            "display or export command documentation",
        );
        let show = Node::seq(vec![
            Node::keyword("show").with_help("display information"),
            Node::or(vec![doc]),
        ])
        .with_help("display information");
        let quit = tagged(Node::cmd("quit", vec![]).unwrap(), "quit", "exit the application");
        let mode = tagged(
            Node::seq(vec![
                Node::keyword("mode"),
                Node::or(vec![Node::keyword("on"), Node::keyword("off")]),
            ]),
            "mode",
            "switch mode",
        );
        Node::sh_lex(Node::or(vec![set, show, quit, mode]))
    }

    #[test]
    fn listing_walks_groups() {
        let text = command_listing(&grammar());
        assert_eq!(
            text,
            "  set name value - set the greeting name\n\
             \x20 show doc - display or export command documentation\n\
             \x20 quit - exit the application\n\
             \x20 mode - switch mode\n"
        );
    }

    #[test]
    fn syntax_of_cmd_has_group_prefix() {
        assert_eq!(
            command_syntax(&grammar(), "set_name").as_deref(),
            Some("set name <value>")
        );
        assert_eq!(command_syntax(&grammar(), "quit").as_deref(), Some("quit"));
    }

    #[test]
    fn syntax_of_nested_optionals() {
        assert_eq!(
            command_syntax(&grammar(), "show_doc").as_deref(),
            Some("show doc <name> [file <file> [format <fmt>]]")
        );
    }

    #[test]
    fn syntax_of_alternatives() {
        assert_eq!(
            command_syntax(&grammar(), "mode").as_deref(),
            Some("mode (on|off)")
        );
    }

    #[test]
    fn unknown_identifier() {
        assert_eq!(command_syntax(&grammar(), "nope"), None);
        assert_eq!(command_help(&grammar(), "nope"), None);
    }

    #[test]
    fn terminal_without_entry() {
        let text = render_terminal(&grammar(), &DocTable::new(), "set_name");
        assert_eq!(
            text,
            "\nSyntax:\n    set name <value>\n\n    set the greeting name\n\n  \
             (no extended documentation available)\n\n"
        );
    }

    #[test]
    fn terminal_with_entry() {
        let docs = DocTable::from_static(&[DocEntry {
            identifier: "set_name",
            description: Some("Sets the name used by hello."),
            examples: Some("set name Alice\nset name Bob"),
        }]);
        let text = render_terminal(&grammar(), &docs, "set_name");
        assert!(text.contains("Description:\n    Sets the name used by hello.\n\n"));
        assert!(text.ends_with("Examples:\n    set name Alice\n    set name Bob\n\n"));
    }

    #[test]
    fn terminal_unknown_uses_identifier() {
        let text = render_terminal(&grammar(), &DocTable::new(), "ghost");
        assert!(text.starts_with("\nSyntax:\n    ghost\n\n  (no extended"));
    }

    #[test]
    fn file_formats() {
        let docs = DocTable::from_static(&[DocEntry {
            identifier: "quit",
            description: Some("Leaves."),
            examples: Some("quit\n"),
        }]);
        let g = grammar();
        let md = render_file(&g, &docs, "quit", DocFormat::Markdown);
        assert_eq!(
            md,
            "# quit\n\n## Syntax\n\n```\nquit\n```\n\n## Summary\n\nexit the application\n\n\
             ## Description\n\nLeaves.\n\n## Examples\n\n```\nquit\n```\n\n"
        );
        let rst = render_file(&g, &docs, "quit", DocFormat::Rst);
        assert!(rst.starts_with("quit\n====\n\nSyntax\n------\n\n::\n\n    quit\n\n"));
        let txt = render_file(&g, &docs, "quit", DocFormat::Text);
        assert!(txt.starts_with("quit\n----\n\nSYNTAX:\n    quit\n\nSUMMARY:\n"));
        assert!(txt.contains("DESCRIPTION:\n    Leaves.\n\n"));
    }

    #[test]
    fn format_names() {
        assert_eq!(DocFormat::from_name("rst"), Some(DocFormat::Rst));
        assert_eq!(DocFormat::from_name("pdf"), None);
        assert_eq!(DocFormat::Text.label(), "plain text");
        assert_eq!(DocFormat::default(), DocFormat::Markdown);
    }

    #[test]
    fn table_add_replaces() {
        let mut t = DocTable::new();
        t.add(DocEntry {
            identifier: "a",
            description: Some("one"),
            examples: None,
        });
        t.add(DocEntry {
            identifier: "a",
            description: Some("two"),
            examples: None,
        });
        assert_eq!(t.len(), 1);
        assert_eq!(t.lookup("a").unwrap().description, Some("two"));
        assert!(t.lookup("b").is_none());
    }
}
