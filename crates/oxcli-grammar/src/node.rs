//! Grammar node composition.
//!
//! A grammar is a tree of [`Node`]s. Leaves match single tokens (keywords,
//! bounded integers, patterns); inner nodes compose them into sequences,
//! ordered alternatives and optionals. Every node carries an optional id,
//! a string attribute map and an opaque binding owned by the embedder.

use std::collections::BTreeMap;
use std::fmt;

use oxcli_types::error::{CliError, Result};
use regex::Regex;

/// Attribute carrying the display help of a node.
pub const ATTR_HELP: &str = "help";

/// Attribute carrying the stable command identifier of a node.
pub const ATTR_CALLBACK: &str = "callback";

/// A whole-token regular expression.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`, anchored so it must match an entire token.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written, without anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, token: &str) -> bool {
        self.regex.is_match(token)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// The matching behaviour of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Literal keyword.
    Str(String),
    /// Base-10 integer within `min..=max`.
    Int { min: i64, max: i64 },
    /// Token matching a pattern.
    Re(Pattern),
    /// Any single token.
    Any,
    /// Children matched one after another.
    Seq(Vec<Node>),
    /// First child that leads to a full match wins.
    Or(Vec<Node>),
    /// Child matched zero or one time.
    Option(Box<Node>),
    /// Command expression: words of `expr` are argument ids or keywords.
    Cmd {
        expr: String,
        args: Vec<Node>,
        seq: Box<Node>,
    },
    /// Splits the input line into tokens before matching the child.
    ShLex(Box<Node>),
}

/// A grammar node.
#[derive(Debug, Clone)]
pub struct Node {
    id: Option<String>,
    kind: NodeKind,
    attrs: BTreeMap<String, String>,
    binding: Option<usize>,
}

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            attrs: BTreeMap::new(),
            binding: None,
        }
    }

    /// Literal keyword leaf.
    pub fn keyword(word: &str) -> Self {
        Self::from_kind(NodeKind::Str(word.to_string()))
    }

    /// Integer leaf accepting `min..=max`.
    pub fn int(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(CliError::Grammar(format!("int bounds {min} > {max}")));
        }
        Ok(Self::from_kind(NodeKind::Int { min, max }))
    }

    /// Pattern leaf.
    pub fn pattern(source: &str) -> Result<Self> {
        Ok(Self::from_kind(NodeKind::Re(Pattern::new(source)?)))
    }

    pub fn any() -> Self {
        Self::from_kind(NodeKind::Any)
    }

    pub fn seq(children: Vec<Node>) -> Self {
        Self::from_kind(NodeKind::Seq(children))
    }

    pub fn or(children: Vec<Node>) -> Self {
        Self::from_kind(NodeKind::Or(children))
    }

    pub fn option(child: Node) -> Self {
        Self::from_kind(NodeKind::Option(Box::new(child)))
    }

    pub fn sh_lex(child: Node) -> Self {
        Self::from_kind(NodeKind::ShLex(Box::new(child)))
    }

    /// Command expression node.
    ///
    /// Each whitespace-separated word of `expr` is replaced by the argument
    /// whose id matches it, or becomes a literal keyword. Every argument
    /// must have an id and be referenced by the expression.
    pub fn cmd(expr: &str, args: Vec<Node>) -> Result<Self> {
        let words: Vec<&str> = expr.split_whitespace().collect();
        if words.is_empty() {
            return Err(CliError::Grammar("empty command expression".to_string()));
        }
        for arg in &args {
            let Some(id) = arg.id() else {
                return Err(CliError::Grammar(format!(
                    "argument without id in '{expr}'"
                )));
            };
            if !words.contains(&id) {
                return Err(CliError::Grammar(format!(
                    "argument '{id}' not used in '{expr}'"
                )));
            }
        }
        let seq = words
            .iter()
            .map(|word| {
                args.iter()
                    .find(|a| a.id() == Some(*word))
                    .cloned()
                    .unwrap_or_else(|| Node::keyword(word))
            })
            .collect();
        Ok(Self::from_kind(NodeKind::Cmd {
            expr: words.join(" "),
            args,
            seq: Box::new(Node::seq(seq)),
        }))
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_help(self, help: &str) -> Self {
        self.with_attr(ATTR_HELP, help)
    }

    /// Attach an opaque value the embedding application resolves later.
    pub fn with_binding(mut self, binding: usize) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        self.attrs.insert(key.to_string(), value.to_string());
    }

    /// Append a child to a `seq` or `or` node.
    pub fn push_child(&mut self, child: Node) -> Result<()> {
        match &mut self.kind {
            NodeKind::Seq(children) | NodeKind::Or(children) => {
                children.push(child);
                Ok(())
            },
            _ => Err(CliError::Grammar(format!(
                "cannot add a child to a {} node",
                self.type_name()
            ))),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn help(&self) -> Option<&str> {
        self.attr(ATTR_HELP)
    }

    pub fn binding(&self) -> Option<usize> {
        self.binding
    }

    /// Structural children. A `cmd` node exposes its arguments.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Seq(children) | NodeKind::Or(children) => children,
            NodeKind::Cmd { args, .. } => args,
            NodeKind::Option(child) | NodeKind::ShLex(child) => std::slice::from_ref(&**child),
            NodeKind::Str(_) | NodeKind::Int { .. } | NodeKind::Re(_) | NodeKind::Any => &[],
        }
    }

    /// Document type name of this node.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Str(_) => "str",
            NodeKind::Int { .. } => "int",
            NodeKind::Re(_) => "re",
            NodeKind::Any => "any",
            NodeKind::Seq(_) => "seq",
            NodeKind::Or(_) => "or",
            NodeKind::Option(_) => "option",
            NodeKind::Cmd { .. } => "cmd",
            NodeKind::ShLex(_) => "sh_lex",
        }
    }

    /// Unwrap a tokenizing wrapper, if any.
    pub fn unwrap_lex(&self) -> &Node {
        match &self.kind {
            NodeKind::ShLex(child) => child,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_with_attrs() {
        let n = Node::keyword("show").with_id("kw").with_help("display state");
        assert_eq!(n.id(), Some("kw"));
        assert_eq!(n.help(), Some("display state"));
        assert_eq!(n.type_name(), "str");
        assert!(n.children().is_empty());
    }

    #[test]
    fn int_rejects_inverted_bounds() {
        assert!(Node::int(10, 1).is_err());
        assert!(Node::int(1, 1).is_ok());
    }

    #[test]
    fn pattern_is_anchored() {
        let p = Pattern::new("[0-9]+").unwrap();
        assert!(p.is_match("42"));
        assert!(!p.is_match("42a"));
        assert!(!p.is_match("a42"));
        assert_eq!(p.as_str(), "[0-9]+");
    }

    #[test]
    fn bad_pattern_is_error() {
        assert!(matches!(Node::pattern("(oops"), Err(CliError::Regex(_))));
    }

    #[test]
    fn push_child_only_on_containers() {
        let mut root = Node::or(vec![]);
        root.push_child(Node::keyword("a")).unwrap();
        assert_eq!(root.children().len(), 1);

        let mut leaf = Node::keyword("a");
        assert!(leaf.push_child(Node::keyword("b")).is_err());
    }

    #[test]
    fn cmd_builds_sequence_from_expression() {
        let arg = Node::pattern("[a-z]+").unwrap().with_id("value");
        let cmd = Node::cmd("name  value", vec![arg]).unwrap();
        let NodeKind::Cmd { expr, seq, args } = cmd.kind() else {
            panic!("expected cmd");
        };
        assert_eq!(expr, "name value");
        assert_eq!(args.len(), 1);
        assert_eq!(seq.children().len(), 2);
        assert_eq!(seq.children()[0].type_name(), "str");
        assert_eq!(seq.children()[1].id(), Some("value"));
    }

    #[test]
    fn cmd_rejects_unused_argument() {
        let arg = Node::any().with_id("extra");
        assert!(Node::cmd("name", vec![arg]).is_err());
    }

    #[test]
    fn cmd_rejects_anonymous_argument() {
        assert!(Node::cmd("name", vec![Node::any()]).is_err());
    }

    #[test]
    fn cmd_rejects_empty_expression() {
        assert!(Node::cmd("   ", vec![]).is_err());
    }

    #[test]
    fn unwrap_lex_strips_wrapper() {
        let tree = Node::sh_lex(Node::or(vec![]).with_id("root"));
        assert_eq!(tree.unwrap_lex().id(), Some("root"));
        let bare = Node::keyword("x");
        assert_eq!(bare.unwrap_lex().type_name(), "str");
    }

    #[test]
    fn binding_is_opaque() {
        let n = Node::keyword("x").with_binding(7);
        assert_eq!(n.binding(), Some(7));
        assert_eq!(Node::keyword("y").binding(), None);
    }
}
