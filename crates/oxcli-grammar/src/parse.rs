//! Matching a line against a grammar tree.

use std::ops::Range;

use oxcli_types::error::Result;

use crate::lexer::tokenize;
use crate::node::{Node, NodeKind};

/// One matched node and the token range it covers.
#[derive(Debug, Clone)]
pub struct ParseNode<'g> {
    node: &'g Node,
    span: Range<usize>,
    children: Vec<ParseNode<'g>>,
}

impl<'g> ParseNode<'g> {
    fn leaf(node: &'g Node, pos: usize) -> Self {
        Self {
            node,
            span: pos..pos + 1,
            children: Vec::new(),
        }
    }

    fn wrap(node: &'g Node, child: ParseNode<'g>) -> Self {
        Self {
            node,
            span: child.span.clone(),
            children: vec![child],
        }
    }

    pub fn node(&self) -> &'g Node {
        self.node
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn children(&self) -> &[ParseNode<'g>] {
        &self.children
    }
}

/// Result of parsing one line.
///
/// A parse can be well-formed and still not match the grammar; check
/// [`Parse::matches`] before reading values.
#[derive(Debug, Clone)]
pub struct Parse<'g> {
    tokens: Vec<String>,
    root: Option<ParseNode<'g>>,
}

impl<'g> Parse<'g> {
    /// Whether some derivation consumed every token.
    pub fn matches(&self) -> bool {
        self.root.is_some()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn root(&self) -> Option<&ParseNode<'g>> {
        self.root.as_ref()
    }

    /// Matched nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &ParseNode<'g>> {
        let mut stack: Vec<&ParseNode<'g>> = self.root.iter().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// First matched node with the given id.
    pub fn find(&self, id: &str) -> Option<&ParseNode<'g>> {
        self.iter().find(|p| p.node.id() == Some(id))
    }

    /// Token matched by the node with the given id.
    pub fn get_str(&self, id: &str) -> Option<&str> {
        let found = self.find(id)?;
        self.tokens.get(found.span.start).map(String::as_str)
    }

    /// Integer matched by the node with the given id.
    pub fn get_int(&self, id: &str) -> Option<i64> {
        self.get_str(id)?.parse().ok()
    }

    /// First attribute value for `key` found in pre-order.
    pub fn find_attr(&self, key: &str) -> Option<&'g str> {
        self.iter().find_map(|p| p.node.attr(key))
    }

    /// First embedder binding found in pre-order.
    pub fn find_binding(&self) -> Option<usize> {
        self.iter().find_map(|p| p.node.binding())
    }
}

/// Parse `line` against `tree`.
///
/// A tokenizing wrapper at the root splits the line into words; any other
/// root sees the whole line as a single token. Fails only when the
/// tokenizer rejects the line.
pub fn parse<'g>(tree: &'g Node, line: &str) -> Result<Parse<'g>> {
    let tokens = match tree.kind() {
        NodeKind::ShLex(_) => tokenize(line)?,
        _ => vec![line.to_string()],
    };
    let root = derive(tree, &tokens, 0)
        .into_iter()
        .find(|d| d.span.end == tokens.len());
    Ok(Parse { tokens, root })
}

/// Every way `node` can match `tokens` starting at `pos`, in preference order.
pub(crate) fn derive<'g>(node: &'g Node, tokens: &[String], pos: usize) -> Vec<ParseNode<'g>> {
    let token = tokens.get(pos).map(String::as_str);
    match node.kind() {
        NodeKind::Str(word) => match token {
            Some(t) if t == word => vec![ParseNode::leaf(node, pos)],
            _ => Vec::new(),
        },
        NodeKind::Int { min, max } => match token.and_then(|t| t.parse::<i64>().ok()) {
            Some(v) if (*min..=*max).contains(&v) => vec![ParseNode::leaf(node, pos)],
            _ => Vec::new(),
        },
        NodeKind::Re(pattern) => match token {
            Some(t) if pattern.is_match(t) => vec![ParseNode::leaf(node, pos)],
            _ => Vec::new(),
        },
        NodeKind::Any => match token {
            Some(_) => vec![ParseNode::leaf(node, pos)],
            None => Vec::new(),
        },
        NodeKind::Seq(children) => {
            let mut partial: Vec<(usize, Vec<ParseNode<'g>>)> = vec![(pos, Vec::new())];
            for child in children {
                let mut next = Vec::new();
                for (at, matched) in &partial {
                    for d in derive(child, tokens, *at) {
                        let end = d.span.end;
                        let mut m = matched.clone();
                        m.push(d);
                        next.push((end, m));
                    }
                }
                if next.is_empty() {
                    return Vec::new();
                }
                partial = next;
            }
            partial
                .into_iter()
                .map(|(end, children)| ParseNode {
                    node,
                    span: pos..end,
                    children,
                })
                .collect()
        },
        NodeKind::Or(children) => children
            .iter()
            .flat_map(|c| derive(c, tokens, pos))
            .map(|d| ParseNode::wrap(node, d))
            .collect(),
        NodeKind::Option(child) => {
            let mut out: Vec<ParseNode<'g>> = derive(child, tokens, pos)
                .into_iter()
                .map(|d| ParseNode::wrap(node, d))
                .collect();
            out.push(ParseNode {
                node,
                span: pos..pos,
                children: Vec::new(),
            });
            out
        },
        NodeKind::Cmd { seq, .. } => derive(seq, tokens, pos)
            .into_iter()
            .map(|d| ParseNode::wrap(node, d))
            .collect(),
        NodeKind::ShLex(child) => derive(child, tokens, pos)
            .into_iter()
            .map(|d| ParseNode::wrap(node, d))
            .collect(),
    }
}
