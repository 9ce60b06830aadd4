//! Completion candidates for a partially typed line.

use crate::lexer::tokenize_partial;
use crate::node::{Node, NodeKind};
use crate::parse::derive;

/// How a candidate relates to the word being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// A keyword that completes the word.
    Full,
    /// A typed slot the engine cannot enumerate (integer, pattern, any).
    Unknown,
}

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub kind: CompletionKind,
    /// Full text of the completed word. Empty for [`CompletionKind::Unknown`].
    pub text: String,
    /// Help attribute of the candidate node, if any.
    pub help: Option<String>,
}

/// Candidates for the last word of `line`, de-duplicated, in grammar order.
///
/// A line the tokenizer rejects has no candidates.
pub fn complete(tree: &Node, line: &str) -> Vec<Completion> {
    let tokens = match tree.kind() {
        NodeKind::ShLex(_) => match tokenize_partial(line) {
            Ok(t) => t,
            Err(e) => {
                log::trace!("no completions: {e}");
                return Vec::new();
            },
        },
        _ => vec![line.to_string()],
    };
    let mut out = Vec::new();
    collect(tree, &tokens, 0, &mut out);
    out
}

/// Number of candidates that complete the word to a concrete keyword.
pub fn full_count(items: &[Completion]) -> usize {
    items
        .iter()
        .filter(|c| c.kind == CompletionKind::Full)
        .count()
}

fn push_unique(out: &mut Vec<Completion>, item: Completion) {
    if !out
        .iter()
        .any(|c| c.kind == item.kind && c.text == item.text)
    {
        out.push(item);
    }
}

fn collect(node: &Node, tokens: &[String], pos: usize, out: &mut Vec<Completion>) {
    // The last token is the word being completed; earlier ones are complete.
    let last = tokens.len() - 1;
    if pos > last {
        return;
    }
    let help = node.help().map(str::to_string);
    match node.kind() {
        NodeKind::Str(word) => {
            if pos == last && word.starts_with(tokens[last].as_str()) {
                push_unique(
                    out,
                    Completion {
                        kind: CompletionKind::Full,
                        text: word.clone(),
                        help,
                    },
                );
            }
        },
        NodeKind::Int { .. } | NodeKind::Re(_) | NodeKind::Any => {
            if pos == last {
                push_unique(
                    out,
                    Completion {
                        kind: CompletionKind::Unknown,
                        text: String::new(),
                        help,
                    },
                );
            }
        },
        NodeKind::Seq(children) => {
            let done = &tokens[..last];
            let mut positions = vec![pos];
            for child in children {
                let mut next = Vec::new();
                for &at in &positions {
                    collect(child, tokens, at, out);
                    for d in derive(child, done, at) {
                        let end = d.span().end;
                        if !next.contains(&end) {
                            next.push(end);
                        }
                    }
                }
                if next.is_empty() {
                    break;
                }
                positions = next;
            }
        },
        NodeKind::Or(children) => {
            for child in children {
                collect(child, tokens, pos, out);
            }
        },
        NodeKind::Option(child) | NodeKind::ShLex(child) => collect(child, tokens, pos, out),
        NodeKind::Cmd { seq, .. } => collect(seq, tokens, pos, out),
    }
}
