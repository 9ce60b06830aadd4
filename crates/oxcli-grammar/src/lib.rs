//! Grammar engine for oxcli.
//!
//! Builds command grammars out of composable nodes, matches tokenized
//! lines against them, proposes completions for partially typed words,
//! and moves trees in and out of YAML documents.

mod complete;
mod lexer;
mod node;
mod parse;
mod yaml;

/// Completion candidates for a partial line.
pub use complete::{Completion, CompletionKind, complete, full_count};
/// Shell-like tokenizer.
pub use lexer::{tokenize, tokenize_partial};
/// Grammar nodes and well-known attribute keys.
pub use node::{ATTR_CALLBACK, ATTR_HELP, Node, NodeKind, Pattern};
/// Parse results and the parse entry point.
pub use parse::{Parse, ParseNode, parse};
/// YAML document conversion.
pub use yaml::{from_yaml, to_yaml};
