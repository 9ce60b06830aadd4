//! YAML import and export of grammar trees.
//!
//! Each node is a mapping with a `type` key plus the fields its kind needs:
//!
//! ```yaml
//! type: cmd
//! expr: name value
//! attrs:
//!   help: set the greeting name
//!   callback: set_name
//! children:
//!   - type: re
//!     id: value
//!     pattern: "[a-zA-Z]+"
//! ```
//!
//! Embedder bindings are never written; an imported tree has none.

use std::collections::BTreeMap;

use oxcli_types::error::{CliError, Result};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeKind};

#[derive(Debug, Serialize, Deserialize)]
struct NodeDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    child: Option<Box<NodeDoc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeDoc>,
}

impl NodeDoc {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
            attrs: BTreeMap::new(),
            string: None,
            min: None,
            max: None,
            pattern: None,
            expr: None,
            child: None,
            children: Vec::new(),
        }
    }
}

/// Serialize a tree to a YAML document.
pub fn to_yaml(tree: &Node) -> Result<String> {
    Ok(serde_yaml::to_string(&to_doc(tree))?)
}

/// Rebuild a tree from a YAML document.
pub fn from_yaml(source: &str) -> Result<Node> {
    let doc: NodeDoc = serde_yaml::from_str(source)?;
    from_doc(doc)
}

fn to_doc(node: &Node) -> NodeDoc {
    let mut doc = NodeDoc::new(node.type_name());
    doc.id = node.id().map(str::to_string);
    doc.attrs = node.attrs().clone();
    match node.kind() {
        NodeKind::Str(word) => doc.string = Some(word.clone()),
        NodeKind::Int { min, max } => {
            doc.min = Some(*min);
            doc.max = Some(*max);
        },
        NodeKind::Re(pattern) => doc.pattern = Some(pattern.as_str().to_string()),
        NodeKind::Any => {},
        NodeKind::Seq(children) | NodeKind::Or(children) => {
            doc.children = children.iter().map(to_doc).collect();
        },
        NodeKind::Option(child) | NodeKind::ShLex(child) => {
            doc.child = Some(Box::new(to_doc(child)));
        },
        NodeKind::Cmd { expr, args, .. } => {
            doc.expr = Some(expr.clone());
            doc.children = args.iter().map(to_doc).collect();
        },
    }
    doc
}

fn required<T>(value: Option<T>, kind: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| CliError::Document(format!("{kind} node requires '{field}'")))
}

fn from_doc(doc: NodeDoc) -> Result<Node> {
    let NodeDoc {
        kind,
        id,
        attrs,
        string,
        min,
        max,
        pattern,
        expr,
        child,
        children,
    } = doc;

    let convert = |docs: Vec<NodeDoc>| docs.into_iter().map(from_doc).collect::<Result<Vec<_>>>();

    let mut node = match kind.as_str() {
        "str" => Node::keyword(&required(string, &kind, "string")?),
        "int" => Node::int(min.unwrap_or(i64::MIN), max.unwrap_or(i64::MAX))?,
        "re" => Node::pattern(&required(pattern, &kind, "pattern")?)?,
        "any" => Node::any(),
        "seq" => Node::seq(convert(children)?),
        "or" => Node::or(convert(children)?),
        "option" => Node::option(from_doc(*required(child, &kind, "child")?)?),
        "sh_lex" => Node::sh_lex(from_doc(*required(child, &kind, "child")?)?),
        "cmd" => Node::cmd(&required(expr, &kind, "expr")?, convert(children)?)?,
        other => return Err(CliError::Document(format!("unknown node type '{other}'"))),
    };
    if let Some(id) = id {
        node = node.with_id(&id);
    }
    for (key, value) in &attrs {
        node.set_attr(key, value);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ATTR_CALLBACK;
    use crate::parse::parse;

    fn sample() -> Node {
        let set_name = Node::cmd("name value", vec![Node::any().with_id("value")])
            .unwrap()
            .with_help("set the name")
            .with_attr(ATTR_CALLBACK, "set_name")
            .with_binding(3);
        let vlan = Node::cmd("vlan id", vec![Node::int(1, 4094).unwrap().with_id("id")])
            .unwrap()
            .with_attr(ATTR_CALLBACK, "set_vlan");
        let set = Node::seq(vec![Node::keyword("set"), Node::or(vec![set_name, vlan])]);
        Node::or(vec![set, Node::option(Node::pattern("[a-z]+").unwrap())])
    }

    #[test]
    fn export_then_import_keeps_behaviour() {
        let yaml = to_yaml(&sample()).unwrap();
        assert!(yaml.contains("callback: set_name"));
        assert!(yaml.contains("expr: name value"));

        let tree = Node::sh_lex(from_yaml(&yaml).unwrap());
        let p = parse(&tree, "set name Alice").unwrap();
        assert!(p.matches());
        assert_eq!(p.find_attr(ATTR_CALLBACK), Some("set_name"));
        assert_eq!(p.get_str("value"), Some("Alice"));
        // Bindings do not survive a document.
        assert_eq!(p.find_binding(), None);

        assert!(parse(&tree, "set vlan 10").unwrap().matches());
        assert!(!parse(&tree, "set vlan 5000").unwrap().matches());
    }

    #[test]
    fn translated_keywords_keep_identifier() {
        let yaml = r#"
type: or
children:
  - type: seq
    children:
      - type: str
        string: definir
      - type: cmd
        expr: nom value
        attrs:
          callback: set_name
          help: definir le nom
        children:
          - type: any
            id: value
"#;
        let tree = Node::sh_lex(from_yaml(yaml).unwrap());
        let p = parse(&tree, "definir nom Alice").unwrap();
        assert!(p.matches());
        assert_eq!(p.find_attr(ATTR_CALLBACK), Some("set_name"));
    }

    #[test]
    fn unknown_type_is_document_error() {
        let err = from_yaml("type: bogus\n").unwrap_err();
        assert!(matches!(err, CliError::Document(_)));
    }

    #[test]
    fn missing_field_is_document_error() {
        assert!(matches!(from_yaml("type: str\n"), Err(CliError::Document(_))));
        assert!(matches!(from_yaml("type: option\n"), Err(CliError::Document(_))));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        assert!(matches!(from_yaml("type: [unclosed"), Err(CliError::Yaml(_))));
    }
}
