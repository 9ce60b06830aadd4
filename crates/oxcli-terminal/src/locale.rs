//! Localization overlay: alternate grammar documents and output format
//! overrides.
//!
//! A grammar exported with `write yaml` can be edited (keywords and help
//! translated) and loaded back at startup in place of the compiled one.
//! Handlers are then found through the `callback` attribute each command
//! node keeps, so translated grammars still reach the same native code.
//! A companion `<base>_formats.<ext>` document may override running-config
//! templates per command identifier.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oxcli_grammar::{Node, from_yaml, to_yaml};
use oxcli_types::error::{CliError, Result};
use serde::Deserialize;

/// Replacement running-config templates keyed by command identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOverrides {
    formats: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FormatsDoc {
    #[serde(default)]
    output_formats: Option<HashMap<String, String>>,
}

impl FormatOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the override for `identifier`, replacing any previous one.
    pub fn insert(&mut self, identifier: &str, template: &str) {
        self.formats
            .insert(identifier.to_string(), template.to_string());
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.formats.get(identifier).map(String::as_str)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<String> {
        self.formats.remove(identifier)
    }

    pub fn clear(&mut self) {
        self.formats.clear();
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Merge the `output_formats:` mapping of a YAML document.
    ///
    /// Returns the number of entries read. Other top-level keys are ignored.
    pub fn merge_document(&mut self, source: &str) -> Result<usize> {
        if source.trim().is_empty() {
            return Ok(0);
        }
        let doc: FormatsDoc = serde_yaml::from_str(source)
            .map_err(|e| CliError::Document(format!("output formats: {e}")))?;
        let entries = doc.output_formats.unwrap_or_default();
        let count = entries.len();
        self.formats.extend(entries);
        Ok(count)
    }

    /// Merge overrides from a file. A missing file yields zero entries.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let count = self.merge_document(&source)?;
        log::info!("loaded {count} output formats from {}", path.display());
        Ok(count)
    }
}

/// `dir/base_formats.ext` for a grammar at `dir/base.ext`.
///
/// A path without an extension has no companion.
pub fn companion_formats_path(grammar: &Path) -> Option<PathBuf> {
    let stem = grammar.file_stem()?.to_str()?;
    let ext = grammar.extension()?.to_str()?;
    Some(grammar.with_file_name(format!("{stem}_formats.{ext}")))
}

/// Import a grammar document and its companion formats, if any.
///
/// The returned tree is wrapped for tokenized parsing, like the compiled
/// grammar. A malformed companion document is logged and skipped.
pub fn load_grammar(path: &Path, formats: &mut FormatOverrides) -> Result<Node> {
    let source = std::fs::read_to_string(path)?;
    let root = from_yaml(&source)?;

    if let Some(companion) = companion_formats_path(path)
        && let Err(e) = formats.load_file(&companion)
    {
        log::warn!("ignoring {}: {e}", companion.display());
    }

    log::info!("loaded grammar from {}", path.display());
    Ok(Node::sh_lex(root))
}

/// Annotated YAML document of `grammar`.
///
/// The tokenizing wrapper is not part of the document.
pub fn export_document(grammar: &Node, app_name: &str, grammar_env: &str) -> Result<String> {
    let body = to_yaml(grammar.unwrap_lex())?;
    let mut doc = header(app_name, grammar_env);
    doc.push_str(&body);
    Ok(doc)
}

/// Write the annotated grammar document to `path`.
pub fn write_grammar(
    path: &Path,
    grammar: &Node,
    app_name: &str,
    grammar_env: &str,
) -> Result<()> {
    let doc = export_document(grammar, app_name, grammar_env)?;
    std::fs::write(path, doc)?;
    log::info!("exported grammar to {}", path.display());
    Ok(())
}

fn header(app_name: &str, grammar_env: &str) -> String {
    format!(
        "# {app_name} CLI Grammar Template
#
# This file describes the command grammar in YAML.
# Edit it to provide an alternate (for instance translated) command set.
#
# USAGE:
#   1. Export this template:  write yaml grammar.yaml
#   2. Edit the file to customize command names and help strings
#   3. Set environment: {grammar_env}=translated.yaml
#   4. Restart the application; it will use the translated grammar
#
# TRANSLATION EXAMPLE:
#   To translate the CLI to French:
#     - Change 'string: help' to 'string: aide'
#     - Change 'string: quit' to 'string: quitter'
#     - Change 'string: show' to 'string: afficher'
#     - Translate all 'help:' strings to French
#
# IMPORTANT:
#   - Keep all 'attrs: callback:' values unchanged (they link to native handlers)
#   - Keep 'id:' values unchanged (they are used for argument extraction)
#   - Only modify 'string:', 'help:', and 'pattern:' values
#
# OUTPUT FORMATS:
#   Create a companion file 'grammar_formats.yaml' with:
#     output_formats:
#       switch_add: \"switch add {{name}} ports {{ports}}\\n\"
#   These override the default output for 'write terminal'.
#
# =============================================================================

"
    )
}
