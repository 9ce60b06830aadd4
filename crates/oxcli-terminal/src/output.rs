//! Running-config serialization registry.
//!
//! Stateful commands register an emitter that turns live state back into
//! replayable command text. Entries are kept sorted by priority, ties in
//! registration order, and dumped grouped under `! <group> configuration`
//! markers.

use crate::locale::FormatOverrides;

/// Writes the command text reproducing one piece of state.
///
/// Receives the effective template (a format override or the default) and
/// appends to `out`. Emitters decide themselves whether anything is due;
/// state still at its default usually emits nothing.
pub type Emitter<S> = fn(state: &S, template: &str, out: &mut String);

/// One registered emitter.
pub struct OutputEntry<S> {
    pub identifier: String,
    pub group: String,
    pub template: String,
    pub priority: i32,
    pub emitter: Emitter<S>,
}

impl<S> std::fmt::Debug for OutputEntry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputEntry")
            .field("identifier", &self.identifier)
            .field("group", &self.group)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Ordered emitter registry.
pub struct OutputRegistry<S> {
    entries: Vec<OutputEntry<S>>,
}

impl<S> Default for OutputRegistry<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> OutputRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry after every entry of lower or equal priority.
    ///
    /// An existing entry with the same identifier is dropped first.
    pub fn register(
        &mut self,
        identifier: &str,
        group: &str,
        template: &str,
        emitter: Emitter<S>,
        priority: i32,
    ) {
        if let Some(pos) = self.entries.iter().position(|e| e.identifier == identifier) {
            log::debug!("replacing output entry '{identifier}'");
            self.entries.remove(pos);
        }
        let at = self
            .entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            at,
            OutputEntry {
                identifier: identifier.to_string(),
                group: group.to_string(),
                template: template.to_string(),
                priority,
                emitter,
            },
        );
    }

    pub fn entries(&self) -> &[OutputEntry<S>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default template registered for `identifier`.
    pub fn template(&self, identifier: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| e.template.as_str())
    }

    /// Render the running configuration of `state`.
    pub fn dump(&self, state: &S, formats: &FormatOverrides) -> String {
        let mut out = String::from("! running configuration\n!\n");
        let mut current: Option<&str> = None;
        for entry in &self.entries {
            if current != Some(entry.group.as_str()) {
                if let Some(prev) = current {
                    out.push_str(&format!("! end {prev}\n"));
                }
                out.push_str(&format!("! {} configuration\n", entry.group));
                current = Some(entry.group.as_str());
            }
            let template = formats.get(&entry.identifier).unwrap_or(&entry.template);
            (entry.emitter)(state, template, &mut out);
        }
        if let Some(last) = current {
            out.push_str(&format!("! end {last}\n"));
        }
        out.push_str("!\n! end\n");
        out
    }
}
