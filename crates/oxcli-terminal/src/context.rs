//! Nested configuration contexts.
//!
//! Entering a context pushes a keyword frame. Every later line is then
//! prefixed with the frame keywords before it reaches the grammar, so a
//! single flat grammar serves any nesting depth.

/// Stack of entered context keywords and the prompt derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStack {
    base_prompt: String,
    frames: Vec<String>,
    prompt: String,
}

impl ContextStack {
    pub fn new(base_prompt: &str) -> Self {
        Self {
            base_prompt: base_prompt.to_string(),
            frames: Vec::new(),
            prompt: base_prompt.to_string(),
        }
    }

    /// Push a frame and recompute the prompt.
    pub fn enter(&mut self, name: &str) {
        self.frames.push(name.to_string());
        self.refresh();
    }

    /// Pop the innermost frame. Returns `false` at the root.
    pub fn exit(&mut self) -> bool {
        if self.frames.pop().is_none() {
            return false;
        }
        self.refresh();
        true
    }

    /// Return to the root context.
    pub fn exit_all(&mut self) {
        self.frames.clear();
        self.refresh();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    /// Prefix `line` with every frame keyword, outermost first.
    pub fn full_command(&self, line: &str) -> String {
        if self.frames.is_empty() {
            return line.to_string();
        }
        let mut out = String::with_capacity(line.len() + 16 * self.frames.len());
        for frame in &self.frames {
            out.push_str(frame);
            out.push(' ');
        }
        out.push_str(line);
        out
    }

    fn refresh(&mut self) {
        if self.frames.is_empty() {
            self.prompt = self.base_prompt.clone();
            return;
        }
        let stem = strip_mode_indicator(&self.base_prompt);
        self.prompt = format!("{stem}({})> ", self.frames.join("-"));
    }
}

/// Remove a trailing `"> "`, `"# "`, `">"` or `"#"` from a prompt.
fn strip_mode_indicator(prompt: &str) -> &str {
    let bytes = prompt.as_bytes();
    let n = bytes.len();
    if n >= 2 && matches!(bytes[n - 2], b'>' | b'#') {
        return &prompt[..n - 2];
    }
    if n >= 1 && matches!(bytes[n - 1], b'>' | b'#') {
        return &prompt[..n - 1];
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_prompt_is_base() {
        let ctx = ContextStack::new("app> ");
        assert_eq!(ctx.prompt(), "app> ");
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn nested_prompt_joins_frames() {
        let mut ctx = ContextStack::new("app> ");
        ctx.enter("interface");
        assert_eq!(ctx.prompt(), "app(interface)> ");
        ctx.enter("eth0");
        assert_eq!(ctx.prompt(), "app(interface-eth0)> ");
        ctx.exit_all();
        assert_eq!(ctx.prompt(), "app> ");
    }

    #[test]
    fn exit_pops_one_frame() {
        let mut ctx = ContextStack::new("router# ");
        ctx.enter("set");
        ctx.enter("vlan");
        assert!(ctx.exit());
        assert_eq!(ctx.prompt(), "router(set)> ");
        assert!(ctx.exit());
        assert_eq!(ctx.prompt(), "router# ");
        assert!(!ctx.exit());
    }

    #[test]
    fn mode_indicator_variants() {
        assert_eq!(strip_mode_indicator("app> "), "app");
        assert_eq!(strip_mode_indicator("app# "), "app");
        assert_eq!(strip_mode_indicator("app>"), "app");
        assert_eq!(strip_mode_indicator("app#"), "app");
        assert_eq!(strip_mode_indicator("app: "), "app: ");
        assert_eq!(strip_mode_indicator(""), "");
    }

    #[test]
    fn full_command_prefixes_frames() {
        let mut ctx = ContextStack::new("app> ");
        assert_eq!(ctx.full_command("name Alice"), "name Alice");
        ctx.enter("set");
        assert_eq!(ctx.full_command("name Alice"), "set name Alice");
        ctx.enter("x");
        assert_eq!(ctx.full_command("y"), "set x y");
    }
}
