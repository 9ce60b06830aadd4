//! Error types for oxcli.

use std::io;

/// Errors produced by the oxcli framework.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Grammar or listener construction failed; aborts initialization.
    #[error("startup failure: {0}")]
    Startup(String),

    /// The tokenizer rejected the input line outright.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A command handler reported failure.
    #[error("command failed: {0}")]
    Handler(String),

    /// Malformed grammar or format-override document.
    #[error("document error: {0}")]
    Document(String),

    #[error("config error: {0}")]
    Config(String),

    /// Invalid grammar node construction (bad bounds, unknown id, ...).
    #[error("grammar error: {0}")]
    Grammar(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_display() {
        let e = CliError::Startup("root node".into());
        assert_eq!(format!("{e}"), "startup failure: root node");
    }

    #[test]
    fn parse_error_display() {
        let e = CliError::Parse("unterminated double quote".into());
        assert_eq!(format!("{e}"), "parse error: unterminated double quote");
    }

    #[test]
    fn unknown_command_display() {
        let e = CliError::UnknownCommand("frobnicate".into());
        assert_eq!(format!("{e}"), "unknown command: frobnicate");
    }

    #[test]
    fn handler_error_display() {
        let e = CliError::Handler("bad address".into());
        assert_eq!(format!("{e}"), "command failed: bad address");
    }

    #[test]
    fn document_error_display() {
        let e = CliError::Document("missing type".into());
        assert_eq!(format!("{e}"), "document error: missing type");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: CliError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: CliError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn yaml_error_from_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [unclosed").unwrap_err();
        let e: CliError = yaml_err.into();
        assert!(format!("{e}").contains("YAML error"));
    }

    #[test]
    fn regex_error_from_conversion() {
        let re_err = regex::Regex::new("(unclosed").unwrap_err();
        let e: CliError = re_err.into();
        assert!(format!("{e}").contains("regex error"));
    }

    #[test]
    fn error_is_debug() {
        let e = CliError::Grammar("test".into());
        assert!(format!("{e:?}").contains("Grammar"));
    }
}
