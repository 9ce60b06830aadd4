//! Commands every CLI gets: help, quit, and the `show` and `write` groups.
//!
//! Applications add their own `show` or `write` subcommands by attaching
//! definitions `.under("show")` or `.under("write")`.

use std::path::Path;

use oxcli_grammar::{Node, Parse};
use oxcli_types::error::{CliError, Result};

use crate::args;
use crate::assembly::GrammarBuilder;
use crate::command::{CommandDef, CommandOutput, Environment};
use crate::doc::{self, DocFormat};
use crate::locale;

const DEFAULT_APP_NAME: &str = "oxcli";

const ID_CMD_NAME: &str = "cmd_name";
const ID_DOC_FILE: &str = "doc_filename";
const ID_DOC_FMT: &str = "doc_format";
const ID_FILENAME: &str = "filename";

/// Queue the builtin groups and commands.
pub fn register_builtins<S: 'static>(builder: &mut GrammarBuilder<S>) -> Result<()> {
    builder
        .group("show", "display information")
        .group("write", "save configuration");

    builder
        .command(
            CommandDef::new("help", "help", "show available commands", help)
                .alias("?", "show available commands (alias for help)"),
        )
        .command(
            CommandDef::new("quit", "quit", "exit the application", quit)
                .alias("exit", "exit the application (alias for quit)"),
        );

    builder
        .command(
            CommandDef::new(
                "show_running_config",
                "running-config",
                "display running configuration",
                show_running_config,
            )
            .under("show"),
        )
        .command(
            CommandDef::new(
                "show_run",
                "run",
                "display running configuration",
                show_running_config,
            )
            .under("show"),
        )
        .command(
            CommandDef::new(
                "show_version",
                "version",
                "display version information",
                show_version,
            )
            .under("show"),
        )
        .command(
            CommandDef::with_node(
                "show_doc",
                "display or export command documentation",
                show_doc_node()?,
                show_doc,
            )
            .under("show"),
        );

    builder
        .command(
            CommandDef::new(
                "write_terminal",
                "terminal",
                "display config to terminal",
                show_running_config,
            )
            .under("write"),
        )
        .command(
            CommandDef::new("write_file", "file filename", "save config to file", write_file)
                .arg(args::filename(ID_FILENAME, "output filename")?)
                .under("write"),
        )
        .command(
            CommandDef::new(
                "write_yaml",
                "yaml filename",
                "export CLI grammar to YAML",
                write_yaml,
            )
            .arg(args::filename(ID_FILENAME, "output filename")?)
            .under("write"),
        );
    Ok(())
}

/// `doc <cmd_name> [file <doc_filename> [format <doc_format>]]`
fn show_doc_node() -> Result<Node> {
    let format = Node::option(Node::seq(vec![
        Node::keyword("format"),
        args::regex(ID_DOC_FMT, "(md|rst|txt)", "format (md, rst, txt)")?,
    ]));
    let file = Node::option(Node::seq(vec![
        Node::keyword("file"),
        args::filename(ID_DOC_FILE, "output filename")?,
        format,
    ]));
    Ok(Node::seq(vec![
        Node::keyword("doc").with_help("display or export command documentation"),
        args::regex(ID_CMD_NAME, "[a-zA-Z_][a-zA-Z0-9_]*", "command name")?,
        file,
    ]))
}

fn app_name<'e, S>(env: &'e Environment<'_, S>) -> &'e str {
    env.config.banner.as_deref().unwrap_or(DEFAULT_APP_NAME)
}

fn required<'p>(parse: &'p Parse<'_>, id: &str) -> Result<&'p str> {
    parse
        .get_str(id)
        .ok_or_else(|| CliError::Handler(format!("missing argument '{id}'")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn help<S>(env: &mut Environment<'_, S>, _parse: &Parse<'_>) -> Result<CommandOutput> {
    let mut out = String::from("Press TAB for command completion and contextual help.\n\n");
    out.push_str("Commands:\n");
    out.push_str(&doc::command_listing(env.grammar));
    Ok(CommandOutput::Text(out))
}

fn quit<S>(env: &mut Environment<'_, S>, _parse: &Parse<'_>) -> Result<CommandOutput> {
    log::info!("exit requested from {:?} session", env.mode);
    env.request_exit();
    Ok(CommandOutput::Text("Goodbye!\n".to_string()))
}

fn show_running_config<S>(
    env: &mut Environment<'_, S>,
    _parse: &Parse<'_>,
) -> Result<CommandOutput> {
    Ok(CommandOutput::Text(env.running_config()))
}

fn show_version<S>(env: &mut Environment<'_, S>, _parse: &Parse<'_>) -> Result<CommandOutput> {
    Ok(CommandOutput::Text(format!(
        "{} version {}\n",
        app_name(env),
        env.config.version
    )))
}

fn show_doc<S>(env: &mut Environment<'_, S>, parse: &Parse<'_>) -> Result<CommandOutput> {
    let name = required(parse, ID_CMD_NAME)?;
    let Some(file) = parse.get_str(ID_DOC_FILE) else {
        return Ok(CommandOutput::Text(doc::render_terminal(
            env.grammar,
            env.docs,
            name,
        )));
    };
    let format = parse
        .get_str(ID_DOC_FMT)
        .and_then(DocFormat::from_name)
        .unwrap_or_default();
    let text = doc::render_file(env.grammar, env.docs, name, format);
    std::fs::write(file, text)
        .map_err(|e| CliError::Handler(format!("cannot open file '{file}': {e}")))?;
    Ok(CommandOutput::Text(format!(
        "Documentation written to '{file}' ({})\n",
        format.label()
    )))
}

fn write_file<S>(env: &mut Environment<'_, S>, parse: &Parse<'_>) -> Result<CommandOutput> {
    let file = required(parse, ID_FILENAME)?;
    std::fs::write(file, env.running_config())
        .map_err(|e| CliError::Handler(format!("cannot open file: {file}: {e}")))?;
    log::info!("running configuration saved to {file}");
    Ok(CommandOutput::Text(format!("Configuration saved to {file}\n")))
}

fn write_yaml<S>(env: &mut Environment<'_, S>, parse: &Parse<'_>) -> Result<CommandOutput> {
    let file = required(parse, ID_FILENAME)?;
    // Export the compiled grammar so a translation is never re-exported.
    locale::write_grammar(
        Path::new(file),
        env.compiled,
        app_name(env),
        &env.config.grammar_env,
    )?;
    Ok(CommandOutput::Text(format!("CLI grammar exported to {file}\n")))
}
