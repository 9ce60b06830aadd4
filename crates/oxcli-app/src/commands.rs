//! Commands of the minimal router CLI: a greeting name and one IPv4
//! address, both saved in the running configuration.

use std::net::Ipv4Addr;

use oxcli_grammar::Parse;
use oxcli_terminal::{
    CommandDef, CommandOutput, DocEntry, DocTable, Environment, GrammarBuilder, args,
    format_template,
};
use oxcli_types::CliConfig;
use oxcli_types::error::{CliError, Result};

const DEFAULT_NAME: &str = "world";

/// Application state edited by the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalState {
    pub name: String,
    pub address: Option<Ipv4Addr>,
}

impl Default for MinimalState {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            address: None,
        }
    }
}

pub fn default_config() -> CliConfig {
    CliConfig {
        prompt: "minimal> ".to_string(),
        banner: Some("Minimal Router CLI".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ..CliConfig::default()
    }
}

/// Grammar of the application. Builtins are added by `Cli::new`.
pub fn builder() -> Result<GrammarBuilder<MinimalState>> {
    let mut b = GrammarBuilder::new();
    b.group("set", "configure settings")
        .group("del", "delete configuration");

    b.command(
        CommandDef::new("show_name", "name", "display current name", show_name).under("show"),
    )
    .command(
        CommandDef::new(
            "show_address",
            "address",
            "display configured IPv4 address",
            show_address,
        )
        .under("show"),
    )
    .command(
        CommandDef::new("set_name", "name value", "set the greeting name", set_name)
            .arg(args::name("value", "name to greet")?)
            .under("set")
            .serialize("greeting", "set name {value}\n", 10, emit_name),
    )
    .command(
        CommandDef::new("set_address", "address ipv4", "set the IPv4 address", set_address)
            .arg(args::ipv4("ipv4", "IPv4 address (e.g., 192.168.1.1)")?)
            .under("set")
            .serialize("network", "set address {ipv4}\n", 20, emit_address),
    )
    .command(
        CommandDef::new(
            "del_address",
            "address ipv4",
            "delete the IPv4 address",
            del_address,
        )
        .arg(args::ipv4("ipv4", "IPv4 address to delete")?)
        .under("del"),
    )
    .command(CommandDef::new("hello", "hello", "say hello", hello));
    Ok(b)
}

pub fn docs() -> DocTable {
    DocTable::from_static(&[
        DocEntry {
            identifier: "set_name",
            description: Some("Sets the name used by the hello command."),
            examples: Some("set name Alice\nset name router-1\n"),
        },
        DocEntry {
            identifier: "set_address",
            description: Some("Configures the single IPv4 address of the device."),
            examples: Some("set address 192.168.1.1\n"),
        },
        DocEntry {
            identifier: "del_address",
            description: Some("Removes the configured address if it matches."),
            examples: Some("del address 192.168.1.1\n"),
        },
    ])
}

fn arg<'p>(parse: &'p Parse<'_>, id: &str) -> Result<&'p str> {
    parse
        .get_str(id)
        .ok_or_else(|| CliError::Handler(format!("missing argument '{id}'")))
}

fn ipv4_arg(parse: &Parse<'_>) -> Result<Ipv4Addr> {
    let text = arg(parse, "ipv4")?;
    args::parse_ipv4(text)
        .ok_or_else(|| CliError::Handler(format!("invalid IPv4 address: {text}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn show_name(env: &mut Environment<'_, MinimalState>, _: &Parse<'_>) -> Result<CommandOutput> {
    Ok(CommandOutput::Text(format!("Name: {}\n", env.state.name)))
}

fn show_address(env: &mut Environment<'_, MinimalState>, _: &Parse<'_>) -> Result<CommandOutput> {
    let text = match env.state.address {
        Some(addr) => format!("Address: {addr}\n"),
        None => "Address: not configured\n".to_string(),
    };
    Ok(CommandOutput::Text(text))
}

fn set_name(env: &mut Environment<'_, MinimalState>, parse: &Parse<'_>) -> Result<CommandOutput> {
    let value = arg(parse, "value")?;
    env.state.name = value.to_string();
    log::debug!("name changed to {value}");
    Ok(CommandOutput::Text(format!("Name set to '{value}'\n")))
}

fn set_address(
    env: &mut Environment<'_, MinimalState>,
    parse: &Parse<'_>,
) -> Result<CommandOutput> {
    let addr = ipv4_arg(parse)?;
    env.state.address = Some(addr);
    Ok(CommandOutput::Text(format!("Address set to '{addr}'\n")))
}

fn del_address(
    env: &mut Environment<'_, MinimalState>,
    parse: &Parse<'_>,
) -> Result<CommandOutput> {
    let addr = ipv4_arg(parse)?;
    let text = match env.state.address {
        Some(current) if current == addr => {
            env.state.address = None;
            format!("Address '{addr}' deleted\n")
        },
        Some(current) => format!("Address '{addr}' not found (configured: {current})\n"),
        None => "No address configured\n".to_string(),
    };
    Ok(CommandOutput::Text(text))
}

fn hello(env: &mut Environment<'_, MinimalState>, _: &Parse<'_>) -> Result<CommandOutput> {
    Ok(CommandOutput::Text(format!("Hello, {}!\n", env.state.name)))
}

// ---------------------------------------------------------------------------
// Running configuration
// ---------------------------------------------------------------------------

fn emit_name(state: &MinimalState, template: &str, out: &mut String) {
    if state.name != DEFAULT_NAME {
        out.push_str(&format_template(template, &[("value", state.name.as_str().into())]));
    }
}

fn emit_address(state: &MinimalState, template: &str, out: &mut String) {
    if let Some(addr) = state.address {
        let text = addr.to_string();
        out.push_str(&format_template(template, &[("ipv4", text.as_str().into())]));
    }
}
