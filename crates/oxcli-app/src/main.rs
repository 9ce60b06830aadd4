//! Minimal router-style CLI.
//!
//! Runs an interactive session on the terminal, or serves one TCP client
//! when a port is given on the command line or in the configuration file.
//! Ctrl+C stops a remote server; `quit` ends either kind of session.

mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::Parser;

use commands::MinimalState;
use oxcli_net::StdNetworkBackend;
use oxcli_terminal::{Cli, RustylineEditor, StreamEditor};
use oxcli_types::CliConfig;

#[derive(Parser)]
#[command(name = "oxcli-minimal")]
#[command(about = "Minimal router-style command line", version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve a single remote client on this TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration script replayed before the session starts
    #[arg(short, long)]
    startup: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => commands::default_config(),
    };
    if args.port.is_some() {
        config.tcp_port = args.port;
    }
    log::info!("Starting {} v{}", config.banner.as_deref().unwrap_or("oxcli"), config.version);

    let mut cli = Cli::new(config, MinimalState::default(), commands::builder()?)?
        .with_docs(commands::docs());

    if let Some(path) = &args.startup {
        let errors = cli.load_config(path)?;
        if errors > 0 {
            log::warn!("{}: {errors} line(s) failed", path.display());
        }
    }

    let running = cli.running_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nSignal received, shutting down...");
        running.store(false, Ordering::SeqCst);
    })?;

    if cli.config().is_remote() {
        let mut backend = StdNetworkBackend::new();
        cli.run_remote(&mut backend)?;
    } else if std::io::stdin().is_terminal() {
        let mut editor = RustylineEditor::new(cli.config().history_size)?;
        cli.run_local(&mut editor, &mut std::io::stdout())?;
    } else {
        // Piped input: no prompts, no completion.
        let mut editor = StreamEditor::new(std::io::stdin().lock(), std::io::sink());
        cli.run_local(&mut editor, &mut std::io::stdout())?;
    }

    cli.shutdown();
    log::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn args_parse_port_and_startup() {
        let args = Args::parse_from(["oxcli-minimal", "--port", "2323", "-s", "boot.cfg"]);
        assert_eq!(args.port, Some(2323));
        assert_eq!(args.startup, Some(PathBuf::from("boot.cfg")));
        assert!(args.config.is_none());
    }
}
