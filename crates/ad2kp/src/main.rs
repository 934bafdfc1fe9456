mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ad2kp_api::{Connector, TcpConnector, WebSocketConnector};
use ad2kp_core::{Keypad, TransportKind};

use crate::cli::{Cli, Command};
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output::Printer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let printer = Printer::new(cli.global.output, cli.global.color);

    match cli.command {
        // Config commands don't need a device connection
        Command::Config(args) => commands::config_cmd::handle(args, printer),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ad2kp", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config_or_default();
            let resolved = config::resolve(&cli.global, &cfg)?;
            tracing::debug!(endpoint = %resolved.endpoint, command = ?cmd, "dispatching command");

            let ResolvedProfile { endpoint, keypad } = resolved;
            match endpoint.transport {
                TransportKind::Websocket => {
                    let connector = WebSocketConnector::for_host(&endpoint.host, endpoint.port)
                        .map_err(ad2kp_core::CoreError::from)?;
                    run_with(cmd, Keypad::new(keypad, connector), printer).await
                }
                TransportKind::Tcp => {
                    let port = endpoint.port.ok_or_else(|| CliError::Validation {
                        field: "port".into(),
                        reason: "required for the tcp transport".into(),
                    })?;
                    let connector = TcpConnector::new(&endpoint.host, port);
                    run_with(cmd, Keypad::new(keypad, connector), printer).await
                }
            }
        }
    }
}

async fn run_with<C: Connector>(cmd: Command, keypad: Keypad<C>, printer: Printer) -> Result<(), CliError> {
    commands::dispatch(cmd, &keypad, printer).await
}
