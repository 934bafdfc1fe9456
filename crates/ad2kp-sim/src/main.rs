mod controls;

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ad2kp_sim::{DEFAULT_PORT, PauseFlag, ReplayConfig, ReplayLog, ReplayServer, SimError};

/// ad2kp-sim -- replay a recorded AD2 protocol log to TCP clients
#[derive(Debug, Parser)]
#[command(
    name = "ad2kp-sim",
    version,
    about = "Replay a recorded AD2 protocol log to TCP clients",
    long_about = "Listens on a TCP port and, for every client, sends the lines of the\n\
        log file one per tick, looping forever. Space pauses all clients;\n\
        q, Esc or Ctrl-C exits. Inbound !PING lines get a !PONG reply."
)]
struct Args {
    /// Log file with one protocol line per row
    log: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Milliseconds between lines
    #[arg(long, default_value = "800")]
    interval_ms: u64,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
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

async fn run(args: Args) -> Result<(), SimError> {
    let log = ReplayLog::load(&args.log)?;
    tracing::info!(path = %args.log.display(), lines = log.len(), "replay log loaded");

    let config = ReplayConfig {
        bind: args.bind,
        port: args.port,
        interval: Duration::from_millis(args.interval_ms.max(1)),
    };

    let pause = PauseFlag::new();
    let server = ReplayServer::bind(&config, log, pause.clone()).await?;
    let cancel = server.cancel_token();
    let serving = tokio::spawn(server.run());

    let quit = controls::run(pause).await;
    cancel.cancel();

    match serving.await {
        Ok(result) => result?,
        Err(e) => tracing::warn!(error = %e, "server task failed"),
    }
    Ok(quit?)
}
