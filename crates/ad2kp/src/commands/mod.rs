//! Command dispatch: bridges CLI args -> keypad operations -> output.

pub mod config_cmd;
pub mod interactive;
pub mod mode;
pub mod send;
pub mod watch;

use ad2kp_api::Connector;
use ad2kp_core::Keypad;

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Printer;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch<C: Connector>(
    cmd: Command,
    keypad: &Keypad<C>,
    printer: Printer,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) if args.interactive => interactive::run(keypad, printer).await,
        Command::Watch(_) => watch::handle(keypad, printer).await,
        Command::Mode(args) => mode::handle(keypad, args, printer).await,
        Command::Send(args) => send::handle(keypad, args, printer).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
