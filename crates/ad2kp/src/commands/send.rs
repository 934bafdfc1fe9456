//! `ad2kp send`: connect, send one command, disconnect.

use std::time::Duration;

use serde_json::json;

use ad2kp_api::Connector;
use ad2kp_core::{ConnectionState, Keypad, KeypadCommand};

use crate::cli::{OutputFormat, SendArgs};
use crate::error::CliError;
use crate::output::Printer;

pub async fn handle<C: Connector>(
    keypad: &Keypad<C>,
    args: SendArgs,
    printer: Printer,
) -> Result<(), CliError> {
    // Validate before touching the network.
    let token = if args.raw {
        args.command.clone()
    } else {
        args.command.parse::<KeypadCommand>()?.token()
    };

    let mut state = keypad.watch_state();
    keypad.connect().await?;

    let connected = matches!(
        tokio::time::timeout(
            Duration::from_secs(args.timeout),
            state.wait_for(|s| *s == ConnectionState::Connected),
        )
        .await,
        Ok(Ok(_))
    );

    if !connected {
        keypad.shutdown().await;
        return Err(CliError::Timeout {
            seconds: args.timeout,
            what: "the connection",
            endpoint: keypad.endpoint(),
        });
    }

    let sent = keypad.send_command(&token).await;
    keypad.shutdown().await;
    sent?;

    let line = match printer.format() {
        OutputFormat::Json => serde_json::to_string(&json!({ "sent": token }))?,
        OutputFormat::Text => format!("sent {token}"),
    };
    printer.emit(&line);
    Ok(())
}
