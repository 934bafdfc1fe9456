//! `ad2kp mode`: wait for the first snapshot, print its mode, exit.

use std::time::Duration;

use ad2kp_api::Connector;
use ad2kp_core::{Keypad, derive_mode};

use crate::cli::ModeArgs;
use crate::error::CliError;
use crate::output::Printer;

pub async fn handle<C: Connector>(
    keypad: &Keypad<C>,
    args: ModeArgs,
    printer: Printer,
) -> Result<(), CliError> {
    let mut snapshots = keypad.watch_snapshot();
    keypad.connect().await?;

    // Clone out of the watch guard before any await.
    let snapshot = tokio::time::timeout(
        Duration::from_secs(args.timeout),
        snapshots.wait_for(Option::is_some),
    )
    .await
    .ok()
    .and_then(|waited| waited.ok().and_then(|guard| (*guard).clone()));
    keypad.shutdown().await;

    let Some(state) = snapshot else {
        return Err(CliError::Timeout {
            seconds: args.timeout,
            what: "the first snapshot",
            endpoint: keypad.endpoint(),
        });
    };

    let mode = derive_mode(Some(&state));
    printer.emit(&printer.render_mode(mode, Some(state.last_alpha_message.as_str()))?);
    Ok(())
}
