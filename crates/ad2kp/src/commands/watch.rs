//! `ad2kp watch`: stream lifecycle and display-mode edges until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;

use ad2kp_api::Connector;
use ad2kp_core::Keypad;

use crate::error::CliError;
use crate::output::Printer;

pub async fn handle<C: Connector>(keypad: &Keypad<C>, printer: Printer) -> Result<(), CliError> {
    let mut events = keypad.subscribe();
    keypad.connect().await?;
    tracing::info!(endpoint = %keypad.endpoint(), "watching keypad");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            event = events.recv() => match event {
                Ok(event) => match printer.render_event(&event) {
                    Ok(line) => printer.emit(&line),
                    Err(e) => break Err(e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
    };

    keypad.shutdown().await;
    result
}
