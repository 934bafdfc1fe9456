//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::config;
use crate::error::CliError;
use crate::output::Printer;

pub fn handle(args: ConfigArgs, printer: Printer) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            printer.emit(&config::config_path().display().to_string());
        }
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            if cfg.profiles.is_empty() && cfg.default_profile.is_none() {
                printer.emit(&format!(
                    "# no profiles configured ({})",
                    config::config_path().display()
                ));
            } else {
                printer.emit(config::render_config(&cfg)?.trim_end());
            }
        }
    }
    Ok(())
}
