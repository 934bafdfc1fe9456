//! Clap derive structures for the `ad2kp` CLI.
//!
//! Kept free of workspace crates so `build.rs` can include it directly.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ad2kp -- virtual keypad for AD2 alarm panel interfaces
#[derive(Debug, Parser)]
#[command(
    name = "ad2kp",
    version,
    about = "Virtual keypad for AD2 alarm panel interfaces",
    long_about = "Connects to an AD2 device (WebSocket /ad2ws or raw TCP lines),\n\
        tracks the panel's display mode and sends keypad commands.\n\n\
        Sensitive alarm actions need three taps inside three seconds.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Keypad profile to use
    #[arg(long, short = 'p', env = "AD2KP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device host (overrides profile)
    #[arg(long, short = 'H', env = "AD2KP_HOST", global = true)]
    pub host: Option<String>,

    /// Transport (overrides profile)
    #[arg(long, short = 't', env = "AD2KP_TRANSPORT", global = true)]
    pub transport: Option<TransportArg>,

    /// Device port (overrides profile; required for tcp)
    #[arg(long, env = "AD2KP_PORT", global = true)]
    pub port: Option<u16>,

    /// Virtual partition id (overrides profile)
    #[arg(long, env = "AD2KP_PARTITION", global = true)]
    pub partition: Option<u32>,

    /// Code slot id (overrides profile)
    #[arg(long, env = "AD2KP_CODE", global = true)]
    pub code: Option<u32>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AD2KP_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportArg {
    /// Device web server socket (ws://host/ad2ws)
    Websocket,
    /// Newline-delimited TCP (ser2sock, ad2kp-sim)
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream connection and display-mode changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Print the current display mode and exit
    Mode(ModeArgs),

    /// Send one keypad command and exit
    Send(SendArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Bind keys: 1/2 panel buttons, p/f/a alarm taps, r re-sync, q quit
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// Seconds to wait for the first snapshot
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command name or token, e.g. disarm, bypass:7, "<STAY>"
    pub command: String,

    /// Forward the string as-is instead of parsing it
    #[arg(long)]
    pub raw: bool,

    /// Seconds to wait for the connection
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
