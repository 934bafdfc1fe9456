//! Simulator error types.

use std::net::SocketAddr;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SimError {
    #[error("cannot read replay log `{}`", path.display())]
    #[diagnostic(code(ad2kp_sim::log_unreadable), help("Pass a text file with one protocol line per row."))]
    LogUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay log `{}` has no lines to send", path.display())]
    #[diagnostic(code(ad2kp_sim::empty_log))]
    EmptyLog { path: PathBuf },

    #[error("cannot listen on {addr}")]
    #[diagnostic(code(ad2kp_sim::bind), help("Is another simulator already running? Try --port."))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(ad2kp_sim::io))]
    Io(#[from] std::io::Error),
}
