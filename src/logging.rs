//! Tracing subscriber setup for the `prep` binary.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over the default
/// filter; `verbose` raises the default to debug. Colour only on a terminal.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "board_prep=debug,board_prep_core=debug"
    } else {
        "board_prep=info,board_prep_core=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}
