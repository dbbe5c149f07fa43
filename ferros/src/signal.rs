//! Signal-driven cancellation.

use ferros_core::{CancelToken, Error, Result};
use signal_hook::consts::{SIGINT, SIGTERM};

/// Create a [`CancelToken`] that fires on SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns [`Error::Initialization`] when the signal handlers cannot be
/// installed.
pub fn cancel_on_signals() -> Result<CancelToken> {
    let token = CancelToken::new();
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, token.flag())
            .map_err(|e| Error::Initialization(format!("failed to install signal handler: {e}")))?;
    }
    Ok(token)
}
