//! Dispatch slots and the executor loops behind `spin`.
//!
//! Every subscriber and service registered on a runtime becomes a
//! [`DispatchSlot`]: a pollable unit that takes at most one ready message
//! per poll and runs the user callback on it. The single-threaded executor
//! polls every slot from one loop; the multi-threaded executor pins each
//! slot to one of `n` workers (slot index modulo `n`), which keeps
//! per-endpoint FIFO order without cross-worker coordination.

use ferros_core::{CancelToken, DynError, Error, Result};
use parking_lot::Mutex;
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    thread,
    time::Duration,
};

/// Idle backoff between poll rounds when nothing was dispatched.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of polling one slot once.
pub(crate) enum PollOutcome {
    /// No message was ready.
    Idle,
    /// One message was taken and its callback ran to completion.
    Dispatched,
    /// One message was taken but the callback failed or panicked.
    Failed(DynError),
}

/// A pollable dispatch unit wrapping one subscriber or service endpoint
/// together with its user callback.
pub(crate) struct DispatchSlot {
    endpoint: String,
    poll: Box<dyn FnMut() -> PollOutcome + Send>,
}

impl DispatchSlot {
    pub(crate) fn new(endpoint: String, poll: Box<dyn FnMut() -> PollOutcome + Send>) -> Self {
        Self { endpoint, poll }
    }

    /// The fully qualified endpoint name, for error reporting.
    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn poll_once(&mut self) -> PollOutcome {
        (self.poll)()
    }
}

/// Run a fallible user callback, containing panics.
pub(crate) fn run_callback<F>(f: F) -> std::result::Result<(), DynError>
where
    F: FnOnce() -> std::result::Result<(), DynError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "callback panicked".to_string());
            Err(msg.into())
        }
    }
}

/// Poll `slots` until cancellation (or a fatal callback failure).
///
/// Cancellation is checked between dispatches. After it fires, every slot
/// is drained of already-queued messages once, then the loop returns.
pub(crate) fn run(
    slots: &[Arc<Mutex<DispatchSlot>>],
    cancel: &CancelToken,
    fatal_callback_errors: bool,
) -> Result<()> {
    loop {
        if cancel.is_cancelled() {
            return drain(slots, fatal_callback_errors);
        }

        let mut dispatched = false;
        for slot in slots {
            if cancel.is_cancelled() {
                return drain(slots, fatal_callback_errors);
            }

            let mut slot = slot.lock();
            match slot.poll_once() {
                PollOutcome::Idle => {}
                PollOutcome::Dispatched => dispatched = true,
                PollOutcome::Failed(source) => {
                    dispatched = true;
                    let err = Error::Callback {
                        endpoint: slot.endpoint().to_string(),
                        source,
                    };
                    if fatal_callback_errors {
                        return Err(err);
                    }
                    tracing::error!("{err}");
                }
            }
        }

        if !dispatched {
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

/// Dispatch whatever is already queued on each slot, once, then return.
fn drain(slots: &[Arc<Mutex<DispatchSlot>>], fatal_callback_errors: bool) -> Result<()> {
    for slot in slots {
        let mut slot = slot.lock();
        loop {
            match slot.poll_once() {
                PollOutcome::Idle => break,
                PollOutcome::Dispatched => {}
                PollOutcome::Failed(source) => {
                    let err = Error::Callback {
                        endpoint: slot.endpoint().to_string(),
                        source,
                    };
                    if fatal_callback_errors {
                        return Err(err);
                    }
                    tracing::error!("{err}");
                }
            }
        }
    }
    Ok(())
}

/// Multi-threaded variant of [`run`]: `workers` threads, each owning the
/// slots whose index hashes to it.
pub(crate) fn run_pool(
    slots: &[Arc<Mutex<DispatchSlot>>],
    cancel: &CancelToken,
    fatal_callback_errors: bool,
    workers: usize,
) -> Result<()> {
    let workers = workers.max(1);
    let (err_tx, err_rx) = crossbeam_channel::bounded::<Error>(workers);
    // Fatal failures in one worker stop the others through this token.
    let stop = CancelToken::new();

    thread::scope(|scope| {
        for worker in 0..workers {
            let assigned: Vec<_> = slots
                .iter()
                .enumerate()
                .filter(|(i, _)| i % workers == worker)
                .map(|(_, s)| Arc::clone(s))
                .collect();
            let err_tx = err_tx.clone();
            let stop = stop.clone();

            scope.spawn(move || {
                let result = run_worker(&assigned, cancel, &stop, fatal_callback_errors);
                if let Err(err) = result {
                    stop.cancel();
                    let _ = err_tx.try_send(err);
                }
            });
        }
    });

    match err_rx.try_recv() {
        Ok(err) => Err(err),
        Err(_) => Ok(()),
    }
}

fn run_worker(
    slots: &[Arc<Mutex<DispatchSlot>>],
    cancel: &CancelToken,
    stop: &CancelToken,
    fatal_callback_errors: bool,
) -> Result<()> {
    loop {
        if stop.is_cancelled() {
            return Ok(());
        }
        if cancel.is_cancelled() {
            return drain(slots, fatal_callback_errors);
        }

        let mut dispatched = false;
        for slot in slots {
            if stop.is_cancelled() {
                return Ok(());
            }
            if cancel.is_cancelled() {
                return drain(slots, fatal_callback_errors);
            }

            let mut slot = slot.lock();
            match slot.poll_once() {
                PollOutcome::Idle => {}
                PollOutcome::Dispatched => dispatched = true,
                PollOutcome::Failed(source) => {
                    dispatched = true;
                    let err = Error::Callback {
                        endpoint: slot.endpoint().to_string(),
                        source,
                    };
                    if fatal_callback_errors {
                        return Err(err);
                    }
                    tracing::error!("{err}");
                }
            }
        }

        if !dispatched {
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}
