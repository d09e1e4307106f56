//! Async-signal-safe termination handling.
//!
//! The handler only stores into atomics; the supervisor loop polls them at
//! its check points. No locks, no allocation, no I/O in signal context.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static SIGNAL_RECEIVED: AtomicI32 = AtomicI32::new(0);

/// Install SIGINT/SIGTERM handlers. No-op on platforms without Unix signal
/// support.
#[cfg(unix)]
pub fn install_handlers() {
    use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    unsafe {
        let _ = signal::sigaction(Signal::SIGINT, &action);
        let _ = signal::sigaction(Signal::SIGTERM, &action);
    }
}

#[cfg(not(unix))]
pub fn install_handlers() {}

#[cfg(unix)]
extern "C" fn handle_signal(signal: libc::c_int) {
    SIGNAL_RECEIVED.store(signal, Ordering::SeqCst);
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Whether a termination signal has been delivered.
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Name of the delivered signal, when one has arrived.
#[cfg(unix)]
pub fn received_signal_name() -> Option<&'static str> {
    use nix::sys::signal::Signal;

    match SIGNAL_RECEIVED.load(Ordering::SeqCst) {
        0 => None,
        raw => Signal::try_from(raw).ok().map(|signal| signal.as_str()),
    }
}

#[cfg(not(unix))]
pub fn received_signal_name() -> Option<&'static str> {
    None
}
