//! Signal handling for graceful shutdown of the demo loop.
//!
//! SIGINT and SIGTERM set an atomic flag that the main loop polls between
//! tick calls. Nothing else happens inside the handler.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, info};

static SHUTDOWN_FLAG: AtomicBool = AtomicBool::new(false);
static SIGNAL_COUNT: AtomicU32 = AtomicU32::new(0);

/// Handle for polling shutdown requests.
#[derive(Debug, Clone, Copy)]
pub struct SignalHandler {
    _private: (),
}

impl SignalHandler {
    /// Register SIGINT and SIGTERM handlers.
    ///
    /// On non-Unix platforms only [`SignalHandler::request_shutdown`] stops the loop.
    pub fn new() -> std::io::Result<Self> {
        #[cfg(unix)]
        register_unix_handlers()?;

        Ok(Self { _private: () })
    }

    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        SHUTDOWN_FLAG.load(Ordering::Relaxed)
    }

    /// Manually request shutdown.
    pub fn request_shutdown(&self) {
        info!("Manual shutdown requested");
        SHUTDOWN_FLAG.store(true, Ordering::Relaxed);
    }

    /// Number of signals received so far.
    pub fn signal_count(&self) -> u32 {
        SIGNAL_COUNT.load(Ordering::Relaxed)
    }
}

#[cfg(unix)]
fn register_unix_handlers() -> std::io::Result<()> {
    use std::os::raw::c_int;

    extern "C" fn on_terminate(_: c_int) {
        SHUTDOWN_FLAG.store(true, Ordering::Relaxed);
        SIGNAL_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only touches atomics, which is async-signal-safe.
        let previous = unsafe { libc::signal(signal, on_terminate as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(std::io::Error::last_os_error());
        }
    }

    debug!("Unix signal handlers registered");
    Ok(())
}
