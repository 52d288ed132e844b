use crate::error::{RoverError, RoverResult};
use colored::Colorize;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared one-way stop flag.
///
/// Once cancelled it stays cancelled. Every task holds a clone and checks
/// it between cycles; [`sleep`](CancellationToken::sleep) returns early as
/// soon as the flag is raised.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every sleeper. Idempotent.
    pub fn cancel(&self) {
        let (cancelled, condvar) = &*self.inner;
        let mut cancelled = cancelled.lock();
        if !*cancelled {
            *cancelled = true;
            log::debug!(target: "rover::scheduler", "Cancellation requested");
        }
        condvar.notify_all();
    }

    pub fn cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `duration` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the token is cancelled on return.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (cancelled, condvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = cancelled.lock();
        while !*cancelled {
            if condvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.cancelled())
            .finish()
    }
}

/// Cancel `token` on Ctrl+C.
///
/// If the process is still alive `grace` after the signal, it is terminated.
/// Only one handler can be installed per process.
pub fn install_interrupt_handler(token: CancellationToken, grace: Duration) -> RoverResult<()> {
    ctrlc::set_handler(move || {
        eprintln!("{}", "\nCtrl+C received! Shutting down ROVER server...".red());
        token.cancel();
        std::thread::spawn(move || {
            std::thread::sleep(grace);
            eprintln!("{}", "Force terminating application...".red());
            std::process::exit(0);
        });
    })
    .map_err(|e| RoverError::Internal(format!("Failed to set signal handler: {}", e)))
}
