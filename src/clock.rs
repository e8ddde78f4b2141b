//! Periodic wall clock for the UI header.
//!
//! A `Clock` runs a background thread that sends the current local time over
//! a channel once per interval. Dropping the clock stops and joins the thread.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::debug;

/// Display layout for the header clock.
pub const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

enum ClockCommand {
    Stop,
}

/// Cancellable repeating timer.
pub struct Clock {
    control_tx: Option<Sender<ClockCommand>>,
    ticks: Receiver<DateTime<Local>>,
    handle: Option<JoinHandle<()>>,
}

impl Clock {
    /// Start ticking every `interval`.
    pub fn start(interval: Duration) -> Self {
        let (control_tx, control_rx) = channel();
        let (tick_tx, ticks) = channel();

        let handle = thread::spawn(move || run_clock_thread(interval, control_rx, tick_tx));
        debug!(?interval, "clock started");

        Clock {
            control_tx: Some(control_tx),
            ticks,
            handle: Some(handle),
        }
    }

    /// Most recent tick since the last call, if any arrived.
    pub fn latest(&self) -> Option<DateTime<Local>> {
        self.ticks.try_iter().last()
    }

    /// Block until the next tick or until `timeout` elapses.
    #[cfg(test)]
    pub fn wait_tick(&self, timeout: Duration) -> Option<DateTime<Local>> {
        self.ticks.recv_timeout(timeout).ok()
    }

    /// Stop the timer thread and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.control_tx.take() {
            let _ = tx.send(ClockCommand::Stop);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!("clock stopped");
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_clock_thread(
    interval: Duration,
    control_rx: Receiver<ClockCommand>,
    tick_tx: Sender<DateTime<Local>>,
) {
    loop {
        match control_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if tick_tx.send(Local::now()).is_err() {
                    break;
                }
            }
            Ok(ClockCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Format a clock reading for display.
pub fn format_clock(now: DateTime<Local>) -> String {
    now.format(CLOCK_FORMAT).to_string()
}
