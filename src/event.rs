//! Funnels datagrams and timer firings into a single channel per role, so
//! that the role's event loop is the only place that ever mutates
//! per-instance state — no locking is needed between the receive thread,
//! the timer threads, and the loop itself.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Something the event loop needs to react to.
pub enum Event {
    /// A raw datagram, not yet decoded (decoding happens on the loop so
    /// that malformed datagrams never touch another thread's state).
    Datagram(Vec<u8>),
    /// A watchdog armed for `instance` at `generation` has expired. The
    /// loop ignores this if `generation` is no longer current for that
    /// instance: a later re-arm (e.g. a round renewal) supersedes any
    /// watchdog threads still sleeping from an earlier arming.
    Timeout { instance: u16, generation: u64 },
}

/// Creates the channel an event loop reads from, and returns the sending
/// half so callers can hand it to the receive thread and to `arm`.
pub fn channel() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel()
}

/// Arms a one-shot watchdog: after `timeout`, post `Event::Timeout` for
/// `instance` tagged with `generation`. The event loop is responsible for
/// re-arming (with a bumped generation) if the guard condition still
/// hasn't been met, which is what gives repeating watchdogs like the
/// acceptor's 2A-watchdog their "retry every TIMEOUT" behavior.
pub fn arm(tx: Sender<Event>, instance: u16, generation: u64, timeout: Duration) {
    thread::spawn(move || {
        thread::sleep(timeout);
        let _ = tx.send(Event::Timeout {
            instance,
            generation,
        });
    });
}
