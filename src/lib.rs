//! Multi-decree Paxos atomic broadcast over UDP multicast.
//!
//! Four role processes — client, proposer, acceptor, learner — exchange
//! fixed-format datagrams on four multicast groups and together replicate a
//! gap-free, totally ordered log of client-submitted values. See
//! `multi_paxos` for the per-role state machines, `codec`/`message` for the
//! wire format, and `configurations` for the config file shape.

#[macro_use]
extern crate log;

pub mod codec;
pub mod configurations;
pub mod error;
pub mod event;
pub mod message;
pub mod multi_paxos;
mod net_node;

use std::time::Duration;

/// Default number of acceptors the protocol is provisioned for.
pub const N_ACCEPTORS: usize = 3;

/// Fixed retransmission/timeout delay used by every watchdog.
pub const TIMEOUT: Duration = Duration::from_millis(500);

/// The size of a majority out of `n` acceptors.
pub const fn quorum(n: usize) -> usize {
    n / 2 + 1
}
