//! A UDP multicast send/receive pair for one role's group, generalized from
//! serde/bincode message objects to raw byte buffers: the wire format is
//! now the fixed-chunk codec in `codec`/`message`, not an arbitrary
//! serde-serialized payload.
//!
//! Sending and receiving are exposed through the `Transport` trait (the
//! same seam the Paxos teacher crate in this pack cuts at) so that role
//! event loops can be unit-tested against an in-memory double instead of
//! real multicast sockets.

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use net2::UdpBuilder;

use crate::error::BindError;
use crate::event::Event;

/// Maximum datagram size per the wire spec (§6): all current messages are
/// well under this, but the receive buffer is sized to the legal maximum.
const MAX_DATAGRAM: usize = 65_536;

/// Sends pre-encoded datagrams to a destination and yields datagrams
/// received on the bound group.
pub trait Transport: Send + Sync {
    fn send(&self, bytes: &[u8], destination: &SocketAddrV4);

    /// Blocks until a datagram arrives, or returns `None` if the
    /// underlying transport has nothing more to deliver.
    fn recv(&self) -> Option<Vec<u8>>;
}

/// A real multicast group, bound for both sending and receiving.
pub struct NetNode {
    send_socket: UdpSocket,
    receive_socket: UdpSocket,
}

impl NetNode {
    /// Binds the send and receive sockets for the group at
    /// `multicast_address`, joining the multicast group for receiving.
    pub fn bind(multicast_address: &SocketAddrV4) -> Result<Self, BindError> {
        let send_socket = UdpSocket::bind("0.0.0.0:0").map_err(BindError::SendSocket)?;
        send_socket
            .set_multicast_loop_v4(true)
            .map_err(BindError::SendSocket)?;

        let receive_socket = UdpBuilder::new_v4()
            .map_err(BindError::SendSocket)?
            .reuse_address(true)
            .map_err(BindError::SendSocket)?
            .bind(multicast_address)
            .map_err(|source| BindError::ReceiveSocket {
                addr: *multicast_address,
                source,
            })?;

        receive_socket
            .join_multicast_v4(multicast_address.ip(), &Ipv4Addr::UNSPECIFIED)
            .map_err(|source| BindError::JoinMulticast {
                addr: *multicast_address,
                source,
            })?;

        Ok(NetNode {
            send_socket,
            receive_socket,
        })
    }
}

impl Transport for NetNode {
    fn send(&self, bytes: &[u8], destination: &SocketAddrV4) {
        if let Err(e) = self.send_socket.send_to(bytes, destination) {
            warn!("send to {:?} failed: {}", destination, e);
        }
    }

    fn recv(&self) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        match self.receive_socket.recv_from(&mut buf) {
            Ok((n, _src)) => {
                buf.truncate(n);
                Some(buf)
            }
            Err(e) => {
                warn!("recv failed: {}", e);
                None
            }
        }
    }
}

/// Spawns the thread that blocks on `Transport::recv` and forwards every
/// datagram as an `Event::Datagram` on `tx`. This is the only place
/// datagrams cross a thread boundary; decoding and all state mutation
/// happen on the event loop that owns the paired receiving end of `tx`.
pub fn spawn_receiver(node: Arc<dyn Transport>, tx: Sender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if let Some(bytes) = node.recv() {
            if tx.send(Event::Datagram(bytes)).is_err() {
                return;
            }
        }
    })
}
