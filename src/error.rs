//! The crate's two fatal error families: anything that can go wrong while
//! standing a process up (config, socket bind). Everything else — decode
//! errors, stale ballots, unknown tags — is handled inline in the event
//! loops and never surfaces as a `Result`; see `message::WireError`.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("config line {line_no} ({line:?}) does not have the shape '<role> <host> <port>'")]
    Malformed { line_no: usize, line: String },

    #[error("config line {line_no} has an invalid port: {source}")]
    BadPort {
        line_no: usize,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("config line {line_no} has an invalid IPv4 host: {source}")]
    BadHost {
        line_no: usize,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("config does not have a record for role {0:?}")]
    MissingRole(String),
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error("could not create the send socket: {0}")]
    SendSocket(#[source] io::Error),

    #[error("could not bind the receive socket to {addr}: {source}")]
    ReceiveSocket {
        addr: std::net::SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("could not join multicast group {addr}: {source}")]
    JoinMulticast {
        addr: std::net::SocketAddrV4,
        #[source]
        source: io::Error,
    },
}
