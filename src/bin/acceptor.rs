//! Starts one acceptor, which infinitely listens for PHASE_1A/PHASE_2A from
//! proposers and RESEND_2B from learners.
//!
//! Run as:
//!     RUST_LOG=multi_paxos=info cargo run --bin acceptor -- <uid> <config>
//! where <uid> is a non-negative number, unique among all acceptors.

#[macro_use]
extern crate log;

use std::env;
use std::process;

use multi_paxos::configurations::Topology;
use multi_paxos::multi_paxos::{Acceptor, Runnable};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        eprintln!("usage: acceptor <uid> <config>");
        process::exit(1);
    }

    let uid: usize = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("error: <uid> must be a non-negative integer");
            process::exit(1);
        }
    };

    let topology = match Topology::from_file(&args[2]) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: could not load config: {}", e);
            process::exit(1);
        }
    };

    let mut acceptor = match Acceptor::new(uid, topology.acceptors, topology.proposers, topology.learners) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: could not start acceptor: {}", e);
            process::exit(1);
        }
    };
    acceptor.run();
}
