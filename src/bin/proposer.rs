//! Starts one proposer, which infinitely listens for SUBMIT from clients,
//! PHASE_1B from acceptors, and RESTART from acceptors.
//!
//! Run as:
//!     RUST_LOG=multi_paxos=info cargo run --bin proposer -- <uid> <config>
//! where <uid> is a non-negative number, unique among all proposers.

#[macro_use]
extern crate log;

use std::env;
use std::process;

use multi_paxos::configurations::Topology;
use multi_paxos::multi_paxos::{Proposer, Runnable};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        eprintln!("usage: proposer <uid> <config>");
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

    let mut proposer = match Proposer::new(uid, topology.proposers, topology.acceptors) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: could not start proposer: {}", e);
            process::exit(1);
        }
    };
    proposer.run();
}
