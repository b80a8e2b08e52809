//! Starts one learner, which broadcasts a CATCHUP_REQUEST on startup and
//! then infinitely listens for PHASE_2B from acceptors and
//! CATCHUP_REQUEST/LEARNER_UPDATE from other learners. Decided values are
//! printed to standard output, one per line, in instance order.
//!
//! Run as:
//!     RUST_LOG=multi_paxos=info cargo run --bin learner -- <uid> <config>
//! where <uid> is a non-negative number, unique among all learners.

#[macro_use]
extern crate log;

use std::env;
use std::process;

use multi_paxos::configurations::Topology;
use multi_paxos::multi_paxos::{Learner, Runnable};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        eprintln!("usage: learner <uid> <config>");
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

    let mut learner = match Learner::new(uid, topology.learners, topology.acceptors) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: could not start learner: {}", e);
            process::exit(1);
        }
    };
    learner.run();
}
