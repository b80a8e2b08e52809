//! Starts one client, which reads newline-separated 16-bit values from
//! standard input and sends each as a SUBMIT to the proposers group until
//! stdin is closed.
//!
//! Run as:
//!     RUST_LOG=multi_paxos=info cargo run --bin client -- <uid> <config>
//! where <uid> is a non-negative number, unique among all clients.

#[macro_use]
extern crate log;

use std::env;
use std::io;
use std::process;

use multi_paxos::configurations::Topology;
use multi_paxos::multi_paxos::Client;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    info!("{:?}", args);

    if args.len() != 3 {
        eprintln!("usage: client <uid> <config>");
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

    let client = match Client::new(uid, topology.clients, topology.proposers) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: could not start client: {}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    client.run_stdin(stdin.lock());
}
