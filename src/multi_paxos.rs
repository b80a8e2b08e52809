//! The per-role state machines of the Multi-Paxos algorithm: the client
//! that submits values, the proposer that drives ballots, the acceptor
//! that votes, and the learner that reconstructs the decided log. Each
//! role owns one multicast group and an event loop that is the sole
//! mutator of that role's per-instance state; see `event` for how
//! datagrams and watchdog timeouts are funneled onto that loop.

use std::collections::HashMap;
use std::net::SocketAddrV4;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use crate::error::BindError;
use crate::event::{self, Event};
use crate::message::Message;
use crate::net_node::{self, NetNode, Transport};
use crate::{quorum, N_ACCEPTORS, TIMEOUT};

/// Implemented by every role that runs as an independent event loop.
pub trait Runnable {
    fn run(&mut self);
}

// ---------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------

/// Reads values from standard input and forwards each as a SUBMIT to the
/// proposers group.
pub struct Client {
    id: usize,
    node: NetNode,
    proposers_address: SocketAddrV4,
}

impl Client {
    pub fn new(
        id: usize,
        clients_address: SocketAddrV4,
        proposers_address: SocketAddrV4,
    ) -> Result<Self, BindError> {
        Ok(Client {
            id,
            node: NetNode::bind(&clients_address)?,
            proposers_address,
        })
    }

    /// Sends a single SUBMIT for `value`, tagged with this client's
    /// `local_inst_id` (a per-client monotonic counter, unrelated to the
    /// Paxos instance the proposer will allocate for it).
    pub fn submit(&self, local_inst_id: u16, value: u16) {
        info!(
            "[C{}] sending value {} (local id {}) to proposers",
            self.id, value, local_inst_id
        );
        match (Message::Submit {
            inst: local_inst_id,
            value,
        })
        .encode()
        {
            Ok(bytes) => self.node.send(&bytes, &self.proposers_address),
            Err(e) => error!("[C{}] could not encode SUBMIT: {}", self.id, e),
        }
    }

    /// Reads lines from `input` until EOF, sending one SUBMIT per
    /// non-empty line that parses as a 16-bit integer. Malformed lines are
    /// logged and skipped rather than terminating the client.
    pub fn run_stdin<R: std::io::BufRead>(&self, input: R) {
        let mut local_inst_id: u16 = 1;
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("[C{}] error reading stdin: {}", self.id, e);
                    break;
                }
            };
            match parse_submission(&line) {
                Some(value) => {
                    self.submit(local_inst_id, value);
                    local_inst_id = local_inst_id.saturating_add(1);
                }
                None if line.trim().is_empty() => {}
                None => warn!("[C{}] ignoring non-integer input {:?}", self.id, line),
            }
        }
        info!("[C{}] stdin closed, exiting", self.id);
    }
}

fn parse_submission(line: &str) -> Option<u16> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<u16>().ok()
}

// ---------------------------------------------------------------------
// Acceptor
// ---------------------------------------------------------------------

/// `(rnd, vrnd, vval)` for one Paxos instance at one acceptor.
#[derive(Default, Clone, Copy)]
struct AcceptorState {
    rnd: u16,
    vrnd: u16,
    vval: u16,
}

pub struct Acceptor {
    id: usize,
    states: HashMap<u16, AcceptorState>,
    node: Arc<dyn Transport>,
    proposers_address: SocketAddrV4,
    learners_address: SocketAddrV4,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Acceptor {
    pub fn new(
        id: usize,
        acceptors_address: SocketAddrV4,
        proposers_address: SocketAddrV4,
        learners_address: SocketAddrV4,
    ) -> Result<Self, BindError> {
        let node: Arc<dyn Transport> = Arc::new(NetNode::bind(&acceptors_address)?);
        let (tx, rx) = event::channel();
        Ok(Acceptor {
            id,
            states: HashMap::new(),
            node,
            proposers_address,
            learners_address,
            tx,
            rx,
        })
    }

    fn handle_phase1a(&mut self, inst: u16, c_rnd: u16) {
        let state = self.states.entry(inst).or_default();
        if c_rnd > state.rnd {
            state.rnd = c_rnd;
            debug!("[A{}] instance {} promises round {}", self.id, inst, c_rnd);
            self.send_to_proposers(Message::Phase1b {
                inst,
                rnd: state.rnd,
                v_rnd: state.vrnd,
                v_val: state.vval,
            });
            self.arm_2a_watchdog(inst);
        } else {
            debug!(
                "[A{}] dropping stale PHASE_1A for instance {} (c_rnd {} <= rnd {})",
                self.id, inst, c_rnd, state.rnd
            );
        }
    }

    fn handle_phase2a(&mut self, inst: u16, c_rnd: u16, c_val: u16) {
        let state = self.states.entry(inst).or_default();
        if c_rnd >= state.rnd {
            state.vrnd = c_rnd;
            state.vval = c_val;
            debug!(
                "[A{}] instance {} accepts value {} at round {}",
                self.id, inst, c_val, c_rnd
            );
            self.send_to_learners(Message::Phase2b {
                inst,
                v_rnd: state.vrnd,
                v_val: state.vval,
            });
        } else {
            debug!(
                "[A{}] dropping stale PHASE_2A for instance {} (c_rnd {} < rnd {})",
                self.id, inst, c_rnd, state.rnd
            );
        }
    }

    fn handle_resend_2b(&mut self, inst: u16) {
        if let Some(state) = self.states.get(&inst) {
            if state.vrnd != 0 {
                debug!("[A{}] re-emitting PHASE_2B for instance {}", self.id, inst);
                self.send_to_learners(Message::Phase2b {
                    inst,
                    v_rnd: state.vrnd,
                    v_val: state.vval,
                });
            }
        }
    }

    fn handle_timeout(&mut self, inst: u16) {
        let still_unaccepted = self.states.get(&inst).map_or(true, |s| s.vrnd == 0);
        if still_unaccepted {
            info!(
                "[A{}] instance {} still unaccepted after timeout, emitting RESTART",
                self.id, inst
            );
            self.send_to_proposers(Message::Restart { inst });
            self.arm_2a_watchdog(inst);
        }
    }

    /// Re-arms every TIMEOUT interval while `vrnd == 0`; the generation is
    /// unused here because the guard condition (`vrnd != 0`) is re-checked
    /// directly against the latest state on every firing.
    fn arm_2a_watchdog(&self, inst: u16) {
        event::arm(self.tx.clone(), inst, 0, TIMEOUT);
    }

    fn send_to_proposers(&self, m: Message) {
        match m.encode() {
            Ok(bytes) => self.node.send(&bytes, &self.proposers_address),
            Err(e) => error!("[A{}] could not encode message: {}", self.id, e),
        }
    }

    fn send_to_learners(&self, m: Message) {
        match m.encode() {
            Ok(bytes) => self.node.send(&bytes, &self.learners_address),
            Err(e) => error!("[A{}] could not encode message: {}", self.id, e),
        }
    }
}

impl Runnable for Acceptor {
    fn run(&mut self) {
        net_node::spawn_receiver(Arc::clone(&self.node), self.tx.clone());

        loop {
            match self.rx.recv() {
                Ok(Event::Datagram(bytes)) => match Message::decode_for_acceptor(&bytes) {
                    Ok(Message::Phase1a { inst, c_rnd }) => self.handle_phase1a(inst, c_rnd),
                    Ok(Message::Phase2a { inst, c_rnd, c_val }) => {
                        self.handle_phase2a(inst, c_rnd, c_val)
                    }
                    Ok(Message::Resend2b { inst }) => self.handle_resend_2b(inst),
                    Ok(other) => debug!("[A{}] unexpected message {:?}, dropping", self.id, other),
                    Err(e) => warn!("[A{}] dropping malformed datagram: {}", self.id, e),
                },
                Ok(Event::Timeout { instance, .. }) => self.handle_timeout(instance),
                Err(_) => return,
            }
        }
    }
}

// ---------------------------------------------------------------------
// Proposer
// ---------------------------------------------------------------------

/// Per-instance proposer bookkeeping for one ballot attempt.
#[derive(Default)]
struct ProposerState {
    client_val: Option<u16>,
    c_rnd: u16,
    q: usize,
    highest_v_rnd: u16,
    c_val: u16,
    /// Bumped on every `prepare`, so a watchdog armed by an earlier round
    /// (superseded by a later renewal) is recognized as stale.
    generation: u64,
}

pub struct Proposer {
    id: usize,
    next_inst: u16,
    states: HashMap<u16, ProposerState>,
    node: Arc<dyn Transport>,
    acceptors_address: SocketAddrV4,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Proposer {
    pub fn new(
        id: usize,
        proposers_address: SocketAddrV4,
        acceptors_address: SocketAddrV4,
    ) -> Result<Self, BindError> {
        let node: Arc<dyn Transport> = Arc::new(NetNode::bind(&proposers_address)?);
        let (tx, rx) = event::channel();
        Ok(Proposer {
            id,
            next_inst: 1,
            states: HashMap::new(),
            node,
            acceptors_address,
            tx,
            rx,
        })
    }

    fn handle_submit(&mut self, value: u16) {
        if self.next_inst == 0 {
            error!("[P{}] instance id space exhausted, dropping submit", self.id);
            return;
        }
        let inst = self.next_inst;
        self.next_inst = self.next_inst.wrapping_add(1);
        self.prepare(inst, value, 1);
    }

    fn handle_restart(&mut self, inst: u16) {
        match self.states.get(&inst).and_then(|s| s.client_val) {
            Some(value) => {
                let new_c_rnd = self.states[&inst].c_rnd + 1;
                debug!(
                    "[P{}] instance {} received RESTART, renewing to round {}",
                    self.id, inst, new_c_rnd
                );
                self.prepare(inst, value, new_c_rnd);
            }
            None => debug!("[P{}] RESTART for unknown instance {}, ignoring", self.id, inst),
        }
    }

    fn handle_phase1b(&mut self, inst: u16, rnd: u16, v_rnd: u16, v_val: u16) {
        let state = match self.states.get_mut(&inst) {
            Some(state) => state,
            None => {
                debug!("[P{}] PHASE_1B for unknown instance {}, ignoring", self.id, inst);
                return;
            }
        };

        if rnd < state.c_rnd {
            debug!(
                "[P{}] dropping stale PHASE_1B for instance {} (rnd {} < c_rnd {})",
                self.id, inst, rnd, state.c_rnd
            );
            return;
        }

        state.q += 1;
        if v_rnd > state.highest_v_rnd {
            state.highest_v_rnd = v_rnd;
            state.c_val = v_val;
        }

        if state.q == quorum(N_ACCEPTORS) {
            let v = if state.highest_v_rnd == 0 {
                state.client_val.unwrap_or(0)
            } else {
                state.c_val
            };
            state.c_val = v;
            let c_rnd = state.c_rnd;
            info!(
                "[P{}] instance {} reached quorum at round {}, proposing value {}",
                self.id, inst, c_rnd, v
            );
            self.send_to_acceptors(Message::Phase2a {
                inst,
                c_rnd,
                c_val: v,
            });
        }
    }

    fn handle_timeout(&mut self, inst: u16, generation: u64) {
        let state = match self.states.get(&inst) {
            Some(state) if state.generation == generation => state,
            _ => return,
        };
        if state.q < quorum(N_ACCEPTORS) {
            let value = state.client_val.unwrap_or(0);
            let new_c_rnd = state.c_rnd + 1;
            info!(
                "[P{}] instance {} quorum watchdog fired, renewing to round {}",
                self.id, inst, new_c_rnd
            );
            self.prepare(inst, value, new_c_rnd);
        }
    }

    /// Starts (or renews) ballot `c_rnd` for `inst`, preserving
    /// `client_val` across renewals: losing the client's original value on
    /// a round renewal is the exact latent bug the protocol's Design Notes
    /// warn about.
    fn prepare(&mut self, inst: u16, value: u16, c_rnd: u16) {
        let state = self.states.entry(inst).or_default();
        state.client_val = Some(value);
        state.c_rnd = c_rnd;
        state.q = 0;
        state.highest_v_rnd = 0;
        state.c_val = 0;
        state.generation += 1;
        let generation = state.generation;

        info!(
            "[P{}] instance {} starting round {} for value {}",
            self.id, inst, c_rnd, value
        );
        self.send_to_acceptors(Message::Phase1a { inst, c_rnd });
        event::arm(self.tx.clone(), inst, generation, TIMEOUT);
    }

    fn send_to_acceptors(&self, m: Message) {
        match m.encode() {
            Ok(bytes) => self.node.send(&bytes, &self.acceptors_address),
            Err(e) => error!("[P{}] could not encode message: {}", self.id, e),
        }
    }
}

impl Runnable for Proposer {
    fn run(&mut self) {
        net_node::spawn_receiver(Arc::clone(&self.node), self.tx.clone());

        loop {
            match self.rx.recv() {
                Ok(Event::Datagram(bytes)) => match Message::decode_for_proposer(&bytes) {
                    Ok(Message::Submit { value, .. }) => self.handle_submit(value),
                    Ok(Message::Phase1b {
                        inst,
                        rnd,
                        v_rnd,
                        v_val,
                    }) => self.handle_phase1b(inst, rnd, v_rnd, v_val),
                    Ok(Message::Restart { inst }) => self.handle_restart(inst),
                    Ok(other) => debug!("[P{}] unexpected message {:?}, dropping", self.id, other),
                    Err(e) => warn!("[P{}] dropping malformed datagram: {}", self.id, e),
                },
                Ok(Event::Timeout { instance, generation }) => {
                    self.handle_timeout(instance, generation)
                }
                Err(_) => return,
            }
        }
    }
}

// ---------------------------------------------------------------------
// Learner
// ---------------------------------------------------------------------

/// One slot of the decided log: the votes seen so far, and, once decided,
/// the agreed value. Immutable after `decided` is set.
#[derive(Default, Clone)]
struct LearnerEntry {
    votes: Vec<u16>,
    decided: bool,
    value: Option<u16>,
    /// Bumped each time a fresh learner-watchdog is armed for this entry,
    /// so a watchdog left over from a cleared, since-refilled entry is
    /// recognized as stale.
    generation: u64,
}

pub struct Learner {
    id: usize,
    log: Vec<LearnerEntry>,
    /// Number of prefix entries already decided and printed.
    learned: usize,
    node: Arc<dyn Transport>,
    acceptors_address: SocketAddrV4,
    learners_address: SocketAddrV4,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Learner {
    pub fn new(
        id: usize,
        learners_address: SocketAddrV4,
        acceptors_address: SocketAddrV4,
    ) -> Result<Self, BindError> {
        let node: Arc<dyn Transport> = Arc::new(NetNode::bind(&learners_address)?);
        let (tx, rx) = event::channel();
        Ok(Learner {
            id,
            log: Vec::new(),
            learned: 0,
            node,
            acceptors_address,
            learners_address,
            tx,
            rx,
        })
    }

    fn ensure(&mut self, idx: usize) {
        if self.log.len() <= idx {
            self.log.resize(idx + 1, LearnerEntry::default());
        }
    }

    fn handle_phase2b(&mut self, inst: u16, v_val: u16) {
        let idx = instance_index(inst);
        self.ensure(idx);
        if self.log[idx].decided {
            return;
        }

        let was_empty = self.log[idx].votes.is_empty();
        self.log[idx].votes.push(v_val);
        debug!(
            "[L{}] instance {} now has {} vote(s)",
            self.id,
            inst,
            self.log[idx].votes.len()
        );

        self.try_advance();

        if was_empty {
            self.arm_watchdog(idx);
        }
    }

    fn handle_learner_update(&mut self, inst: u16, value: u16) {
        let idx = instance_index(inst);
        self.ensure(idx);
        if !self.log[idx].decided {
            debug!(
                "[L{}] force-deciding instance {} = {} via catch-up",
                self.id, inst, value
            );
            self.log[idx].decided = true;
            self.log[idx].value = Some(value);
        }
        self.try_advance();
    }

    fn handle_catchup_request(&mut self, learner_id: u16) {
        if learner_id as usize == self.id {
            return;
        }
        debug!(
            "[L{}] answering CATCHUP_REQUEST from learner {}",
            self.id, learner_id
        );
        for k in 0..self.learned {
            if let Some(value) = self.log[k].value {
                self.send_to_learners(Message::LearnerUpdate {
                    inst: (k + 1) as u16,
                    value,
                });
            }
        }
    }

    fn handle_timeout(&mut self, idx: usize, generation: u64) {
        if idx >= self.log.len() || self.log[idx].generation != generation {
            return;
        }
        if self.log[idx].decided {
            return;
        }
        if self.log[idx].votes.len() < quorum(N_ACCEPTORS) {
            info!(
                "[L{}] instance {} stalled, clearing partial quorum and requesting resend",
                self.id,
                idx + 1
            );
            self.log[idx].votes.clear();
            self.send_to_acceptors(Message::Resend2b {
                inst: (idx + 1) as u16,
            });
        }
    }

    /// Advances `learned` over every contiguous decided (or newly
    /// decidable) prefix entry, printing each value exactly once in
    /// instance order.
    fn try_advance(&mut self) {
        while self.learned < self.log.len() {
            if self.log[self.learned].decided {
                self.learned += 1;
                continue;
            }
            match majority_value(&self.log[self.learned].votes, quorum(N_ACCEPTORS)) {
                Some(v) => {
                    self.log[self.learned].decided = true;
                    self.log[self.learned].value = Some(v);
                    println!("{}", v);
                    info!("[L{}] decided instance {} = {}", self.id, self.learned + 1, v);
                    self.learned += 1;
                }
                None => break,
            }
        }
    }

    fn arm_watchdog(&mut self, idx: usize) {
        self.log[idx].generation += 1;
        let generation = self.log[idx].generation;
        event::arm(self.tx.clone(), idx as u16, generation, TIMEOUT);
    }

    fn broadcast_catchup_request(&self) {
        self.send_to_learners(Message::CatchupRequest {
            learner_id: self.id as u16,
        });
    }

    fn send_to_learners(&self, m: Message) {
        match m.encode() {
            Ok(bytes) => self.node.send(&bytes, &self.learners_address),
            Err(e) => error!("[L{}] could not encode message: {}", self.id, e),
        }
    }

    fn send_to_acceptors(&self, m: Message) {
        match m.encode() {
            Ok(bytes) => self.node.send(&bytes, &self.acceptors_address),
            Err(e) => error!("[L{}] could not encode message: {}", self.id, e),
        }
    }
}

fn instance_index(inst: u16) -> usize {
    (inst as usize).saturating_sub(1)
}

fn majority_value(votes: &[u16], quorum: usize) -> Option<u16> {
    let mut counts: HashMap<u16, usize> = HashMap::new();
    for &v in votes {
        let count = counts.entry(v).or_insert(0);
        *count += 1;
        if *count >= quorum {
            return Some(v);
        }
    }
    None
}

impl Runnable for Learner {
    fn run(&mut self) {
        net_node::spawn_receiver(Arc::clone(&self.node), self.tx.clone());
        self.broadcast_catchup_request();

        loop {
            match self.rx.recv() {
                Ok(Event::Datagram(bytes)) => match Message::decode_for_learner(&bytes) {
                    Ok(Message::Phase2b { inst, v_val, .. }) => self.handle_phase2b(inst, v_val),
                    Ok(Message::LearnerUpdate { inst, value }) => {
                        self.handle_learner_update(inst, value)
                    }
                    Ok(Message::CatchupRequest { learner_id }) => {
                        self.handle_catchup_request(learner_id)
                    }
                    Ok(other) => debug!("[L{}] unexpected message {:?}, dropping", self.id, other),
                    Err(e) => warn!("[L{}] dropping malformed datagram: {}", self.id, e),
                },
                Ok(Event::Timeout { instance, generation }) => {
                    self.handle_timeout(instance as usize, generation)
                }
                Err(_) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A transport double that never receives anything and discards every
    /// send, so role state machines can be exercised without real
    /// multicast sockets.
    struct NullTransport;

    impl Transport for NullTransport {
        fn send(&self, _bytes: &[u8], _destination: &SocketAddrV4) {}
        fn recv(&self) -> Option<Vec<u8>> {
            None
        }
    }

    fn entry(votes: &[u16]) -> LearnerEntry {
        LearnerEntry {
            votes: votes.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_well_formed_lines() {
        assert_eq!(parse_submission("42"), Some(42));
        assert_eq!(parse_submission("  7  "), Some(7));
    }

    #[test]
    fn ignores_blank_and_malformed_lines() {
        assert_eq!(parse_submission(""), None);
        assert_eq!(parse_submission("   "), None);
        assert_eq!(parse_submission("not-a-number"), None);
    }

    #[test]
    fn majority_value_requires_quorum() {
        assert_eq!(majority_value(&[7, 7], 2), Some(7));
        assert_eq!(majority_value(&[7], 2), None);
        assert_eq!(majority_value(&[7, 8, 7], 2), Some(7));
    }

    #[test]
    fn learner_prints_prefix_in_order() {
        let mut learner = Learner {
            id: 1,
            log: vec![entry(&[]), entry(&[]), entry(&[])],
            learned: 0,
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.1.2:9000".parse().unwrap(),
            learners_address: "239.1.1.1:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };

        // instance 2 decides before instance 1: nothing should advance yet.
        learner.handle_phase2b(2, 8);
        learner.handle_phase2b(2, 8);
        assert_eq!(learner.learned, 0);

        // instance 1 now decides: both 1 and 2 should become printable.
        learner.handle_phase2b(1, 7);
        learner.handle_phase2b(1, 7);
        assert_eq!(learner.learned, 2);
        assert_eq!(learner.log[0].value, Some(7));
        assert_eq!(learner.log[1].value, Some(8));
    }

    #[test]
    fn duplicate_phase2b_after_decision_is_a_no_op() {
        let mut learner = Learner {
            id: 1,
            log: vec![entry(&[])],
            learned: 0,
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.1.4:9000".parse().unwrap(),
            learners_address: "239.1.1.3:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };

        learner.handle_phase2b(1, 5);
        learner.handle_phase2b(1, 5);
        assert_eq!(learner.learned, 1);
        assert_eq!(learner.log[0].value, Some(5));

        // a stray duplicate (or a minority value racing in after decision)
        // must not perturb the decided entry.
        learner.handle_phase2b(1, 9);
        assert_eq!(learner.log[0].value, Some(5));
        assert_eq!(learner.learned, 1);
    }

    #[test]
    fn catch_up_forces_decision_and_advances_prefix() {
        let mut learner = Learner {
            id: 2,
            log: Vec::new(),
            learned: 0,
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.1.6:9000".parse().unwrap(),
            learners_address: "239.1.1.5:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };

        learner.handle_learner_update(1, 10);
        learner.handle_learner_update(2, 20);
        learner.handle_learner_update(3, 30);

        assert_eq!(learner.learned, 3);
        assert_eq!(learner.log[0].value, Some(10));
        assert_eq!(learner.log[2].value, Some(30));
    }

    #[test]
    fn proposer_preserves_client_val_across_round_renewal() {
        let mut proposer = Proposer {
            id: 1,
            next_inst: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.2.2:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };

        proposer.prepare(1, 99, 1);
        assert_eq!(proposer.states[&1].client_val, Some(99));
        assert_eq!(proposer.states[&1].c_rnd, 1);

        // simulate a round renewal (watchdog fire or RESTART): c_rnd goes
        // up, Q/highest_v_rnd/c_val reset, but client_val must survive.
        proposer.handle_restart(1);
        assert_eq!(proposer.states[&1].client_val, Some(99));
        assert_eq!(proposer.states[&1].c_rnd, 2);
        assert_eq!(proposer.states[&1].q, 0);
    }

    #[test]
    fn proposer_ignores_stale_phase1b() {
        let mut proposer = Proposer {
            id: 1,
            next_inst: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.2.4:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };
        proposer.prepare(1, 5, 2);
        proposer.handle_phase1b(1, 1, 0, 0); // rnd 1 < c_rnd 2: stale
        assert_eq!(proposer.states[&1].q, 0);
    }

    #[test]
    fn proposer_proposes_client_value_when_no_prior_vote() {
        let mut proposer = Proposer {
            id: 1,
            next_inst: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.2.6:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };
        proposer.prepare(1, 5, 1);
        proposer.handle_phase1b(1, 1, 0, 0);
        proposer.handle_phase1b(1, 1, 0, 0);
        assert_eq!(proposer.states[&1].q, quorum(N_ACCEPTORS));
        assert_eq!(proposer.states[&1].c_val, 5);
    }

    #[test]
    fn proposer_adopts_highest_v_rnd_value() {
        let mut proposer = Proposer {
            id: 1,
            next_inst: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            acceptors_address: "239.1.2.8:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };
        proposer.prepare(1, 5, 3);
        proposer.handle_phase1b(1, 3, 1, 11);
        proposer.handle_phase1b(1, 3, 2, 22);
        assert_eq!(proposer.states[&1].c_val, 22);
    }

    #[test]
    fn acceptor_lattice_is_monotone() {
        let mut acceptor = Acceptor {
            id: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            proposers_address: "239.1.3.2:9000".parse().unwrap(),
            learners_address: "239.1.3.3:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };

        acceptor.handle_phase1a(1, 1);
        assert_eq!(acceptor.states[&1].rnd, 1);
        assert_eq!(acceptor.states[&1].vrnd, 0);

        acceptor.handle_phase2a(1, 1, 42);
        assert_eq!(acceptor.states[&1].vrnd, 1);
        assert_eq!(acceptor.states[&1].vval, 42);
        // rnd is untouched by PHASE_2A, per the spec's resolved open question.
        assert_eq!(acceptor.states[&1].rnd, 1);

        // a lower round never moves rnd or vrnd backwards.
        acceptor.handle_phase1a(1, 1);
        assert_eq!(acceptor.states[&1].rnd, 1);

        acceptor.handle_phase1a(1, 2);
        assert_eq!(acceptor.states[&1].rnd, 2);
        assert_eq!(acceptor.states[&1].vrnd, 1);
        assert_eq!(acceptor.states[&1].vval, 42);
    }

    #[test]
    fn acceptor_drops_stale_phase2a() {
        let mut acceptor = Acceptor {
            id: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            proposers_address: "239.1.3.5:9000".parse().unwrap(),
            learners_address: "239.1.3.6:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };
        acceptor.handle_phase1a(1, 5);
        acceptor.handle_phase2a(1, 3, 7); // c_rnd 3 < rnd 5: dropped
        assert_eq!(acceptor.states[&1].vrnd, 0);
        assert_eq!(acceptor.states[&1].vval, 0);
    }

    #[test]
    fn acceptor_resends_on_resend_2b_only_if_voted() {
        let mut acceptor = Acceptor {
            id: 1,
            states: HashMap::new(),
            node: Arc::new(NullTransport) as Arc<dyn Transport>,
            proposers_address: "239.1.3.8:9000".parse().unwrap(),
            learners_address: "239.1.3.9:9000".parse().unwrap(),
            tx: event::channel().0,
            rx: event::channel().1,
        };
        // no state at all yet: must not panic, must not send.
        acceptor.handle_resend_2b(1);

        acceptor.handle_phase1a(1, 1);
        acceptor.handle_resend_2b(1); // vrnd still 0: dropped.

        acceptor.handle_phase2a(1, 1, 9);
        acceptor.handle_resend_2b(1); // vrnd != 0: re-emitted (no panic).
    }
}
