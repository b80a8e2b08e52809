//! The typed protocol messages of the Multi-Paxos wire format, built on top
//! of the chunk codec in `codec`.
//!
//! Tag `1` is overloaded: it means PHASE_1A or PHASE_1B depending on
//! whether a proposer or an acceptor is decoding it, and it also means
//! LEARNER_UPDATE on the learners group. The spec resolves this overload by
//! which multicast group the datagram arrived on rather than by the tag
//! alone, so decoding here is role-scoped: each role has its own
//! `decode_for_*` entry point that only ever constructs the messages that
//! role can legally receive.

use thiserror::Error;

use crate::codec::{self, DecodeError, EncodeError};

pub const TAG_SUBMIT: u32 = 0;
pub const TAG_PHASE1: u32 = 1;
pub const TAG_PHASE2: u32 = 2;
pub const TAG_CATCHUP: u32 = 3;
pub const TAG_RESEND_2B: u32 = 4;
pub const TAG_RESTART: u32 = 5;

/// A decoded Paxos datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// client -> proposer
    Submit { inst: u16, value: u16 },
    /// proposer -> acceptor
    Phase1a { inst: u16, c_rnd: u16 },
    /// acceptor -> proposer
    Phase1b {
        inst: u16,
        rnd: u16,
        v_rnd: u16,
        v_val: u16,
    },
    /// proposer -> acceptor
    Phase2a { inst: u16, c_rnd: u16, c_val: u16 },
    /// acceptor -> learner
    Phase2b { inst: u16, v_rnd: u16, v_val: u16 },
    /// learner -> learners (broadcast)
    CatchupRequest { learner_id: u16 },
    /// learner -> learners, answers CatchupRequest
    LearnerUpdate { inst: u16, value: u16 },
    /// learner -> acceptors
    Resend2b { inst: u16 },
    /// acceptor -> proposer
    Restart { inst: u16 },
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("unrecognized message on the {group} group: tag {tag} with {len} chunks")]
    UnknownShape {
        group: &'static str,
        tag: u32,
        len: usize,
    },
}

impl Message {
    fn to_chunks(self) -> Vec<u32> {
        match self {
            Message::Submit { inst, value } => vec![inst as u32, TAG_SUBMIT, value as u32],
            Message::Phase1a { inst, c_rnd } => vec![inst as u32, TAG_PHASE1, c_rnd as u32],
            Message::Phase1b {
                inst,
                rnd,
                v_rnd,
                v_val,
            } => vec![inst as u32, TAG_PHASE1, rnd as u32, v_rnd as u32, v_val as u32],
            Message::Phase2a { inst, c_rnd, c_val } => {
                vec![inst as u32, TAG_PHASE2, c_rnd as u32, c_val as u32]
            }
            Message::Phase2b { inst, v_rnd, v_val } => {
                vec![inst as u32, TAG_PHASE2, v_rnd as u32, v_val as u32]
            }
            Message::CatchupRequest { learner_id } => vec![learner_id as u32, TAG_CATCHUP],
            Message::LearnerUpdate { inst, value } => {
                vec![inst as u32, TAG_PHASE1, value as u32]
            }
            Message::Resend2b { inst } => vec![inst as u32, TAG_RESEND_2B],
            Message::Restart { inst } => vec![inst as u32, TAG_RESTART],
        }
    }

    /// Encodes this message into the wire format.
    pub fn encode(self) -> Result<Vec<u8>, WireError> {
        Ok(codec::encode(&self.to_chunks())?)
    }

    /// Decodes a datagram received on the acceptors group.
    pub fn decode_for_acceptor(bytes: &[u8]) -> Result<Message, WireError> {
        let chunks = codec::decode(bytes)?;
        match (chunks.get(1).copied(), chunks.len()) {
            (Some(TAG_PHASE1), 3) => Ok(Message::Phase1a {
                inst: chunks[0] as u16,
                c_rnd: chunks[2] as u16,
            }),
            (Some(TAG_PHASE2), 4) => Ok(Message::Phase2a {
                inst: chunks[0] as u16,
                c_rnd: chunks[2] as u16,
                c_val: chunks[3] as u16,
            }),
            (Some(TAG_RESEND_2B), 2) => Ok(Message::Resend2b {
                inst: chunks[0] as u16,
            }),
            (tag, len) => Err(WireError::UnknownShape {
                group: "acceptors",
                tag: tag.unwrap_or(u32::MAX),
                len,
            }),
        }
    }

    /// Decodes a datagram received on the proposers group.
    pub fn decode_for_proposer(bytes: &[u8]) -> Result<Message, WireError> {
        let chunks = codec::decode(bytes)?;
        match (chunks.get(1).copied(), chunks.len()) {
            (Some(TAG_SUBMIT), 3) => Ok(Message::Submit {
                inst: chunks[0] as u16,
                value: chunks[2] as u16,
            }),
            (Some(TAG_PHASE1), 5) => Ok(Message::Phase1b {
                inst: chunks[0] as u16,
                rnd: chunks[2] as u16,
                v_rnd: chunks[3] as u16,
                v_val: chunks[4] as u16,
            }),
            (Some(TAG_RESTART), 2) => Ok(Message::Restart {
                inst: chunks[0] as u16,
            }),
            (tag, len) => Err(WireError::UnknownShape {
                group: "proposers",
                tag: tag.unwrap_or(u32::MAX),
                len,
            }),
        }
    }

    /// Decodes a datagram received on the learners group.
    pub fn decode_for_learner(bytes: &[u8]) -> Result<Message, WireError> {
        let chunks = codec::decode(bytes)?;
        match (chunks.get(1).copied(), chunks.len()) {
            (Some(TAG_PHASE2), 4) => Ok(Message::Phase2b {
                inst: chunks[0] as u16,
                v_rnd: chunks[2] as u16,
                v_val: chunks[3] as u16,
            }),
            (Some(TAG_PHASE1), 3) => Ok(Message::LearnerUpdate {
                inst: chunks[0] as u16,
                value: chunks[2] as u16,
            }),
            _ => {
                // CatchupRequest has no phase tag at chunks[1]; it's
                // (learner_id, TAG_CATCHUP) instead of (inst, tag, ...).
                if chunks.len() == 2 && chunks.get(1).copied() == Some(TAG_CATCHUP) {
                    Ok(Message::CatchupRequest {
                        learner_id: chunks[0] as u16,
                    })
                } else {
                    Err(WireError::UnknownShape {
                        group: "learners",
                        tag: chunks.get(1).copied().unwrap_or(u32::MAX),
                        len: chunks.len(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_acceptor_message() {
        for m in [
            Message::Phase1a { inst: 1, c_rnd: 3 },
            Message::Phase2a {
                inst: 1,
                c_rnd: 3,
                c_val: 42,
            },
            Message::Resend2b { inst: 7 },
        ] {
            let bytes = m.encode().unwrap();
            assert_eq!(Message::decode_for_acceptor(&bytes).unwrap(), m);
        }
    }

    #[test]
    fn round_trips_every_proposer_message() {
        for m in [
            Message::Submit { inst: 1, value: 42 },
            Message::Phase1b {
                inst: 1,
                rnd: 3,
                v_rnd: 0,
                v_val: 0,
            },
            Message::Restart { inst: 7 },
        ] {
            let bytes = m.encode().unwrap();
            assert_eq!(Message::decode_for_proposer(&bytes).unwrap(), m);
        }
    }

    #[test]
    fn round_trips_every_learner_message() {
        for m in [
            Message::Phase2b {
                inst: 1,
                v_rnd: 3,
                v_val: 42,
            },
            Message::CatchupRequest { learner_id: 2 },
            Message::LearnerUpdate { inst: 1, value: 42 },
        ] {
            let bytes = m.encode().unwrap();
            assert_eq!(Message::decode_for_learner(&bytes).unwrap(), m);
        }
    }

    #[test]
    fn overloaded_tag_1_resolves_by_group() {
        // A Phase1a on the acceptors group and a LearnerUpdate on the
        // learners group share the same tag and chunk count; only the
        // receiving role disambiguates them.
        let phase1a = Message::Phase1a { inst: 5, c_rnd: 9 };
        let update = Message::LearnerUpdate {
            inst: 5,
            value: 9,
        };
        assert_eq!(phase1a.to_chunks(), update.to_chunks());

        let bytes = phase1a.encode().unwrap();
        assert_eq!(Message::decode_for_acceptor(&bytes).unwrap(), phase1a);
        assert_eq!(Message::decode_for_learner(&bytes).unwrap(), update);
    }

    #[test]
    fn rejects_unknown_shape() {
        let bytes = codec::encode(&[1, 9, 9, 9]).unwrap();
        assert!(matches!(
            Message::decode_for_acceptor(&bytes),
            Err(WireError::UnknownShape { .. })
        ));
    }
}
