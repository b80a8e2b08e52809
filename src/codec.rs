//! The wire codec shared by every Paxos message: a sequence of 16-bit
//! unsigned chunks, big-endian, followed by a trailing 16-bit chunk giving
//! the number of chunks that preceded it.
//!
//! This mirrors the bit-packing scheme of the original implementation
//! (shift each chunk into a growing big integer, stash the chunk count in
//! the low 16 bits) without relying on an arbitrary-precision integer: we
//! just push fixed-width big-endian bytes instead.

use thiserror::Error;

/// The largest value a single chunk can hold.
pub const MAX_CHUNK: u32 = u16::MAX as u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("chunk value {0} does not fit in 16 bits")]
    OutOfRange(u32),
    #[error("message has {0} chunks, which does not fit in the 16-bit length trailer")]
    TooManyChunks(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram is empty")]
    Empty,
    #[error("datagram length {0} is not a whole number of 2-byte chunks")]
    Unaligned(usize),
    #[error("length trailer claims {claimed} chunks but only {available} preceded it")]
    LengthMismatch { claimed: usize, available: usize },
}

/// Encodes a sequence of integer chunks into the wire format.
///
/// Every element of `chunks` must fit in 16 bits.
pub fn encode(chunks: &[u32]) -> Result<Vec<u8>, EncodeError> {
    if chunks.len() > MAX_CHUNK as usize {
        return Err(EncodeError::TooManyChunks(chunks.len()));
    }

    let mut out = Vec::with_capacity((chunks.len() + 1) * 2);
    for &chunk in chunks {
        if chunk > MAX_CHUNK {
            return Err(EncodeError::OutOfRange(chunk));
        }
        out.extend_from_slice(&(chunk as u16).to_be_bytes());
    }
    out.extend_from_slice(&(chunks.len() as u16).to_be_bytes());
    Ok(out)
}

/// Decodes a datagram produced by [`encode`] back into its chunk sequence.
pub fn decode(bytes: &[u8]) -> Result<Vec<u32>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::Unaligned(bytes.len()));
    }

    let total_chunks = bytes.len() / 2;
    let trailer_index = total_chunks - 1;
    let claimed = read_chunk(bytes, trailer_index) as usize;
    let available = trailer_index;

    if claimed != available {
        return Err(DecodeError::LengthMismatch { claimed, available });
    }

    Ok((0..claimed).map(|i| read_chunk(bytes, i)).collect())
}

fn read_chunk(bytes: &[u8], index: usize) -> u32 {
    u16::from_be_bytes([bytes[index * 2], bytes[index * 2 + 1]]) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_chunks() {
        let xs = vec![1u32, 0, 65535, 42, 7];
        let encoded = encode(&xs).unwrap();
        assert_eq!(decode(&encoded).unwrap(), xs);
    }

    #[test]
    fn round_trips_empty_payload() {
        let xs: Vec<u32> = vec![];
        let encoded = encode(&xs).unwrap();
        assert_eq!(decode(&encoded).unwrap(), xs);
    }

    #[test]
    fn rejects_out_of_range_chunk() {
        assert_eq!(encode(&[65536]), Err(EncodeError::OutOfRange(65536)));
    }

    #[test]
    fn rejects_empty_datagram() {
        assert_eq!(decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn rejects_unaligned_datagram() {
        assert_eq!(decode(&[0, 0, 1]), Err(DecodeError::Unaligned(3)));
    }

    #[test]
    fn rejects_truncated_datagram() {
        // trailer claims 3 preceding chunks but only 1 is present
        let bytes = encode(&[7]).unwrap();
        let mut truncated = bytes.clone();
        let len = truncated.len();
        truncated[len - 2..].copy_from_slice(&3u16.to_be_bytes());
        assert_eq!(
            decode(&truncated),
            Err(DecodeError::LengthMismatch {
                claimed: 3,
                available: 1,
            })
        );
    }
}
