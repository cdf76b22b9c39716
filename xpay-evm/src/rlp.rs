//! A minimal recursive-length-prefix encoder, just enough to build a legacy
//! signed transaction for `eth_sendRawTransaction`. Pure and dependency-free
//! so it can be tested against the handful of encodings the spec actually
//! exercises, rather than pulling in a full RLP crate for one call site.

/// Encodes a single byte string per the RLP item rules.
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return bytes.to_vec();
    }
    let mut out = encode_length(bytes.len(), 0x80);
    out.extend_from_slice(bytes);
    out
}

/// Encodes an unsigned integer as its minimal big-endian byte string, with
/// the RLP convention that zero encodes as the empty string.
#[must_use]
pub fn encode_uint(value: u128) -> Vec<u8> {
    if value == 0 {
        return encode_bytes(&[]);
    }
    let be = value.to_be_bytes();
    let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    encode_bytes(&be[first_nonzero..])
}

/// Encodes a list of already-RLP-encoded items.
#[must_use]
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.iter().flatten().copied().collect();
    let mut out = encode_length(payload.len(), 0xc0);
    out.extend_from_slice(&payload);
    out
}

fn encode_length(len: usize, offset: u8) -> Vec<u8> {
    if len < 56 {
        vec![offset + len as u8]
    } else {
        let be = (len as u64).to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[first_nonzero..];
        let mut out = vec![offset + 55 + len_bytes.len() as u8];
        out.extend_from_slice(len_bytes);
        out
    }
}
