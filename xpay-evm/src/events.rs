//! ERC-20 `Transfer` log decoding, kept free of any RPC client so it can be
//! tested against fixture logs.

use sha3::{Digest, Keccak256};

use xpay_core::address::Address;
use xpay_core::chain::TokenBalanceDelta;

/// The well-known `keccak256("Transfer(address,address,uint256)")` topic
/// every ERC-20 transfer log is indexed under.
#[must_use]
pub fn transfer_topic0() -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"Transfer(address,address,uint256)");
    hasher.finalize().into()
}

/// A single EVM log entry, already hex-decoded out of the RPC response.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// The contract address that emitted the log (the token's address).
    pub address: [u8; 20],
    /// Indexed topics, `topics[0]` being the event signature hash.
    pub topics: Vec<[u8; 32]>,
    /// The ABI-encoded, non-indexed event data.
    pub data: Vec<u8>,
}

/// Decodes `log` as an ERC-20 `Transfer` event into the pair of balance
/// deltas it implies, or `None` if `log` isn't a well-formed transfer log.
#[must_use]
pub fn decode_transfer_log(log: &RawLog) -> Option<[TokenBalanceDelta; 2]> {
    if log.topics.len() != 3 || log.topics[0] != transfer_topic0() {
        return None;
    }
    if log.data.len() != 32 {
        return None;
    }
    let from = topic_to_address(&log.topics[1]);
    let to = topic_to_address(&log.topics[2]);
    let amount = u128::from_be_bytes(log.data[16..32].try_into().ok()?);
    let mint = Address::Evm(log.address);
    Some([
        TokenBalanceDelta {
            mint_or_contract: mint,
            owner: Address::Evm(from),
            delta: -i128::try_from(amount).unwrap_or(i128::MAX),
        },
        TokenBalanceDelta {
            mint_or_contract: mint,
            owner: Address::Evm(to),
            delta: i128::try_from(amount).unwrap_or(i128::MAX),
        },
    ])
}

/// EVM addresses are left-padded to 32 bytes when used as log topics; the
/// address itself is the low 20 bytes.
fn topic_to_address(topic: &[u8; 32]) -> [u8; 20] {
    let mut address = [0u8; 20];
    address.copy_from_slice(&topic[12..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic0_is_stable_across_calls() {
        assert_eq!(transfer_topic0(), transfer_topic0());
        assert_eq!(transfer_topic0().len(), 32);
    }

    #[test]
    fn decodes_a_well_formed_transfer_log() {
        let from = [1u8; 20];
        let to = [2u8; 20];
        let mut from_topic = [0u8; 32];
        from_topic[12..].copy_from_slice(&from);
        let mut to_topic = [0u8; 32];
        to_topic[12..].copy_from_slice(&to);
        let mut data = [0u8; 32];
        data[16..].copy_from_slice(&1_000u128.to_be_bytes());

        let log = RawLog {
            address: [9u8; 20],
            topics: vec![transfer_topic0(), from_topic, to_topic],
            data: data.to_vec(),
        };
        let deltas = decode_transfer_log(&log).unwrap();
        assert_eq!(deltas[0].owner, Address::Evm(from));
        assert_eq!(deltas[0].delta, -1_000);
        assert_eq!(deltas[1].owner, Address::Evm(to));
        assert_eq!(deltas[1].delta, 1_000);
    }

    #[test]
    fn rejects_logs_with_wrong_topic_count() {
        let log = RawLog {
            address: [0u8; 20],
            topics: vec![transfer_topic0()],
            data: vec![0u8; 32],
        };
        assert!(decode_transfer_log(&log).is_none());
    }
}
