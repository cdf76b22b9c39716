//! Network-scoped addresses.
//!
//! §3: "opaque, network-scoped; equality is case-insensitive for EVM,
//! byte-exact for account-model." Both families are stored as raw bytes, so
//! equality is always a byte comparison — the "case-insensitive" requirement
//! is about the *textual* EVM form (mixed-case checksummed hex), which is
//! handled entirely in [`Address::parse`] by lower-casing before decoding.

use std::fmt;

use crate::network::NetworkFamily;

/// An address on one of the two supported chain families.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// A 32-byte account-model public key.
    Account([u8; 32]),
    /// A 20-byte EVM address.
    Evm([u8; 20]),
}

/// Error returned when an address string does not match its family's shape.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AddressParseError {
    /// The base58 string did not decode to exactly 32 bytes.
    #[error("invalid account address {0:?}: {1}")]
    Account(String, bs58::decode::Error),
    /// The hex string was not `0x` + 40 hex chars.
    #[error("invalid evm address {0:?}")]
    Evm(String),
}

impl Address {
    /// The chain family this address belongs to.
    #[must_use]
    pub const fn family(self) -> NetworkFamily {
        match self {
            Self::Account(_) => NetworkFamily::Account,
            Self::Evm(_) => NetworkFamily::Evm,
        }
    }

    /// Parses an address string for the given network family.
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError`] if `s` does not decode to the byte
    /// length expected for `family`.
    pub fn parse(s: &str, family: NetworkFamily) -> Result<Self, AddressParseError> {
        match family {
            NetworkFamily::Account => {
                let bytes = bs58::decode(s)
                    .into_vec()
                    .map_err(|e| AddressParseError::Account(s.to_owned(), e))?;
                let array: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| AddressParseError::Account(s.to_owned(), bs58::decode::Error::BufferTooSmall))?;
                Ok(Self::Account(array))
            }
            NetworkFamily::Evm => {
                let hex_part = s.strip_prefix("0x").unwrap_or(s);
                if hex_part.len() != 40 {
                    return Err(AddressParseError::Evm(s.to_owned()));
                }
                let bytes = hex::decode(hex_part).map_err(|_| AddressParseError::Evm(s.to_owned()))?;
                let array: [u8; 20] = bytes
                    .try_into()
                    .map_err(|_| AddressParseError::Evm(s.to_owned()))?;
                Ok(Self::Evm(array))
            }
        }
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Account(bytes) => bytes,
            Self::Evm(bytes) => bytes,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(bytes) => write!(f, "{}", bs58::encode(bytes).into_string()),
            Self::Evm(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_parse_is_case_insensitive() {
        let lower = Address::parse("0x00112233445566778899aabbccddeeff0011223", NetworkFamily::Evm)
            .unwrap();
        let upper = Address::parse("0x00112233445566778899AABBCCDDEEFF0011223", NetworkFamily::Evm)
            .unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn evm_rejects_wrong_length() {
        assert!(Address::parse("0x1234", NetworkFamily::Evm).is_err());
    }

    #[test]
    fn account_roundtrip() {
        let bytes = [7u8; 32];
        let s = bs58::encode(bytes).into_string();
        let parsed = Address::parse(&s, NetworkFamily::Account).unwrap();
        assert_eq!(parsed, Address::Account(bytes));
        assert_eq!(parsed.to_string(), s);
    }
}
