use std::fmt;
use std::str::FromStr;

use crate::error::SharedError;
use crate::hash::keccak256;

/// 20-byte Ethereum account address.
///
/// Parsed case-insensitively with or without the `0x` prefix and always
/// rendered as lowercase `0x`-prefixed hex, which is the form stored on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EthAddress(pub [u8; 20]);

impl EthAddress {
    /// Address of an uncompressed SEC1 public key (`0x04 ‖ x ‖ y`)
    pub fn from_uncompressed_pubkey(pubkey: &[u8]) -> Option<Self> {
        if pubkey.len() != 65 || pubkey[0] != 0x04 {
            return None;
        }
        let hash = keccak256(&pubkey[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Some(EthAddress(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for EthAddress {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if trimmed.len() != 40 {
            return Err(SharedError::InvalidAddress(s.to_string()));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(trimmed, &mut out)
            .map_err(|_| SharedError::InvalidAddress(s.to_string()))?;
        Ok(EthAddress(out))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
