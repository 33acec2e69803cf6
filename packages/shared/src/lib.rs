// Shared types and utilities for the OpenDID claims contracts

pub mod address;
pub mod ens;
pub mod error;
pub mod hash;
pub mod message;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use address::EthAddress;
pub use error::SharedError;
pub use hash::{keccak256, label_hash, namehash, node_from_slice, subnode, Node, ZERO_NODE};
pub use message::{
    append_digest, did_hash, eth_signed_message_hash, recover_signer, registration_digest,
};

/// Prefix of every DID issued through the gateway
pub const DID_PREFIX: &str = "did:opendid:";

/// Text record key holding the DID on the ENS resolver
pub const TEXT_RECORD_KEY: &str = "opendid";

/// Build `did:opendid:<id>`
pub fn format_did(id: &str) -> String {
    format!("{}{}", DID_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_did() {
        assert_eq!(format_did("Qm123"), "did:opendid:Qm123");
        assert_eq!(format_did("alice.eth"), "did:opendid:alice.eth");
    }
}
