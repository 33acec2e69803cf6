//! Signed-message digests for the claims ledger and signer recovery.
//!
//! Layouts (all fields concatenated without separators):
//! - register: `keccak256("Register" ‖ did ‖ contract ‖ nonce)`
//! - append:   `keccak256("Append" ‖ did ‖ cid ‖ claim_type ‖ contract ‖ nonce)`
//!
//! `contract` is the UTF-8 ledger address and `nonce` is a 32-byte big-endian
//! integer. Signers sign the digest as an Ethereum personal message.

use cosmwasm_std::Api;
use sha3::{Digest, Keccak256};

use crate::address::EthAddress;
use crate::hash::keccak256;

pub const REGISTER_TAG: &str = "Register";
pub const APPEND_TAG: &str = "Append";

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
const SIGNATURE_LENGTH: usize = 65;

/// Storage key of a DID
pub fn did_hash(did: &str) -> [u8; 32] {
    keccak256(did.as_bytes())
}

fn nonce_word(nonce: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&nonce.to_be_bytes());
    word
}

pub fn registration_digest(did: &str, contract: &str, nonce: u64) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(REGISTER_TAG.as_bytes());
    hasher.update(did.as_bytes());
    hasher.update(contract.as_bytes());
    hasher.update(nonce_word(nonce));
    hasher.finalize().into()
}

pub fn append_digest(
    did: &str,
    cid: &str,
    claim_type: &str,
    contract: &str,
    nonce: u64,
) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(APPEND_TAG.as_bytes());
    hasher.update(did.as_bytes());
    hasher.update(cid.as_bytes());
    hasher.update(claim_type.as_bytes());
    hasher.update(contract.as_bytes());
    hasher.update(nonce_word(nonce));
    hasher.finalize().into()
}

/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`
pub fn eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(digest);
    hasher.finalize().into()
}

/// Recover the Ethereum address that personal-signed `digest`.
///
/// `signature` is `r ‖ s ‖ v` with `v` in {0, 1, 27, 28}. Returns `None` for
/// a malformed signature; callers treat that the same as a signer mismatch.
pub fn recover_signer(api: &dyn Api, digest: &[u8; 32], signature: &[u8]) -> Option<EthAddress> {
    if signature.len() != SIGNATURE_LENGTH {
        return None;
    }
    let recovery_param = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return None,
    };
    let message_hash = eth_signed_message_hash(digest);
    let pubkey = api
        .secp256k1_recover_pubkey(&message_hash, &signature[..64], recovery_param)
        .ok()?;
    EthAddress::from_uncompressed_pubkey(&pubkey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestSigner;
    use cosmwasm_std::testing::MockApi;

    #[test]
    fn test_digests_bind_every_field() {
        let base = registration_digest("did:opendid:alice.eth", "contract0", 0);
        assert_ne!(base, registration_digest("did:opendid:bob.eth", "contract0", 0));
        assert_ne!(base, registration_digest("did:opendid:alice.eth", "contract1", 0));
        assert_ne!(base, registration_digest("did:opendid:alice.eth", "contract0", 1));

        let append = append_digest("did:opendid:alice.eth", "Qm1", "kyc", "contract0", 0);
        assert_ne!(append, base);
        assert_ne!(append, append_digest("did:opendid:alice.eth", "Qm2", "kyc", "contract0", 0));
        assert_ne!(append, append_digest("did:opendid:alice.eth", "Qm1", "aml", "contract0", 0));
    }

    #[test]
    fn test_nonce_word_layout() {
        let word = nonce_word(258);
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(word[30], 1);
        assert_eq!(word[31], 2);
    }

    #[test]
    fn test_recover_signer() {
        let api = MockApi::default();
        let signer = TestSigner::new(7);
        let digest = registration_digest("did:opendid:alice.eth", "contract0", 0);
        let sig = signer.sign(&digest);

        assert_eq!(recover_signer(&api, &digest, sig.as_slice()), Some(signer.address()));

        // Different digest recovers to someone else
        let other = registration_digest("did:opendid:alice.eth", "contract0", 1);
        assert_ne!(recover_signer(&api, &other, sig.as_slice()), Some(signer.address()));
    }

    #[test]
    fn test_recover_accepts_raw_recovery_id() {
        let api = MockApi::default();
        let signer = TestSigner::new(3);
        let digest = append_digest("did:opendid:bob.eth", "Qm1", "kyc", "contract0", 4);
        let mut sig = signer.sign(&digest).to_vec();
        sig[64] -= 27;
        assert_eq!(recover_signer(&api, &digest, &sig), Some(signer.address()));
    }

    #[test]
    fn test_recover_rejects_malformed() {
        let api = MockApi::default();
        let digest = [1u8; 32];
        assert_eq!(recover_signer(&api, &digest, &[0u8; 64]), None);
        assert_eq!(recover_signer(&api, &digest, &[]), None);

        let signer = TestSigner::new(9);
        let mut sig = signer.sign(&digest).to_vec();
        sig[64] = 5;
        assert_eq!(recover_signer(&api, &digest, &sig), None);
    }
}
