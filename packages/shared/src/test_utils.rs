//! Deterministic secp256k1 signer for contract tests.

use cosmwasm_std::HexBinary;
use k256::ecdsa::SigningKey;

use crate::address::EthAddress;
use crate::hash::keccak256;
use crate::message::eth_signed_message_hash;

pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    /// Key derived from `seed`; equal seeds give equal keys.
    pub fn new(seed: u8) -> Self {
        let secret = keccak256(&[b'k', b'e', b'y', seed]);
        let key = SigningKey::from_slice(&secret).expect("valid secp256k1 scalar");
        TestSigner { key }
    }

    pub fn address(&self) -> EthAddress {
        let point = self.key.verifying_key().to_encoded_point(false);
        EthAddress::from_uncompressed_pubkey(point.as_bytes()).expect("uncompressed point")
    }

    /// Personal-sign `digest`, returning `r ‖ s ‖ v` with `v` in {27, 28}.
    pub fn sign(&self, digest: &[u8; 32]) -> HexBinary {
        let hash = eth_signed_message_hash(digest);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .expect("signing never fails for a 32-byte prehash");
        let mut out = signature.to_bytes().to_vec();
        out.push(recovery_id.to_byte() + 27);
        HexBinary::from(out)
    }
}
