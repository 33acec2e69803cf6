//! Keccak-256 and the ENS namehash algorithm.

use sha3::{Digest, Keccak256};

use crate::error::SharedError;

/// 32-byte ENS node identifier
pub type Node = [u8; 32];

/// Root of the ENS tree
pub const ZERO_NODE: Node = [0u8; 32];

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash of a single label (`keccak256(label)`)
pub fn label_hash(label: &str) -> [u8; 32] {
    keccak256(label.as_bytes())
}

/// Child node of `parent` for `label`: `keccak256(parent ‖ keccak256(label))`
pub fn subnode(parent: &Node, label: &str) -> Node {
    let mut hasher = Keccak256::new();
    hasher.update(parent);
    hasher.update(label_hash(label));
    hasher.finalize().into()
}

/// ENS namehash. Labels are folded from the rightmost (TLD) to the leftmost,
/// so `namehash("a.b.eth") = subnode(subnode(subnode(0, "eth"), "b"), "a")`.
/// The empty name maps to the zero node.
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return ZERO_NODE;
    }
    name.rsplit('.')
        .fold(ZERO_NODE, |node, label| subnode(&node, label))
}

/// Convert raw bytes into a node, rejecting anything that is not 32 bytes long
pub fn node_from_slice(bytes: &[u8]) -> Result<Node, SharedError> {
    bytes
        .try_into()
        .map_err(|_| SharedError::InvalidNode(bytes.len()))
}
