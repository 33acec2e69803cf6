use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    /// Also require the claim type's issuer to submit appends
    pub require_type_issuer: bool,
}

#[cw_serde]
pub struct ClaimType {
    pub key: String,
    /// Creator of the type
    pub issuer: Addr,
    pub description: String,
    pub exists: bool,
    /// Creation timestamp
    pub created_at: u64,
}

#[cw_serde]
pub struct DidRecord {
    /// DID string (stored for listing, the key is its hash)
    pub did: String,
    /// Controlling Ethereum address, lowercase 0x-hex
    pub eth_owner: String,
    pub is_registered: bool,
    /// Advances on every accepted signature for this DID
    pub nonce: u64,
    pub registered_at: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Claim types indexed by key
pub const CLAIM_TYPES: Map<&str, ClaimType> = Map::new("claim_types");

/// DID registrations indexed by keccak256(did)
pub const DIDS: Map<&[u8], DidRecord> = Map::new("dids");

/// Global claim log: (did_hash, index) -> cid
pub const CLAIMS: Map<(&[u8], u64), String> = Map::new("claims");
pub const CLAIM_COUNT: Map<&[u8], u64> = Map::new("claim_count");
pub const LATEST_CID: Map<&[u8], String> = Map::new("latest_cid");

/// Per-type claim log: (did_hash, claim_type, index) -> cid
pub const TYPED_CLAIMS: Map<(&[u8], &str, u64), String> = Map::new("typed_claims");
pub const TYPED_CLAIM_COUNT: Map<(&[u8], &str), u64> = Map::new("typed_claim_count");
pub const TYPED_LATEST_CID: Map<(&[u8], &str), String> = Map::new("typed_latest_cid");
