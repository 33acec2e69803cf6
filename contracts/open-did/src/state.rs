use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, HexBinary};
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    /// May update the configuration
    pub admin: Addr,
    /// ENS registry consulted for name ownership and resolvers
    pub ens_registry: Addr,
    /// Claims ledger the signed messages are bound to
    pub claims_registry: Option<Addr>,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// A batch item whose resolver write is in flight
#[cw_serde]
pub struct PendingClaim {
    pub name: String,
    pub node: HexBinary,
    pub did: String,
    pub owner: Addr,
}

/// Batch items awaiting their reply, keyed by reply id
pub const PENDING_CLAIMS: Map<u64, PendingClaim> = Map::new("pending_claims");
