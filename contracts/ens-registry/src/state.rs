use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::Map;

#[cw_serde]
pub struct NodeRecord {
    /// Controller of the node and all text records under it
    pub owner: Addr,
    /// Resolver serving the node's records
    pub resolver: Option<Addr>,
}

/// Registry records indexed by node
pub const RECORDS: Map<&[u8], NodeRecord> = Map::new("records");

/// (owner, operator) -> approved
pub const OPERATORS: Map<(&Addr, &Addr), bool> = Map::new("operators");

/// Text records indexed by (node, key)
pub const TEXTS: Map<(&[u8], &str), String> = Map::new("texts");
