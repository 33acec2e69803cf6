//! Message interface of the ENS registry and text resolver.
//!
//! The gateway only needs the subset below; the `ens-registry` contract
//! accepts these messages verbatim.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, HexBinary};

#[cw_serde]
pub enum RegistryQueryMsg {
    Owner { node: HexBinary },
    Resolver { node: HexBinary },
}

#[cw_serde]
pub enum ResolverQueryMsg {
    Text { node: HexBinary, key: String },
}

#[cw_serde]
pub enum ResolverExecuteMsg {
    SetText {
        node: HexBinary,
        key: String,
        value: String,
    },
}

#[cw_serde]
pub struct OwnerResponse {
    pub owner: Option<Addr>,
}

#[cw_serde]
pub struct ResolverResponse {
    pub resolver: Option<Addr>,
}

#[cw_serde]
pub struct TextResponse {
    pub value: String,
}
