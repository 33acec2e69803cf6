use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::HexBinary;

pub use opendid_shared::ens::{OwnerResponse, ResolverResponse, TextResponse};

#[cw_serde]
pub struct InstantiateMsg {}

#[cw_serde]
pub enum ExecuteMsg {
    /// Transfer a node to a new owner
    SetOwner { node: HexBinary, owner: String },
    /// Create or reassign `label` under `node`
    SetSubnodeOwner {
        node: HexBinary,
        label: String,
        owner: String,
    },
    /// Point a node at a resolver (None clears it)
    SetResolver {
        node: HexBinary,
        resolver: Option<String>,
    },
    /// Allow `operator` to manage every node the sender owns
    SetApprovalForAll { operator: String, approved: bool },
    /// Write a text record
    SetText {
        node: HexBinary,
        key: String,
        value: String,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(OwnerResponse)]
    Owner { node: HexBinary },

    #[returns(ResolverResponse)]
    Resolver { node: HexBinary },

    #[returns(TextResponse)]
    Text { node: HexBinary, key: String },

    #[returns(ApprovalResponse)]
    IsApprovedForAll { owner: String, operator: String },
}

#[cw_serde]
pub struct ApprovalResponse {
    pub approved: bool,
}
