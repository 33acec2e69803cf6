use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, HexBinary};

pub use did_claims_registry::msg::MessageResponse;

#[cw_serde]
pub struct InstantiateMsg {
    pub ens_registry: String,
    pub claims_registry: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Publish `did:opendid:<cid>` for a name the sender owns
    ClaimDid { name: String, cid: String },
    /// Overwrite the DID of a name
    UpdateDid { name: String, cid: String },
    /// Clear the DID of a name
    RevokeDid { name: String },
    /// Claim several names, skipping the ones that fail
    BatchClaimDid { names: Vec<String>, cids: Vec<String> },
    /// Admin only
    UpdateConfig { claims_registry: Option<String> },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(NamehashResponse)]
    Namehash { name: String },

    #[returns(DidResponse)]
    GetDid { name: String },

    #[returns(HasDidResponse)]
    HasDid { name: String },

    /// Registration digest for `did:opendid:<name>`, gated on `claimant`
    /// owning the name
    #[returns(MessageResponse)]
    RegistrationMessage { name: String, claimant: String },

    /// Append digest for `did:opendid:<name>`, gated on `claimant` owning
    /// the name
    #[returns(MessageResponse)]
    AppendMessage {
        name: String,
        claimant: String,
        cid: String,
        claim_type: String,
    },
}

// Response types

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub ens_registry: Addr,
    pub claims_registry: Option<Addr>,
}

#[cw_serde]
pub struct NamehashResponse {
    pub node: HexBinary,
}

#[cw_serde]
pub struct DidResponse {
    pub did: String,
}

#[cw_serde]
pub struct HasDidResponse {
    pub has_did: bool,
}
