use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, HexBinary};

#[cw_serde]
#[derive(Default)]
pub struct InstantiateMsg {
    /// Restrict appends under a claim type to that type's issuer
    pub require_type_issuer: Option<bool>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a new claim type owned by the sender
    CreateClaimType { key: String, description: String },
    /// Bind a DID to an Ethereum address proven by signature
    RegisterDid {
        did: String,
        owner: String,
        signature: HexBinary,
    },
    /// Append a CID under a claim type, signed by the DID owner
    AppendClaim {
        did: String,
        cid: String,
        claim_type: String,
        signature: HexBinary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    // Claim types
    #[returns(ExistsResponse)]
    ClaimTypeExists { key: String },

    #[returns(ClaimTypeResponse)]
    ClaimType { key: String },

    #[returns(ClaimTypesResponse)]
    ListClaimTypes {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    // Registration
    #[returns(RegisteredResponse)]
    IsRegistered { did: String },

    #[returns(DidOwnerResponse)]
    DidOwner { did: String },

    #[returns(NonceResponse)]
    Nonce { did: String },

    /// Digest to sign for `RegisterDid` at the current nonce
    #[returns(MessageResponse)]
    RegistrationMessage { did: String },

    /// Digest to sign for `AppendClaim` at the current nonce
    #[returns(MessageResponse)]
    AppendMessage {
        did: String,
        cid: String,
        claim_type: String,
    },

    // Global claim log
    #[returns(CidResponse)]
    Claim { did: String, index: u64 },

    #[returns(CidsResponse)]
    AllClaims { did: String },

    #[returns(CidsResponse)]
    ClaimsRange { did: String, start: u64, end: u64 },

    #[returns(CountResponse)]
    ClaimsCount { did: String },

    #[returns(CidResponse)]
    LatestCid { did: String },

    // Per-type claim log
    #[returns(CidResponse)]
    ClaimByType {
        did: String,
        claim_type: String,
        index: u64,
    },

    #[returns(CidsResponse)]
    AllClaimsByType { did: String, claim_type: String },

    #[returns(CidsResponse)]
    ClaimsRangeByType {
        did: String,
        claim_type: String,
        start: u64,
        end: u64,
    },

    #[returns(CountResponse)]
    ClaimsCountByType { did: String, claim_type: String },

    #[returns(CidResponse)]
    LatestCidByType { did: String, claim_type: String },

    #[returns(ExistsResponse)]
    HasClaimsOfType { did: String, claim_type: String },
}

// Response types

#[cw_serde]
pub struct ConfigResponse {
    pub require_type_issuer: bool,
}

#[cw_serde]
pub struct ExistsResponse {
    pub exists: bool,
}

#[cw_serde]
pub struct ClaimTypeResponse {
    pub key: String,
    pub issuer: Addr,
    pub description: String,
    pub exists: bool,
    pub created_at: u64,
}

#[cw_serde]
pub struct ClaimTypesResponse {
    pub claim_types: Vec<ClaimTypeResponse>,
}

#[cw_serde]
pub struct RegisteredResponse {
    pub registered: bool,
}

#[cw_serde]
pub struct DidOwnerResponse {
    pub owner: Option<String>,
}

#[cw_serde]
pub struct NonceResponse {
    pub nonce: u64,
}

#[cw_serde]
pub struct MessageResponse {
    pub did: String,
    pub nonce: u64,
    /// Application digest
    pub message_hash: HexBinary,
    /// Digest wrapped in the Ethereum personal-message prefix
    pub eth_signed_message_hash: HexBinary,
}

#[cw_serde]
pub struct CidResponse {
    pub cid: String,
}

#[cw_serde]
pub struct CidsResponse {
    pub cids: Vec<String>,
}

#[cw_serde]
pub struct CountResponse {
    pub count: u64,
}
