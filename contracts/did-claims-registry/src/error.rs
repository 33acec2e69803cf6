use cosmwasm_std::StdError;
use opendid_shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    InvalidAddress(#[from] SharedError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("DID must not be empty")]
    EmptyDID {},

    #[error("CID must not be empty")]
    EmptyCID {},

    #[error("Claim type must not be empty")]
    EmptyClaimType {},

    #[error("Claim type key must not be empty")]
    EmptyKey {},

    #[error("Claim type already exists")]
    AlreadyExists {},

    #[error("Claim type not found")]
    NotFound {},

    #[error("DID already registered")]
    AlreadyRegistered {},

    #[error("DID not registered")]
    NotRegistered {},

    #[error("Unknown claim type")]
    UnknownClaimType {},

    #[error("Sender is not the issuer of this claim type")]
    NotIssuer {},

    #[error("Invalid range")]
    InvalidRange {},
}
