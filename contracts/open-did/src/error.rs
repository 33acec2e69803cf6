use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Name and CID must not be empty")]
    EmptyInput {},

    #[error("Sender does not own this name")]
    NotOwner {},

    #[error("No resolver set for this name")]
    ResolverMissing {},

    #[error("DID already claimed for this name")]
    AlreadyExists {},

    #[error("Names and CIDs differ in length")]
    LengthMismatch {},

    #[error("Batch exceeds {max} items")]
    BatchTooLarge { max: usize },

    #[error("Claims registry address not configured")]
    LedgerNotConfigured {},

    #[error("Unknown reply id: {id}")]
    UnknownReplyId { id: u64 },
}
