use cosmwasm_std::StdError;
use opendid_shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Shared(#[from] SharedError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Label must not be empty")]
    EmptyLabel {},
}
