use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    #[error("Invalid node: expected 32 bytes, got {0}")]
    InvalidNode(usize),
}
