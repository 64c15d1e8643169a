//! External ledger contract interface.
//!
//! The registry of videos, ownership and payments lives in an on-chain
//! contract. This crate only consumes it through [`Ledger`]; state-changing
//! calls take the signing account and return once the transaction settled.

mod memory;
mod types;

pub use memory::MemoryLedger;
pub use types::{
    Address, AddressError, AmountError, NewListing, TxReceipt, VideoId, VideoRecord, Wei,
};

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The signer declined or the node refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
    /// The contract call reverted.
    #[error("execution reverted: {0}")]
    Reverted(String),
    #[error("video {0} does not exist")]
    NotFound(VideoId),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn videos_count(&self) -> Result<u64, LedgerError>;

    async fn get_video(&self, id: VideoId) -> Result<VideoRecord, LedgerError>;

    async fn user_videos(&self, owner: &Address) -> Result<Vec<VideoId>, LedgerError>;

    async fn upload_video(&self, from: &Address, listing: &NewListing) -> Result<TxReceipt, LedgerError>;

    /// Pay `value` to unlock `id` for `from`; the contract forwards it to the owner.
    async fn pay_to_watch(&self, from: &Address, id: VideoId, value: Wei) -> Result<TxReceipt, LedgerError>;

    async fn has_user_paid(&self, id: VideoId, user: &Address) -> Result<bool, LedgerError>;

    async fn remove_video(&self, from: &Address, id: VideoId) -> Result<TxReceipt, LedgerError>;
}
