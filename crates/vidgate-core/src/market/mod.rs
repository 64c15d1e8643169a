//! Marketplace operations over a wallet session: catalog listing, payment
//! gating, publishing and removal.
//!
//! Ledger failures are surfaced verbatim and never retried here: resubmitting
//! a transaction could pay twice.

mod access;
mod catalog;
mod format;
mod publish;

pub use access::{access, pay_to_watch, remove, Access};
pub use catalog::{catalog, user_videos};
pub use format::{format_ether, parse_ether, short_address};
pub use publish::{publish, Published, UploadRequest};

use crate::ledger::{AmountError, LedgerError, VideoId};
use crate::pinning::PinningError;
use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pinning(#[from] PinningError),
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error("{0}")]
    Invalid(String),
    #[error("video {0} was removed by its owner")]
    Removed(VideoId),
    #[error("background task failed: {0}")]
    Task(String),
}
