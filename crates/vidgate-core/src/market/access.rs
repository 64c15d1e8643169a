//! Payment gating.

use crate::content_id::ContentId;
use crate::ledger::{TxReceipt, VideoId, VideoRecord, Wei};
use crate::session::Session;

use super::MarketError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Free, owned by the viewer, or already paid for.
    Granted { content_id: ContentId },
    PaymentRequired { price: Wei },
}

async fn listed(session: &Session, id: VideoId) -> Result<(VideoRecord, ContentId), MarketError> {
    let record = session.ledger().get_video(id).await?;
    let content_id = record.content_id.clone().ok_or(MarketError::Removed(id))?;
    Ok((record, content_id))
}

/// Whether the connected viewer may watch `id`.
pub async fn access(session: &Session, id: VideoId) -> Result<Access, MarketError> {
    let viewer = session.signer()?;
    let (record, content_id) = listed(session, id).await?;
    if !record.is_paid() || &record.owner == viewer {
        return Ok(Access::Granted { content_id });
    }
    if session.ledger().has_user_paid(id, viewer).await? {
        return Ok(Access::Granted { content_id });
    }
    Ok(Access::PaymentRequired {
        price: record.price,
    })
}

/// Pay the listed price for `id`. A failure is returned as-is.
pub async fn pay_to_watch(session: &Session, id: VideoId) -> Result<TxReceipt, MarketError> {
    let viewer = session.signer()?;
    let (record, _) = listed(session, id).await?;
    if !record.is_paid() {
        return Err(MarketError::Invalid(format!("video {} is free to watch", id)));
    }
    match session.ledger().pay_to_watch(viewer, id, record.price).await {
        Ok(receipt) => {
            tracing::info!(
                %id,
                viewer = %super::short_address(viewer),
                ether = %super::format_ether(record.price),
                tx = %receipt.tx_hash,
                "payment settled"
            );
            Ok(receipt)
        }
        Err(e) => {
            tracing::warn!(%id, error = %e, "payment failed");
            Err(e.into())
        }
    }
}

/// Remove `id` from the registry; the ledger only lets its owner do this.
pub async fn remove(session: &Session, id: VideoId) -> Result<TxReceipt, MarketError> {
    let owner = session.signer()?;
    let receipt = session.ledger().remove_video(owner, id).await?;
    tracing::info!(%id, tx = %receipt.tx_hash, "video removed");
    Ok(receipt)
}
