//! Publish: pin the file, then register it on the ledger.

use std::path::PathBuf;

use crate::content_id::ContentId;
use crate::ledger::{NewListing, TxReceipt, Wei};
use crate::pinning::PinningClient;
use crate::session::Session;

use super::MarketError;

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    /// Price in ether as typed by the user (`"0"` for free).
    pub price_ether: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub content_id: ContentId,
    pub receipt: TxReceipt,
}

impl UploadRequest {
    /// Trimmed title and description plus the parsed price.
    fn validate(&self) -> Result<(String, String, Wei), MarketError> {
        let title = self.title.trim();
        let description = self.description.trim();
        if title.is_empty() || description.is_empty() || self.price_ether.trim().is_empty() {
            return Err(MarketError::Invalid(
                "title, description and price are required".to_string(),
            ));
        }
        let price = super::parse_ether(&self.price_ether)?;
        Ok((title.to_string(), description.to_string(), price))
    }
}

/// Validate, pin and register. Nothing is uploaded unless the session can sign.
pub async fn publish(
    session: &Session,
    pinning: &PinningClient,
    req: &UploadRequest,
) -> Result<Published, MarketError> {
    let (title, description, price) = req.validate()?;
    let owner = session.signer()?;
    pinning.check_upload(&req.path)?;

    let content_id = tokio::task::spawn_blocking({
        let pinning = pinning.clone();
        let path = req.path.clone();
        move || pinning.pin_file(&path)
    })
    .await
    .map_err(|e| MarketError::Task(e.to_string()))??;

    let listing = NewListing {
        content_id: content_id.clone(),
        title,
        description,
        price,
    };
    let receipt = session.ledger().upload_video(owner, &listing).await?;
    tracing::info!(%content_id, tx = %receipt.tx_hash, "video published");
    Ok(Published {
        content_id,
        receipt,
    })
}
