//! Catalog listing, newest first.

use crate::ledger::{Address, Ledger, VideoId, VideoRecord};

use super::MarketError;

/// Fetch records in order, dropping removed videos and logging per-item failures.
async fn load_records<I>(ledger: &dyn Ledger, ids: I) -> Vec<VideoRecord>
where
    I: IntoIterator<Item = VideoId>,
{
    let mut out = Vec::new();
    for id in ids {
        match ledger.get_video(id).await {
            Ok(record) if record.content_id.is_some() => out.push(record),
            Ok(_) => tracing::debug!(%id, "skipping removed video"),
            Err(e) => tracing::warn!(%id, error = %e, "failed to load video"),
        }
    }
    out
}

/// Every listed video, newest first.
pub async fn catalog(ledger: &dyn Ledger) -> Result<Vec<VideoRecord>, MarketError> {
    let count = ledger.videos_count().await?;
    tracing::debug!(count, "loading catalog");
    Ok(load_records(ledger, (0..count).rev().map(VideoId)).await)
}

/// Videos uploaded by `owner`, newest first.
pub async fn user_videos(ledger: &dyn Ledger, owner: &Address) -> Result<Vec<VideoRecord>, MarketError> {
    let ids = ledger.user_videos(owner).await?;
    let mut records = load_records(ledger, ids).await;
    records.reverse();
    Ok(records)
}
