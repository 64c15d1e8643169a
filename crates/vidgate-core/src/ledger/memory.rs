//! In-process ledger with the registry contract's rules, for tests and local demos.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{Address, Ledger, LedgerError, NewListing, TxReceipt, VideoId, VideoRecord, Wei};

#[derive(Debug, Default)]
struct State {
    videos: Vec<VideoRecord>,
    by_owner: HashMap<Address, Vec<VideoId>>,
    payments: HashSet<(VideoId, Address)>,
    earnings: HashMap<Address, Wei>,
    tx_count: u64,
}

impl State {
    fn receipt(&mut self) -> TxReceipt {
        self.tx_count += 1;
        TxReceipt {
            tx_hash: format!("0x{:064x}", self.tx_count),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total payments forwarded to `owner`.
    pub fn earnings_of(&self, owner: &Address) -> Wei {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.earnings.get(owner).copied().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn videos_count(&self) -> Result<u64, LedgerError> {
        Ok(self.lock().videos.len() as u64)
    }

    async fn get_video(&self, id: VideoId) -> Result<VideoRecord, LedgerError> {
        self.lock()
            .videos
            .get(id.0 as usize)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    async fn user_videos(&self, owner: &Address) -> Result<Vec<VideoId>, LedgerError> {
        Ok(self.lock().by_owner.get(owner).cloned().unwrap_or_default())
    }

    async fn upload_video(&self, from: &Address, listing: &NewListing) -> Result<TxReceipt, LedgerError> {
        if listing.title.trim().is_empty() {
            return Err(LedgerError::Reverted("title is required".to_string()));
        }
        let mut state = self.lock();
        let id = VideoId(state.videos.len() as u64);
        state.videos.push(VideoRecord {
            id,
            content_id: Some(listing.content_id.clone()),
            title: listing.title.clone(),
            description: listing.description.clone(),
            owner: from.clone(),
            timestamp: now_secs(),
            price: listing.price,
        });
        state.by_owner.entry(from.clone()).or_default().push(id);
        Ok(state.receipt())
    }

    async fn pay_to_watch(&self, from: &Address, id: VideoId, value: Wei) -> Result<TxReceipt, LedgerError> {
        let mut state = self.lock();
        let video = state
            .videos
            .get(id.0 as usize)
            .cloned()
            .ok_or(LedgerError::NotFound(id))?;
        if video.content_id.is_none() {
            return Err(LedgerError::Reverted("video was removed".to_string()));
        }
        if value < video.price {
            return Err(LedgerError::Reverted("insufficient payment".to_string()));
        }
        if !state.payments.insert((id, from.clone())) {
            return Err(LedgerError::Reverted("already paid".to_string()));
        }
        let earned = state.earnings.entry(video.owner).or_default();
        *earned = Wei(earned.0.saturating_add(value.0));
        Ok(state.receipt())
    }

    async fn has_user_paid(&self, id: VideoId, user: &Address) -> Result<bool, LedgerError> {
        let state = self.lock();
        if id.0 as usize >= state.videos.len() {
            return Err(LedgerError::NotFound(id));
        }
        Ok(state.payments.contains(&(id, user.clone())))
    }

    async fn remove_video(&self, from: &Address, id: VideoId) -> Result<TxReceipt, LedgerError> {
        let mut state = self.lock();
        let video = state
            .videos
            .get_mut(id.0 as usize)
            .ok_or(LedgerError::NotFound(id))?;
        if &video.owner != from {
            return Err(LedgerError::Reverted(
                "only the uploader can remove this video".to_string(),
            ));
        }
        if video.content_id.take().is_none() {
            return Err(LedgerError::Reverted("video already removed".to_string()));
        }
        Ok(state.receipt())
    }
}
