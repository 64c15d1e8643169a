//! Playback retry controller.
//!
//! One controller is scoped to one displayed identifier and walks
//! `Loading -> {Ready, Failed}`. Failures schedule automatic retries with
//! exponential backoff until the policy ceiling; after that only
//! [`PlaybackController::manual_retry`] re-enters `Loading`.
//!
//! Work in flight is tied to a [`CancellationToken`]: switching identifiers
//! or cancelling makes late results inert instead of relying on the caller
//! to ignore them. A [`PlaybackHandle`] cancels the current load from another
//! task while `run` holds the controller.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use anyhow::Result;

use crate::config::PlaybackConfig;
use crate::content_id::ContentId;
use crate::preload::{self, ContainerFormat};
use crate::resolver::{GatewayResolver, ResolutionSource};
use crate::retry::{RetryDecision, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Loading,
    Ready {
        url: String,
        container: ContainerFormat,
        source: ResolutionSource,
    },
    Failed {
        /// Automatic retries scheduled so far for this identifier.
        retries_used: u32,
        /// Delay until the next automatic retry; None once the ceiling is hit.
        retry_in: Option<Duration>,
        reason: String,
    },
}

impl PlaybackState {
    /// Failed with no automatic retry pending.
    pub fn needs_manual_retry(&self) -> bool {
        matches!(self, PlaybackState::Failed { retry_in: None, .. })
    }
}

type TokenSlot = Arc<Mutex<CancellationToken>>;

fn current(slot: &TokenSlot) -> MutexGuard<'_, CancellationToken> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cancels whatever the controller is loading at the moment it is called.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    slot: TokenSlot,
}

impl PlaybackHandle {
    pub fn cancel(&self) {
        current(&self.slot).cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        current(&self.slot).is_cancelled()
    }
}

pub struct PlaybackController {
    id: ContentId,
    resolver: Arc<GatewayResolver>,
    policy: RetryPolicy,
    preload_timeout: Duration,
    sniff_bytes: usize,
    retries_used: u32,
    cancel: TokenSlot,
    state_tx: watch::Sender<PlaybackState>,
}

impl PlaybackController {
    pub fn new(id: ContentId, resolver: Arc<GatewayResolver>) -> Self {
        let cfg = PlaybackConfig::default();
        Self::with_parts(id, resolver, RetryPolicy::default(), &cfg)
    }

    /// Fails when the configured backoff cannot be represented.
    pub fn from_config(id: ContentId, resolver: Arc<GatewayResolver>, cfg: &PlaybackConfig) -> Result<Self> {
        let policy = cfg.retry_policy()?;
        Ok(Self::with_parts(id, resolver, policy, cfg))
    }

    fn with_parts(
        id: ContentId,
        resolver: Arc<GatewayResolver>,
        policy: RetryPolicy,
        cfg: &PlaybackConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Loading);
        Self {
            id,
            resolver,
            policy,
            preload_timeout: cfg.preload_timeout(),
            sniff_bytes: cfg.sniff_bytes,
            retries_used: 0,
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            state_tx,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_preload_timeout(mut self, timeout: Duration) -> Self {
        self.preload_timeout = timeout;
        self
    }

    pub fn content_id(&self) -> &ContentId {
        &self.id
    }

    pub fn retries_used(&self) -> u32 {
        self.retries_used
    }

    pub fn state(&self) -> PlaybackState {
        self.state_tx.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Token for the work currently in flight; cancel it to discard results.
    pub fn cancel_token(&self) -> CancellationToken {
        current(&self.cancel).clone()
    }

    /// Handle that cancels the current load without borrowing the controller.
    pub fn handle(&self) -> PlaybackHandle {
        PlaybackHandle {
            slot: Arc::clone(&self.cancel),
        }
    }

    /// Cancel the current token and install a fresh one.
    fn renew_token(&self) {
        let mut token = current(&self.cancel);
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Switch to another identifier: in-flight work is cancelled and the
    /// retry counter starts over.
    pub fn set_content(&mut self, id: ContentId) {
        self.renew_token();
        self.id = id;
        self.retries_used = 0;
        self.publish(PlaybackState::Loading);
    }

    /// User-triggered retry: counter back to 0, then drive loading again.
    /// A previous cancellation does not carry over.
    pub async fn manual_retry(&mut self) -> PlaybackState {
        tracing::info!(id = %self.id, "manual playback retry");
        if self.cancel_token().is_cancelled() {
            self.renew_token();
        }
        self.retries_used = 0;
        self.run().await
    }

    /// Load, backing off between automatic retries, until `Ready`, a
    /// terminal `Failed`, or cancellation.
    pub async fn run(&mut self) -> PlaybackState {
        loop {
            let state = self.load_once().await;
            let delay = match &state {
                PlaybackState::Failed {
                    retry_in: Some(d), ..
                } => *d,
                _ => return state,
            };
            let cancel = self.cancel_token();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.state(),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// A single `Loading` entry: resolve, then preload metadata.
    ///
    /// On cancellation nothing is published and the current state is returned.
    pub async fn load_once(&mut self) -> PlaybackState {
        let cancel = self.cancel_token();
        if cancel.is_cancelled() {
            return self.state();
        }
        self.publish(PlaybackState::Loading);

        let resolution = tokio::select! {
            biased;
            _ = cancel.cancelled() => return self.state(),
            r = self.resolver.resolve(&self.id) => r,
        };

        let outcome = preload::preload_metadata(
            self.resolver.prober(),
            &resolution.url,
            self.sniff_bytes,
            self.preload_timeout,
            &cancel,
        )
        .await;

        if cancel.is_cancelled() {
            return self.state();
        }

        let next = match outcome {
            Ok(container) => {
                tracing::info!(id = %self.id, url = %resolution.url, %container, "playback ready");
                PlaybackState::Ready {
                    url: resolution.url,
                    container,
                    source: resolution.source,
                }
            }
            Err(e) => {
                let retry_in = match self.policy.decide(self.retries_used) {
                    RetryDecision::RetryAfter(d) => {
                        self.retries_used += 1;
                        Some(d)
                    }
                    RetryDecision::GiveUp => None,
                };
                tracing::warn!(
                    id = %self.id,
                    url = %resolution.url,
                    error = %e,
                    retries_used = self.retries_used,
                    ?retry_in,
                    "playback preload failed"
                );
                PlaybackState::Failed {
                    retries_used: self.retries_used,
                    retry_in,
                    reason: e.to_string(),
                }
            }
        };
        self.publish(next.clone());
        next
    }

    fn publish(&self, state: PlaybackState) {
        self.state_tx.send_replace(state);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        current(&self.cancel).cancel();
    }
}
