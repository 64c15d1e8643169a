//! Gateway resolver: turns a content identifier into a retrieval URL.
//!
//! Candidates are probed in priority order. The first confirmed URL is
//! cached; if nothing confirms, the relay is tried and finally the primary
//! gateway URL is returned as an uncached guess. `resolve` never fails.

use std::sync::Arc;

use anyhow::Result;

use crate::cache::ResolutionCache;
use crate::config::{VidgateConfig, DEFAULT_RELAY_BASE};
use crate::content_id::ContentId;
use crate::gateway::{self, GatewayList};
use crate::probe::{ProbeError, ProbeMode, ProbeOutcome, Prober};

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from the resolution cache without any network call.
    Cached,
    /// Gateway at `index` answered the metadata probe with 2xx.
    Gateway { index: usize },
    /// Gateway at `index` blocked the visible probe but its opaque GET completed.
    /// The status was never seen.
    OpaqueGateway { index: usize },
    /// The relay fetched the primary gateway URL successfully.
    Relay,
    /// Nothing confirmed; primary gateway URL returned as a guess.
    LastResort,
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionSource::Cached => write!(f, "cached"),
            ResolutionSource::Gateway { index } => write!(f, "gateway #{}", index),
            ResolutionSource::OpaqueGateway { index } => write!(f, "gateway #{} (unverified)", index),
            ResolutionSource::Relay => write!(f, "relay"),
            ResolutionSource::LastResort => write!(f, "last resort (unverified)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn is_last_resort(&self) -> bool {
        self.source == ResolutionSource::LastResort
    }
}

/// Resolver over an ordered gateway list with a shared resolution cache.
pub struct GatewayResolver {
    gateways: GatewayList,
    relay_base: Option<String>,
    accept_opaque_probe: bool,
    prober: Arc<dyn Prober>,
    cache: Arc<ResolutionCache>,
}

impl std::fmt::Debug for GatewayResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayResolver")
            .field("gateways", &self.gateways)
            .field("relay_base", &self.relay_base)
            .field("accept_opaque_probe", &self.accept_opaque_probe)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl GatewayResolver {
    /// Resolver with the default relay, opaque probes accepted and an unbounded cache.
    pub fn new(gateways: GatewayList, prober: Arc<dyn Prober>) -> Self {
        Self {
            gateways,
            relay_base: Some(DEFAULT_RELAY_BASE.to_string()),
            accept_opaque_probe: true,
            prober,
            cache: Arc::new(ResolutionCache::new()),
        }
    }

    pub fn from_config(cfg: &VidgateConfig, prober: Arc<dyn Prober>) -> Result<Self> {
        let gateways = GatewayList::new(cfg.gateways.iter().cloned())?;
        Ok(Self::new(gateways, prober)
            .with_relay(cfg.relay_base.clone())
            .with_opaque_probe(cfg.accept_opaque_probe)
            .with_cache(Arc::new(ResolutionCache::with_capacity(cfg.cache.capacity))))
    }

    pub fn with_relay(mut self, relay_base: Option<String>) -> Self {
        self.relay_base = relay_base.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_opaque_probe(mut self, accept: bool) -> Self {
        self.accept_opaque_probe = accept;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResolutionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn gateways(&self) -> &GatewayList {
        &self.gateways
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn prober(&self) -> Arc<dyn Prober> {
        Arc::clone(&self.prober)
    }

    /// Resolve and return only the URL.
    pub async fn resolve_url(&self, id: &ContentId) -> String {
        self.resolve(id).await.url
    }

    pub async fn resolve(&self, id: &ContentId) -> Resolution {
        if let Some(url) = self.cache.get(id) {
            tracing::debug!(%id, %url, "resolution cache hit");
            return Resolution {
                url,
                source: ResolutionSource::Cached,
            };
        }

        for (index, url) in self.gateways.candidates(id) {
            match self.run_probe(&url, ProbeMode::Head).await {
                Ok(_) => {
                    tracing::info!(%id, %url, "gateway confirmed");
                    return self.confirm(id, url, ResolutionSource::Gateway { index });
                }
                Err(ProbeError::Blocked(reason)) => {
                    tracing::warn!(%id, %url, %reason, "metadata probe blocked, trying opaque GET");
                    if !self.accept_opaque_probe {
                        continue;
                    }
                    match self.run_probe(&url, ProbeMode::Opaque).await {
                        Ok(_) => {
                            // The opaque GET hides the status: this may be a 404 page.
                            tracing::warn!(%id, %url, "accepting gateway on unverified opaque probe");
                            return self.confirm(id, url, ResolutionSource::OpaqueGateway { index });
                        }
                        Err(e) => {
                            tracing::warn!(%id, %url, error = %e, "opaque probe failed");
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(%id, %url, error = %e, "gateway probe failed");
                }
            }
        }

        let primary = self.gateways.primary_url(id);

        if let Some(relay_base) = &self.relay_base {
            let relay = gateway::relay_url(relay_base, &primary);
            match self.run_probe(&relay, ProbeMode::Get).await {
                Ok(_) => {
                    tracing::info!(%id, %relay, "relay reached primary gateway");
                    return self.confirm(id, primary, ResolutionSource::Relay);
                }
                Err(e) => {
                    tracing::warn!(%id, %relay, error = %e, "relay probe failed");
                }
            }
        }

        tracing::warn!(%id, url = %primary, "all gateway checks failed, using primary gateway guess");
        Resolution {
            url: primary,
            source: ResolutionSource::LastResort,
        }
    }

    fn confirm(&self, id: &ContentId, url: String, source: ResolutionSource) -> Resolution {
        self.cache.insert(id.clone(), url.clone());
        Resolution { url, source }
    }

    async fn run_probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        let prober = Arc::clone(&self.prober);
        let url = url.to_string();
        tokio::task::spawn_blocking(move || prober.probe(&url, mode))
            .await
            .unwrap_or_else(|e| Err(ProbeError::Task(e.to_string())))
    }
}
