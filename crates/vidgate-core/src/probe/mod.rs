//! Gateway reachability probes.
//!
//! The resolver and the preload step only depend on the [`Prober`] trait; the
//! libcurl implementation lives in [`CurlProber`]. Probes are blocking and are
//! run from `spawn_blocking` by async callers.

mod classify;
mod http;

pub use classify::{classify_curl_error, classify_head_status};
pub use http::CurlProber;

/// How a probe request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMode {
    /// Metadata-only HEAD with a visible status. 2xx is success.
    Head,
    /// Visible GET; the body is abandoned after the first chunk. 2xx is success.
    Get,
    /// GET whose status is deliberately ignored. Completing the transport is
    /// treated as success, so reachability is never actually confirmed.
    Opaque,
}

/// Outcome of a probe that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status, or None for opaque probes.
    pub status: Option<u32>,
}

impl ProbeOutcome {
    pub fn visible(status: u32) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn opaque() -> Self {
        Self { status: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The host accepted the connection but dropped the exchange before a
    /// status was seen (empty reply, reset mid-exchange, TLS refusal).
    /// Only this kind earns a second, opaque attempt.
    #[error("request blocked: {0}")]
    Blocked(String),
    /// DNS, connect or timeout failure.
    #[error("unreachable: {0}")]
    Unreachable(String),
    /// Any other non-2xx response.
    #[error("HTTP {0}")]
    Http(u32),
    /// The blocking probe task panicked or was cancelled.
    #[error("probe task failed: {0}")]
    Task(String),
}

/// Network probes used by the resolver and the metadata preload.
pub trait Prober: Send + Sync {
    fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError>;

    /// Fetch up to `max_bytes` from the start of the resource.
    fn fetch_prefix(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>, ProbeError>;
}
