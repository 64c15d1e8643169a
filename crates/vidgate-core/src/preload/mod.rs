//! Metadata preload probe.
//!
//! Fetches the first bytes of a resolved URL and checks that they start a
//! playable container. Ready, error and timeout race; the first to settle
//! wins. A probe that loses to the timeout keeps running on its blocking
//! thread but its result is dropped.

mod container;

pub use container::{detect_container, ContainerFormat};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::probe::{ProbeError, Prober};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreloadError {
    #[error("media metadata not ready within {0:?}")]
    TimedOut(Duration),
    #[error("media fetch failed: {0}")]
    Fetch(#[from] ProbeError),
    #[error("response is not a recognized media container")]
    Unrecognized,
    #[error("preload cancelled")]
    Cancelled,
}

pub async fn preload_metadata(
    prober: Arc<dyn Prober>,
    url: &str,
    sniff_bytes: usize,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ContainerFormat, PreloadError> {
    let fetch = {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || prober.fetch_prefix(&url, sniff_bytes))
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PreloadError::Cancelled),
        res = tokio::time::timeout(timeout, fetch) => match res {
            Err(_) => Err(PreloadError::TimedOut(timeout)),
            Ok(Err(join)) => Err(PreloadError::Fetch(ProbeError::Task(join.to_string()))),
            Ok(Ok(Err(e))) => Err(PreloadError::Fetch(e)),
            Ok(Ok(Ok(bytes))) => {
                let format = detect_container(&bytes).ok_or(PreloadError::Unrecognized)?;
                tracing::debug!(%url, %format, bytes = bytes.len(), "media metadata ready");
                Ok(format)
            }
        },
    }
}
