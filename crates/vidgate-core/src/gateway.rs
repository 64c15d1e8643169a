//! Candidate gateway list and URL building.
//!
//! Every gateway serves the same content under `{base}{identifier}`; the
//! list order encodes preference (most permissive first).

use anyhow::{bail, Context, Result};
use url::Url;

use crate::content_id::ContentId;

pub const DEFAULT_GATEWAYS: [&str; 5] = [
    "https://nftstorage.link/ipfs/",
    "https://ipfs.io/ipfs/",
    "https://cloudflare-ipfs.com/ipfs/",
    "https://dweb.link/ipfs/",
    "https://gateway.pinata.cloud/ipfs/",
];

/// Ordered, non-empty list of gateway base URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayList {
    bases: Vec<String>,
}

impl Default for GatewayList {
    fn default() -> Self {
        Self {
            bases: DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl GatewayList {
    /// Validates each base as an absolute http(s) URL. Order is preserved.
    pub fn new<I, S>(bases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for base in bases {
            let base = base.into();
            let parsed =
                Url::parse(&base).with_context(|| format!("invalid gateway base: {}", base))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("gateway base must be http or https: {}", base);
            }
            out.push(base);
        }
        if out.is_empty() {
            bail!("gateway list is empty");
        }
        Ok(Self { bases: out })
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    pub fn url_for(&self, index: usize, id: &ContentId) -> Option<String> {
        self.bases.get(index).map(|b| format!("{}{}", b, id))
    }

    /// URL on the highest-priority gateway (also the last-resort guess).
    pub fn primary_url(&self, id: &ContentId) -> String {
        format!("{}{}", self.bases[0], id)
    }

    /// `(index, full url)` pairs in priority order.
    pub fn candidates<'a>(&'a self, id: &'a ContentId) -> impl Iterator<Item = (usize, String)> + 'a {
        self.bases
            .iter()
            .enumerate()
            .map(move |(i, b)| (i, format!("{}{}", b, id)))
    }
}

/// Wraps `target` in the relay: `{relay_base}?url={encoded target}`.
pub fn relay_url(relay_base: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?url={}", relay_base, encoded)
}
