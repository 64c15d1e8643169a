//! CLI command handlers, one file per command.

mod config_path;
mod gateways;
mod pin;
mod preload;
mod resolve;

pub use config_path::run_config_path;
pub use gateways::run_gateways;
pub use pin::run_pin;
pub use preload::run_preload;
pub use resolve::run_resolve;

use anyhow::Result;
use std::sync::Arc;
use vidgate_core::config::VidgateConfig;
use vidgate_core::probe::CurlProber;
use vidgate_core::resolver::GatewayResolver;

/// Resolver backed by libcurl, configured from `cfg`.
pub(crate) fn build_resolver(cfg: &VidgateConfig) -> Result<GatewayResolver> {
    let prober = Arc::new(CurlProber::from_config(&cfg.probe));
    GatewayResolver::from_config(cfg, prober)
}
