//! `vidgate resolve` – resolve an identifier and print the URL with its source.

use anyhow::Result;
use vidgate_core::config::VidgateConfig;
use vidgate_core::content_id::ContentId;

use super::build_resolver;

pub async fn run_resolve(cfg: &VidgateConfig, cid: &str, no_relay: bool) -> Result<()> {
    let id = ContentId::parse(cid)?;
    let mut resolver = build_resolver(cfg)?;
    if no_relay {
        resolver = resolver.with_relay(None);
    }

    let resolution = resolver.resolve(&id).await;
    println!("{}", resolution.url);
    println!("source: {}", resolution.source);
    if resolution.is_last_resort() {
        eprintln!("warning: no gateway confirmed {}; the URL may not load", id);
    }
    Ok(())
}
