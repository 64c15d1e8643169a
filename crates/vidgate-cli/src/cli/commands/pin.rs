//! `vidgate pin` – upload a video file to the pinning service.

use anyhow::{Context, Result};
use std::path::Path;
use vidgate_core::config::VidgateConfig;
use vidgate_core::gateway::GatewayList;
use vidgate_core::pinning::PinningClient;

pub async fn run_pin(cfg: &VidgateConfig, path: &Path) -> Result<()> {
    let client = PinningClient::from_config(&cfg.pinning)?;
    client.check_upload(path)?;

    let owned = path.to_path_buf();
    let id = tokio::task::spawn_blocking(move || client.pin_file(&owned))
        .await
        .context("pin task panicked")??;

    println!("{}", id);
    let gateways = GatewayList::new(cfg.gateways.iter())?;
    println!("url: {}", gateways.primary_url(&id));
    Ok(())
}
