//! `vidgate preload` – run the playback controller and print each transition.

use anyhow::{bail, Result};
use std::sync::Arc;
use vidgate_core::config::VidgateConfig;
use vidgate_core::content_id::ContentId;
use vidgate_core::playback::{PlaybackController, PlaybackState};

use super::build_resolver;

fn describe(state: &PlaybackState) -> String {
    match state {
        PlaybackState::Loading => "loading".to_string(),
        PlaybackState::Ready {
            url,
            container,
            source,
        } => format!("ready: {} ({}, {})", url, container, source),
        PlaybackState::Failed {
            retries_used,
            retry_in: Some(d),
            reason,
        } => format!(
            "failed ({}), retry {} in {:.0?}",
            reason,
            retries_used,
            d
        ),
        PlaybackState::Failed {
            retries_used,
            retry_in: None,
            reason,
        } => format!("failed ({}) after {} automatic retries", reason, retries_used),
    }
}

pub async fn run_preload(cfg: &VidgateConfig, cid: &str, manual_retries: u32) -> Result<()> {
    let id = ContentId::parse(cid)?;
    let resolver = Arc::new(build_resolver(cfg)?);
    let mut controller = PlaybackController::from_config(id, resolver, &cfg.playback)?;

    let mut rx = controller.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let line = describe(&rx.borrow_and_update());
            println!("{}", line);
        }
    });

    let mut state = controller.run().await;
    let mut left = manual_retries;
    while state.needs_manual_retry() && left > 0 {
        left -= 1;
        println!("manual retry");
        state = controller.manual_retry().await;
    }

    // Dropping the controller closes the channel and ends the printer.
    drop(controller);
    let _ = printer.await;

    match state {
        PlaybackState::Ready { .. } => Ok(()),
        other => bail!("playback did not become ready: {}", describe(&other)),
    }
}
